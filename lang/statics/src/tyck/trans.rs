use crate::{classify::*, syntax::*, *};
use std::rc::Rc;

/// The message a match raises when no rule applies.
pub const MATCH_FAILURE: &str = "typy match failure";

impl Context {
    /// Translates a checked expression; translating the same expression
    /// twice yields the same node.
    pub fn trans(&mut self, e: ExprId) -> Result<ExprId> {
        if let Some(tr) = self.exprs_tr.get(&e) {
            return Ok(*tr);
        }
        let tr = self.guarded(|ctx| {
            ctx.stack.push_back(TyckTask::Trans(e.into()));
            ctx.trans_expr(e)
        })?;
        self.exprs_tr.insert(e, tr);
        Ok(tr)
    }

    fn trans_expr(&mut self, e: ExprId) -> Result<ExprId> {
        let Some(Annotation { delegation, .. }) = self.annotation(e).cloned() else {
            return self.internal_err("Expression was not checked before translation.", e);
        };
        let Some(Delegation { fragment, idx, hook }) = delegation else {
            return match classify_expr(&self.arena, &e) {
                | ExprShape::Name(id) => match self.state.ref_ids.get(&e).cloned() {
                    | Some(uniq) if uniq != id => Ok(self.arena.name(&uniq)),
                    // bound under its own name, or a static name
                    | _ => Ok(e),
                },
                | ExprShape::Ascription { value, .. } => self.trans(value),
                | _ => self.internal_err("Expression has no delegate.", e),
            };
        };
        let idx = idx.unwrap_or_else(|| Rc::new(Idx::Triv));
        match hook {
            | Hook::Lambda => fragment.trans_lambda(self, e, &idx),
            | Hook::Dict => fragment.trans_dict(self, e, &idx),
            | Hook::Set => fragment.trans_set(self, e, &idx),
            | Hook::Num => fragment.trans_num(self, e, &idx),
            | Hook::Str => fragment.trans_str(self, e, &idx),
            | Hook::NameConstant => fragment.trans_name_constant(self, e, &idx),
            | Hook::List => fragment.trans_list(self, e, &idx),
            | Hook::Tuple => fragment.trans_tuple(self, e, &idx),
            | Hook::Name => fragment.trans_name(self, e, &idx),
            | Hook::JoinedStr => fragment.trans_joined_str(self, e, &idx),
            | Hook::ListComp => fragment.trans_list_comp(self, e, &idx),
            | Hook::SetComp => fragment.trans_set_comp(self, e, &idx),
            | Hook::DictComp => fragment.trans_dict_comp(self, e, &idx),
            | Hook::GeneratorExp => fragment.trans_generator_exp(self, e, &idx),
            | Hook::UnaryOp => fragment.trans_unary_op(self, e, &idx),
            | Hook::Call => fragment.trans_call(self, e, &idx),
            | Hook::IfExp => fragment.trans_if_exp(self, e, &idx),
            | Hook::Attribute => fragment.trans_attribute(self, e, &idx),
            | Hook::Subscript => fragment.trans_subscript(self, e, &idx),
            | Hook::BinOp => fragment.trans_bin_op(self, e),
            | Hook::Compare => fragment.trans_compare(self, e),
            | Hook::BoolOp => fragment.trans_bool_op(self, e),
            | Hook::ComponentRef => fragment.trans_component_ref(self, e, &idx),
            | hook => self.internal_err(format!("Statement hook {:?} on an expression.", hook), e),
        }
    }

    /// Delivers the value `e` the way `mechanism` asks for.
    pub fn deliver(&mut self, e: ExprId, mechanism: Mechanism) -> StmtId {
        match mechanism {
            | Mechanism::Statement => self.arena.expr_stmt(e),
            | Mechanism::Return => self.arena.ret(Some(e)),
            | Mechanism::Assign(target) => self.arena.assign(target, e),
        }
    }
}

/* -------------------------------- Statements ------------------------------ */

impl Context {
    /// Translates a checked statement; its value, if it has one, is
    /// delivered by `mechanism`.
    pub fn trans_stmt(&mut self, s: StmtId, mechanism: Mechanism) -> Result<Vec<StmtId>> {
        self.trans_item(Item::Stmt(s), mechanism)
    }

    pub fn trans_item(&mut self, item: Item, mechanism: Mechanism) -> Result<Vec<StmtId>> {
        if let Some(tr) = self.stmts_tr.get(&(item, mechanism)) {
            return Ok(tr.clone());
        }
        let tr = self.guarded(|ctx| {
            ctx.stack.push_back(TyckTask::Trans(item.into()));
            match item {
                | Item::Stmt(s) => ctx.trans_stmt_inner(s, mechanism),
                | Item::Match(m) => ctx.trans_match(m, mechanism),
            }
        })?;
        self.stmts_tr.insert((item, mechanism), tr.clone());
        Ok(tr)
    }

    fn trans_stmt_inner(&mut self, s: StmtId, mechanism: Mechanism) -> Result<Vec<StmtId>> {
        if let Some(Delegation { fragment, idx, hook }) = self.delegation(s).cloned() {
            let idx = idx.unwrap_or_else(|| Rc::new(Idx::Triv));
            return match hook {
                | Hook::Delete => fragment.trans_delete(self, s, &idx),
                | Hook::Assign => fragment.trans_assign_target(self, s, &idx),
                | Hook::AugAssign => fragment.trans_aug_assign(self, s, &idx),
                | Hook::For => fragment.trans_for(self, s, &idx),
                | Hook::While => fragment.trans_while(self, s, &idx),
                | Hook::CheckedAssign => fragment.trans_checked_assign(self, s),
                | Hook::Return => fragment.trans_checked_return(self, s),
                | Hook::Raise => fragment.trans_checked_raise(self, s),
                | Hook::Try => fragment.trans_checked_try(self, s),
                | Hook::Assert => fragment.trans_checked_assert(self, s),
                | Hook::Pass => fragment.trans_checked_pass(self, s),
                | Hook::Break => fragment.trans_checked_break(self, s),
                | Hook::Continue => fragment.trans_checked_continue(self, s),
                | hook => {
                    self.internal_err(format!("Expression hook {:?} on a statement.", hook), s)
                }
            };
        }
        let Some(Annotation { delegation, .. }) = self.annotation(s).cloned() else {
            return self.internal_err("Statement was not checked before translation.", s);
        };
        match delegation {
            | Some(Delegation { fragment, idx, hook: Hook::If }) => {
                let idx = idx.unwrap_or_else(|| Rc::new(Idx::Triv));
                fragment.trans_if(self, s, &idx, mechanism)
            }
            | Some(Delegation { fragment, idx, hook: Hook::FunctionDef }) => {
                let idx = idx.unwrap_or_else(|| Rc::new(Idx::Triv));
                let mut tr = fragment.trans_function_def(self, s, &idx, mechanism)?;
                if let Some(integrator) = self.integrator(s) {
                    integrator.integrate_trans_function_def(self, s, &mut tr, mechanism)?;
                }
                Ok(tr)
            }
            | Some(Delegation { hook, .. }) => {
                self.internal_err(format!("Unexpected hook {:?} on a statement.", hook), s)
            }
            | None => match self.arena.stmts[&s] {
                | Stmt::Expr(e) => {
                    let e = self.trans(e)?;
                    Ok(vec![self.deliver(e, mechanism)])
                }
                | _ => self.internal_err("Statement has no delegate.", s),
            },
        }
    }

    /// Translates a block; only the last item delivers a value.
    pub fn trans_block(&mut self, b: BlockId, mechanism: Mechanism) -> Result<Vec<StmtId>> {
        let items = self.segments(b)?;
        let mut tr = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let mechanism = if i + 1 == items.len() { mechanism } else { Mechanism::Statement };
            tr.extend(self.trans_item(*item, mechanism)?);
        }
        Ok(tr)
    }
}

/* --------------------------------- Matches -------------------------------- */

impl Context {
    /// `s = scrutinee`, then one `if` per rule testing the rule's guard and
    /// binding its variables, and a final `raise` when no rule matched.
    fn trans_match(&mut self, m: MatchId, mechanism: Mechanism) -> Result<Vec<StmtId>> {
        let MatchGroup { scrutinee, rules, .. } = self.matches[&m].clone();
        let scrutinee = self.trans(scrutinee)?;
        let scrutinee_id = self.fresh("__typy_scrutinee__");
        let mut tr = vec![self.arena.assign_name(&scrutinee_id, scrutinee)];
        let scrutinee = self.arena.name(&scrutinee_id);

        let builtins = self.add_import("builtins");
        let builtins = self.arena.name(&builtins);
        let exception = self.arena.attr(builtins, "Exception");
        let msg = self.arena.str_lit(MATCH_FAILURE);
        let exception = self.arena.call(exception, vec![msg]);
        let mut orelse = vec![self.arena.raise(exception)];
        for rule in rules.iter().rev() {
            let (guard, values) = self.trans_pat(rule.pat, scrutinee)?;
            let var_bindings = self.var_bindings(rule.pat).cloned().unwrap_or_default();
            let mut body = Vec::new();
            for (name, value) in values {
                let Some((uniq, _)) = var_bindings.get(&name) else {
                    return self.internal_err(format!("Unbound pattern variable: {}", name), rule.pat);
                };
                let uniq = uniq.clone();
                body.push(self.arena.assign_name(&uniq, value));
            }
            body.extend(self.trans_block(rule.body, mechanism)?);
            orelse = vec![self.arena.if_stmt(guard, body, orelse)];
        }
        tr.extend(orelse);
        Ok(tr)
    }

    /// Translates an analyzed pattern against the translated scrutinee.
    pub fn trans_pat(&mut self, pat: ExprId, scrutinee: ExprId) -> Result<PatTrans> {
        let shape = match classify_pat(&self.arena, &pat) {
            | PatShape::Wildcard => return Ok((self.arena.bool_lit(true), Default::default())),
            | PatShape::Var(x) => {
                let mut values = indexmap::IndexMap::new();
                values.insert(x, scrutinee);
                return Ok((self.arena.bool_lit(true), values));
            }
            | PatShape::Unsupported(msg) => return self.internal_err(msg, pat),
            | shape => shape,
        };
        let Some(PatAnnotation { delegate, idx, bindings }) = self.pat_annotation(pat).cloned() else {
            return self.internal_err("Pattern was not analyzed before translation.", pat);
        };
        let (guard, values) = match shape {
            | PatShape::Num => delegate.trans_pat_num(self, pat, &idx, scrutinee)?,
            | PatShape::Str => delegate.trans_pat_str(self, pat, &idx, scrutinee)?,
            | PatShape::NameConstant => {
                delegate.trans_pat_name_constant(self, pat, &idx, scrutinee)?
            }
            | PatShape::Tuple => delegate.trans_pat_tuple(self, pat, &idx, scrutinee)?,
            | PatShape::List => delegate.trans_pat_list(self, pat, &idx, scrutinee)?,
            | PatShape::Dict => delegate.trans_pat_dict(self, pat, &idx, scrutinee)?,
            | PatShape::Set => delegate.trans_pat_set(self, pat, &idx, scrutinee)?,
            | PatShape::Name => delegate.trans_pat_name(self, pat, &idx, scrutinee)?,
            | PatShape::Call => delegate.trans_pat_call(self, pat, &idx, scrutinee)?,
            | PatShape::UnaryOp => delegate.trans_pat_unary_op(self, pat, &idx, scrutinee)?,
            | PatShape::BinOp => delegate.trans_pat_bin_op(self, pat, &idx, scrutinee)?,
            | PatShape::JoinedStr => delegate.trans_pat_joined_str(self, pat, &idx, scrutinee)?,
            | PatShape::Wildcard | PatShape::Var(_) | PatShape::Unsupported(_) => {
                return self.internal_err("Pattern shape was handled above.", pat);
            }
        };
        let same_vars = values.len() == bindings.len()
            && values.keys().all(|name| bindings.contains_key(name));
        if !same_vars {
            return self.usage_err(
                format!(
                    "{} translated a pattern binding different variables than it analyzed.",
                    delegate
                ),
                pat,
            );
        }
        Ok((guard, values))
    }
}
