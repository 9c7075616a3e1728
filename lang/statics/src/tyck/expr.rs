use crate::{classify::*, syntax::*, *};
use std::rc::Rc;

/* -------------------------------- Synthesis ------------------------------- */

impl Context {
    /// Synthesizes the type of `tree`. Synthesizing an already annotated
    /// tree returns the recorded type.
    pub fn syn(&mut self, tree: impl Into<Tree>) -> Result<TyExpr> {
        let tree = tree.into();
        if let Some(ann) = self.annotation(tree) {
            return Ok(ann.ty.clone());
        }
        self.guarded(|ctx| {
            ctx.stack.push_back(TyckTask::Syn(tree));
            ctx.log_tree("syn", tree);
            let (ty, delegation) = match tree {
                | Tree::Expr(e) => ctx.syn_expr(e)?,
                | Tree::Stmt(s) => ctx.syn_stmt(s)?,
                | Tree::Match(m) => (ctx.syn_match(m)?, None),
            };
            ctx.annotate(tree, ty.clone(), delegation);
            Ok(ty)
        })
    }

    fn syn_expr(&mut self, e: ExprId) -> Result<(TyExpr, Option<Delegation>)> {
        match classify_expr(&self.arena, &e) {
            | ExprShape::Name(id) => self.syn_name(e, &id),
            | ExprShape::Ascription { value, ty } => {
                let ty = self.as_type(ty)?;
                self.ana(value, &ty)?;
                Ok((ty, None))
            }
            | ExprShape::Targeted { form, target } => {
                let target_ty = self.syn(target)?;
                let CanonicalTy { fragment, idx } = self.canonical(&target_ty, target)?;
                let (ty, hook) = match form {
                    | TargetedForm::UnaryOp => (fragment.syn_unary_op(self, e, &idx)?, Hook::UnaryOp),
                    | TargetedForm::IfExp => (fragment.syn_if_exp(self, e, &idx)?, Hook::IfExp),
                    | TargetedForm::Call => (fragment.syn_call(self, e, &idx)?, Hook::Call),
                    | TargetedForm::Attribute => {
                        (fragment.syn_attribute(self, e, &idx)?, Hook::Attribute)
                    }
                    | TargetedForm::Subscript => {
                        (fragment.syn_subscript(self, e, &idx)?, Hook::Subscript)
                    }
                };
                Ok((ty, Some(Delegation { fragment, idx: Some(idx), hook })))
            }
            | ExprShape::Binary { form, left, right } => self.syn_binary(e, form, left, right),
            | ExprShape::Intro(_) => self.type_err(
                "Cannot synthesize a type for a literal form; ascribe a type to it.",
                e,
            ),
            | ExprShape::Unsupported(msg) => self.type_err(msg, e),
        }
    }

    fn syn_name(&mut self, e: ExprId, id: &str) -> Result<(TyExpr, Option<Delegation>)> {
        if let Some((uniq, ty)) = self.lookup(id) {
            self.state.ref_ids.insert(e, uniq);
            return Ok((ty, None));
        }
        match self.static_env.get(id).cloned() {
            | Some(StaticValue::Component(component)) => {
                let fragment = crate::singleton::component_singleton();
                let idx = Rc::new(Idx::Component(component));
                let ty = CanonicalTy { fragment, idx: idx.clone() }.into();
                Ok((ty, Some(Delegation { fragment, idx: Some(idx), hook: Hook::ComponentRef })))
            }
            | Some(StaticValue::Host(_)) => match self.host_fragment {
                | Some(fragment) => Ok((TyExpr::triv(fragment), None)),
                | None => self.type_err(format!("Invalid name: {}", id), e),
            },
            | _ => self.type_err(format!("Invalid name: {}", id), e),
        }
    }

    /// Picks the delegate of a binary form: the fragment of the operand that
    /// synthesizes, or the one governing the other when both do.
    fn syn_binary(
        &mut self, e: ExprId, form: BinaryForm, left: ExprId, right: ExprId,
    ) -> Result<(TyExpr, Option<Delegation>)> {
        let left_ty = self.try_syn(left)?;
        let right_ty = self.try_syn(right)?;
        let fragment = match (left_ty, right_ty) {
            | (None, None) => return self.type_err("Neither argument synthesizes a type.", e),
            | (Some(ty), None) => self.canonical(&ty, left)?.fragment,
            | (None, Some(ty)) => self.canonical(&ty, right)?.fragment,
            | (Some(l), Some(r)) => {
                let l = self.canonical(&l, left)?.fragment;
                let r = self.canonical(&r, right)?.fragment;
                match (l == r, l.governs(&r), r.governs(&l)) {
                    | (true, _, _) => l,
                    | (false, true, true) => {
                        return self.type_err("Circular precedence sets.", e);
                    }
                    | (false, true, false) => l,
                    | (false, false, true) => r,
                    | (false, false, false) => {
                        return self.type_err(
                            format!(
                                "Left and right of operator synthesize types where the fragments are mutually non-precedent: {} and {}.",
                                l, r
                            ),
                            e,
                        );
                    }
                }
            }
        };
        ::log::trace!("[delegate] {}", fragment);
        let (ty, hook) = match form {
            | BinaryForm::BinOp => (fragment.syn_bin_op(self, e)?, Hook::BinOp),
            | BinaryForm::Compare => (fragment.syn_compare(self, e)?, Hook::Compare),
            | BinaryForm::BoolOp => (fragment.syn_bool_op(self, e)?, Hook::BoolOp),
        };
        Ok((ty, Some(Delegation { fragment, idx: None, hook })))
    }

    fn syn_stmt(&mut self, s: StmtId) -> Result<(TyExpr, Option<Delegation>)> {
        match classify_stmt(&self.arena, &s) {
            | StmtShape::Expr(e) => Ok((self.syn(e)?, None)),
            | StmtShape::If { test } => {
                let test_ty = self.syn(test)?;
                let CanonicalTy { fragment, idx } = self.canonical(&test_ty, test)?;
                let ty = fragment.syn_if(self, s, &idx)?;
                Ok((ty, Some(Delegation { fragment, idx: Some(idx), hook: Hook::If })))
            }
            | StmtShape::FunctionDef => self.syn_function_def(s),
            | StmtShape::Unsupported(msg) => self.type_err(msg, s),
            | StmtShape::Targeted { .. } | StmtShape::Default(_) => {
                self.type_err("Statement does not synthesize a type.", s)
            }
        }
    }

    /// `@T def ...` analyzes the def against the type `T`; `@F def ...`
    /// hands it to the fragment `F`.
    fn syn_function_def(&mut self, s: StmtId) -> Result<(TyExpr, Option<Delegation>)> {
        let decorator = match &self.arena.stmts[&s] {
            | Stmt::FunctionDef(FunctionDef { decorators, .. }) => decorators.first().copied(),
            | _ => return self.internal_err("Expected a function definition.", s),
        };
        let Some(decorator) = decorator else {
            return self.type_err("Cannot synthesize a type for an undecorated definition.", s);
        };
        if let Some(ty) = self.attempt(|ctx| ctx.as_type(decorator))? {
            let delegation = self.ana_function_def(s, &ty)?;
            return Ok((ty, Some(delegation)));
        }
        match self.static_env.eval(&self.arena, &decorator) {
            | Some(StaticValue::Fragment(fragment)) => {
                self.push_default_fragment(fragment);
                let res = fragment.syn_function_def(self, s);
                self.pop_default_fragment();
                let ty = res?;
                self.ana_ty_expr(&ty, &Kind::Type)?;
                let idx = match self.canonicalize(&ty)? {
                    | TyExpr::Canonical(c) if c.fragment == fragment => c.idx,
                    | _ => Rc::new(Idx::Triv),
                };
                self.integrate_static(s, &ty)?;
                Ok((ty, Some(Delegation { fragment, idx: Some(idx), hook: Hook::FunctionDef })))
            }
            | _ => self.type_err("Decorator is neither a type nor a fragment.", decorator),
        }
    }

    fn ana_function_def(&mut self, s: StmtId, ty: &TyExpr) -> Result<Delegation> {
        let CanonicalTy { fragment, idx } = self.canonical(ty, s)?;
        self.push_default_fragment(fragment);
        let res = fragment.ana_function_def(self, s, &idx);
        self.pop_default_fragment();
        res?;
        self.integrate_static(s, ty)?;
        Ok(Delegation { fragment, idx: Some(idx), hook: Hook::FunctionDef })
    }

    /// Lets the enclosing default fragment see a checked def.
    fn integrate_static(&mut self, s: StmtId, ty: &TyExpr) -> Result<()> {
        if let Some(fragment) = self.default_fragment() {
            fragment.integrate_static_function_def(self, s, ty)?;
            self.state.integrators.insert(s, fragment);
        }
        Ok(())
    }
    pub(crate) fn integrator(&self, s: StmtId) -> Option<FragmentRef> {
        self.state.integrators.get(&s).copied()
    }
}

/* --------------------------------- Analysis ------------------------------- */

impl Context {
    /// Analyzes `tree` against `ty`. Analyzing an already annotated tree
    /// compares the recorded type against `ty`.
    pub fn ana(&mut self, tree: impl Into<Tree>, ty: &TyExpr) -> Result<()> {
        let tree = tree.into();
        if let Some(ann) = self.annotation(tree) {
            let found = ann.ty.clone();
            if self.ty_expr_eq(ty, &found, &Kind::Type)? {
                return Ok(());
            }
            return self.mismatch(ty, &found, tree);
        }
        self.guarded(|ctx| {
            ctx.stack.push_back(TyckTask::Ana(tree, ty.clone()));
            ctx.log_tree("ana", tree);
            match tree {
                | Tree::Expr(e) => ctx.ana_expr(e, ty),
                | Tree::Stmt(s) => ctx.ana_stmt(s, ty),
                | Tree::Match(m) => {
                    ctx.ana_match(m, ty)?;
                    ctx.annotate(m, ty.clone(), None);
                    Ok(())
                }
            }
        })
    }

    fn ana_expr(&mut self, e: ExprId, ty: &TyExpr) -> Result<()> {
        let shape = classify_expr(&self.arena, &e);
        if let ExprShape::Binary { form: form @ (BinaryForm::BinOp | BinaryForm::BoolOp), left, right } =
            shape
        {
            if self.try_syn(left)?.is_none() && self.try_syn(right)?.is_none() {
                let CanonicalTy { fragment, idx } = self.canonical(ty, e)?;
                let hook = match form {
                    | BinaryForm::BoolOp => {
                        fragment.ana_bool_op(self, e, &idx)?;
                        Hook::BoolOp
                    }
                    | _ => {
                        fragment.ana_bin_op(self, e, &idx)?;
                        Hook::BinOp
                    }
                };
                self.annotate(e, ty.clone(), Some(Delegation { fragment, idx: Some(idx), hook }));
                return Ok(());
            }
        }
        if let Some(form) = intro_form(&self.arena, &e) {
            match form {
                // constructors shadow nothing: `Nil` may still be a variable
                | IntroForm::Name | IntroForm::Call => {
                    if !self.constructor_head_bound(e) {
                        return self.ana_intro(e, form, ty);
                    }
                    if self.attempt(|ctx| ctx.ana_intro(e, form, ty))?.is_some() {
                        return Ok(());
                    }
                }
                | _ => return self.ana_intro(e, form, ty),
            }
        }
        if let ExprShape::Targeted { form: TargetedForm::IfExp, target } = shape {
            let test_ty = self.syn(target)?;
            let CanonicalTy { fragment, idx } = self.canonical(&test_ty, target)?;
            fragment.ana_if_exp(self, e, &idx, ty)?;
            let delegation = Delegation { fragment, idx: Some(idx), hook: Hook::IfExp };
            self.annotate(e, ty.clone(), Some(delegation));
            return Ok(());
        }
        self.subsume(e, ty)
    }

    /// Whether the name heading a constructor form also names a variable or a
    /// static value.
    fn constructor_head_bound(&self, e: ExprId) -> bool {
        let head = match &self.arena.exprs[&e] {
            | Expr::Call(Call { func, .. }) => *func,
            | _ => e,
        };
        match self.arena.name_of(&head) {
            | Some(name) => self.lookup(name).is_some() || self.static_env.contains(name),
            | None => false,
        }
    }

    fn ana_intro(&mut self, e: ExprId, form: IntroForm, ty: &TyExpr) -> Result<()> {
        let CanonicalTy { fragment, idx } = self.canonical(ty, e)?;
        let hook = match form {
            | IntroForm::Lambda => {
                fragment.ana_lambda(self, e, &idx)?;
                Hook::Lambda
            }
            | IntroForm::Dict => {
                fragment.ana_dict(self, e, &idx)?;
                Hook::Dict
            }
            | IntroForm::Set => {
                fragment.ana_set(self, e, &idx)?;
                Hook::Set
            }
            | IntroForm::Num => {
                fragment.ana_num(self, e, &idx)?;
                Hook::Num
            }
            | IntroForm::Str => {
                fragment.ana_str(self, e, &idx)?;
                Hook::Str
            }
            | IntroForm::NameConstant => {
                fragment.ana_name_constant(self, e, &idx)?;
                Hook::NameConstant
            }
            | IntroForm::List => {
                fragment.ana_list(self, e, &idx)?;
                Hook::List
            }
            | IntroForm::Tuple => {
                fragment.ana_tuple(self, e, &idx)?;
                Hook::Tuple
            }
            | IntroForm::Name => {
                fragment.ana_name(self, e, &idx)?;
                Hook::Name
            }
            | IntroForm::Call => {
                fragment.ana_call(self, e, &idx)?;
                Hook::Call
            }
            | IntroForm::UnaryOp => {
                fragment.ana_unary_op(self, e, &idx)?;
                Hook::UnaryOp
            }
            | IntroForm::JoinedStr => {
                fragment.ana_joined_str(self, e, &idx)?;
                Hook::JoinedStr
            }
            | IntroForm::ListComp => {
                fragment.ana_list_comp(self, e, &idx)?;
                Hook::ListComp
            }
            | IntroForm::SetComp => {
                fragment.ana_set_comp(self, e, &idx)?;
                Hook::SetComp
            }
            | IntroForm::DictComp => {
                fragment.ana_dict_comp(self, e, &idx)?;
                Hook::DictComp
            }
            | IntroForm::GeneratorExp => {
                fragment.ana_generator_exp(self, e, &idx)?;
                Hook::GeneratorExp
            }
        };
        self.annotate(e, ty.clone(), Some(Delegation { fragment, idx: Some(idx), hook }));
        Ok(())
    }

    fn ana_stmt(&mut self, s: StmtId, ty: &TyExpr) -> Result<()> {
        match classify_stmt(&self.arena, &s) {
            | StmtShape::Expr(e) => {
                self.ana(e, ty)?;
                self.annotate(s, ty.clone(), None);
                Ok(())
            }
            | StmtShape::If { test } => {
                let test_ty = self.syn(test)?;
                let CanonicalTy { fragment, idx } = self.canonical(&test_ty, test)?;
                fragment.ana_if(self, s, &idx, ty)?;
                let delegation = Delegation { fragment, idx: Some(idx), hook: Hook::If };
                self.annotate(s, ty.clone(), Some(delegation));
                Ok(())
            }
            | StmtShape::FunctionDef => {
                let delegation = self.ana_function_def(s, ty)?;
                self.annotate(s, ty.clone(), Some(delegation));
                Ok(())
            }
            | _ => self.subsume(s, ty),
        }
    }

    /// Analysis by synthesis: `tree` must synthesize a type equal to `ty`.
    fn subsume(&mut self, tree: impl Into<Tree>, ty: &TyExpr) -> Result<()> {
        let tree = tree.into();
        let found = self.syn(tree)?;
        if self.ty_expr_eq(ty, &found, &Kind::Type)? {
            return Ok(());
        }
        self.mismatch(ty, &found, tree)
    }

    #[track_caller]
    pub fn mismatch<T>(&mut self, expected: &TyExpr, found: &TyExpr, site: Tree) -> Result<T> {
        let expected = self.canonicalize(expected).unwrap_or_else(|_| expected.clone());
        let found = self.canonicalize(found).unwrap_or_else(|_| found.clone());
        let error = TyckError::TypeMismatch { expected: expected.to_string(), found: found.to_string() };
        self.err(error, Some(site))
    }
}

/* -------------------------------- Statements ------------------------------ */

impl Context {
    /// Checks a statement that is not the value of its block.
    pub fn check(&mut self, s: StmtId) -> Result<()> {
        if self.delegation(s).is_some() || self.annotation(s).is_some() {
            return Ok(());
        }
        self.guarded(|ctx| {
            ctx.stack.push_back(TyckTask::Check(s));
            ctx.log_tree("check", s);
            match classify_stmt(&ctx.arena, &s) {
                | StmtShape::Expr(_) | StmtShape::If { .. } | StmtShape::FunctionDef => {
                    ctx.syn(s)?;
                }
                | StmtShape::Targeted { form, target } => {
                    let target_ty = ctx.syn(target)?;
                    let CanonicalTy { fragment, idx } = ctx.canonical(&target_ty, target)?;
                    let hook = match form {
                        | TargetedStmt::Delete => {
                            fragment.check_delete(ctx, s, &idx)?;
                            Hook::Delete
                        }
                        | TargetedStmt::Assign => {
                            fragment.check_assign_target(ctx, s, &idx)?;
                            Hook::Assign
                        }
                        | TargetedStmt::AugAssign => {
                            fragment.check_aug_assign(ctx, s, &idx)?;
                            Hook::AugAssign
                        }
                        | TargetedStmt::For => {
                            fragment.check_for(ctx, s, &idx)?;
                            Hook::For
                        }
                        | TargetedStmt::While => {
                            fragment.check_while(ctx, s, &idx)?;
                            Hook::While
                        }
                    };
                    ctx.state.delegations.insert(s, Delegation { fragment, idx: Some(idx), hook });
                }
                | StmtShape::Default(form) => {
                    let Some(fragment) = ctx.default_fragment() else {
                        return ctx.type_err("No default fragment.", s);
                    };
                    let hook = match form {
                        | DefaultStmt::Assign => {
                            fragment.check_assign(ctx, s)?;
                            Hook::CheckedAssign
                        }
                        | DefaultStmt::Return => {
                            fragment.check_return(ctx, s)?;
                            Hook::Return
                        }
                        | DefaultStmt::Raise => {
                            fragment.check_raise(ctx, s)?;
                            Hook::Raise
                        }
                        | DefaultStmt::Try => {
                            fragment.check_try(ctx, s)?;
                            Hook::Try
                        }
                        | DefaultStmt::Assert => {
                            fragment.check_assert(ctx, s)?;
                            Hook::Assert
                        }
                        | DefaultStmt::Pass => {
                            fragment.check_pass(ctx, s)?;
                            Hook::Pass
                        }
                        | DefaultStmt::Break => {
                            fragment.check_break(ctx, s)?;
                            Hook::Break
                        }
                        | DefaultStmt::Continue => {
                            fragment.check_continue(ctx, s)?;
                            Hook::Continue
                        }
                    };
                    ctx.state.delegations.insert(s, Delegation { fragment, idx: None, hook });
                }
                | StmtShape::Unsupported(msg) => return ctx.type_err(msg, s),
            }
            Ok(())
        })
    }
}
