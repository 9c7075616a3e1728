use crate::{classify::*, syntax::*, *};
use std::rc::Rc;

impl Context {
    /// The items of a block: its statements, with every scrutinizer and the
    /// rules following it grouped into one match.
    pub fn segments(&mut self, b: BlockId) -> Result<Rc<[Item]>> {
        if let Some(items) = self.segments.get(&b) {
            return Ok(items.clone());
        }
        let stmts = self.arena.stmts_of(&b).to_vec();
        let mut items = Vec::new();
        let mut iter = stmts.into_iter().peekable();
        while let Some(s) = iter.next() {
            let Some(scrutinee) = scrutinee_of(&self.arena, &s) else {
                items.push(Item::Stmt(s));
                continue;
            };
            let mut rules = Vec::new();
            while let Some(next) = iter.peek().copied() {
                if !matches!(self.arena.stmts[&next], Stmt::With(_)) {
                    break;
                }
                iter.next();
                match rule_of(&self.arena, &next) {
                    | Some(rule) => rules.push(rule),
                    | None => return self.type_err("Invalid match rule.", next),
                }
            }
            let m = self.matches.alloc(MatchGroup { scrutinizer: s, scrutinee, rules });
            items.push(Item::Match(m));
        }
        let items: Rc<[Item]> = items.into();
        self.segments.insert(b, items.clone());
        Ok(items)
    }

    fn check_item(&mut self, item: Item) -> Result<()> {
        match item {
            | Item::Stmt(s) => self.check(s),
            | Item::Match(m) => self.syn(m).map(|_| ()),
        }
    }

    /// Checks every statement of a block; the block has no value.
    pub fn check_block(&mut self, b: BlockId) -> Result<()> {
        for item in self.segments(b)?.iter() {
            self.check_item(*item)?;
        }
        Ok(())
    }

    /// Synthesizes the type of a block's value, its last statement.
    pub fn syn_block(&mut self, b: BlockId, site: impl Into<Tree>) -> Result<TyExpr> {
        let items = self.segments(b)?;
        let Some((last, init)) = items.split_last() else {
            return self.type_err("Empty block", site);
        };
        for item in init {
            self.check_item(*item)?;
        }
        match last {
            | Item::Stmt(s) => match classify_stmt(&self.arena, s) {
                | StmtShape::Expr(_) | StmtShape::If { .. } | StmtShape::FunctionDef => self.syn(*s),
                | _ => self.type_err("Block must end with a statement-expression.", *s),
            },
            | Item::Match(m) => self.syn(*m),
        }
    }

    /// Analyzes a block's value against `ty`. A block may also end by
    /// raising.
    pub fn ana_block(&mut self, b: BlockId, ty: &TyExpr, site: impl Into<Tree>) -> Result<()> {
        let items = self.segments(b)?;
        let Some((last, init)) = items.split_last() else {
            return self.type_err("Empty block", site);
        };
        for item in init {
            self.check_item(*item)?;
        }
        match last {
            | Item::Stmt(s) => match classify_stmt(&self.arena, s) {
                | StmtShape::Expr(_) | StmtShape::If { .. } | StmtShape::FunctionDef => {
                    self.ana(*s, ty)
                }
                | StmtShape::Default(DefaultStmt::Raise) => self.check(*s),
                | _ => self.type_err("Block must end with a statement-expression.", *s),
            },
            | Item::Match(m) => self.ana(*m, ty),
        }
    }
}

/* --------------------------------- Matches -------------------------------- */

impl Context {
    /// The first rule synthesizes the type of the match; the rest are
    /// analyzed against it.
    pub(super) fn syn_match(&mut self, m: MatchId) -> Result<TyExpr> {
        let MatchGroup { scrutinee, rules, .. } = self.matches[&m].clone();
        let scrutinee_ty = self.syn(scrutinee)?;
        let Some((first, rest)) = rules.split_first() else {
            return self.type_err(
                "Cannot synthesize a type for a match statement expression without any rules.",
                m,
            );
        };
        let ty = self.in_rule(first, &scrutinee_ty, |ctx, body| ctx.syn_block(body, first.stmt))?;
        for rule in rest {
            self.in_rule(rule, &scrutinee_ty, |ctx, body| ctx.ana_block(body, &ty, rule.stmt))?;
        }
        Ok(ty)
    }

    pub(super) fn ana_match(&mut self, m: MatchId, ty: &TyExpr) -> Result<()> {
        let MatchGroup { scrutinee, rules, .. } = self.matches[&m].clone();
        let scrutinee_ty = self.syn(scrutinee)?;
        for rule in rules.iter() {
            self.in_rule(rule, &scrutinee_ty, |ctx, body| ctx.ana_block(body, ty, rule.stmt))?;
        }
        Ok(())
    }

    /// Runs `f` on the body of `rule` with the variables of its pattern in
    /// scope.
    fn in_rule<T>(
        &mut self, rule: &Rule, scrutinee_ty: &TyExpr,
        f: impl FnOnce(&mut Self, BlockId) -> Result<T>,
    ) -> Result<T> {
        self.push_scope();
        let res = match self.ana_pat(rule.pat, scrutinee_ty) {
            | Ok(bindings) => {
                self.bind_pattern(rule.pat, &bindings);
                f(self, rule.body)
            }
            | Err(entry) => Err(entry),
        };
        self.pop_scope();
        res
    }
}
