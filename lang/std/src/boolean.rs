use crate::{util, *};

pub struct BooleanFragment;

static BOOLEAN: BooleanFragment = BooleanFragment;

pub fn boolean() -> FragmentRef {
    FragmentRef(&BOOLEAN)
}
pub fn boolean_ty() -> TyExpr {
    TyExpr::triv(boolean())
}

impl Fragment for BooleanFragment {
    fn name(&self) -> &'static str {
        "boolean"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        util::trivial_idx(ctx, self.name(), idx, site)
    }

    /* ------------------------------ Literals ------------------------------ */

    fn ana_name_constant(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        match util::name_constant(ctx, e)? {
            | NameConstant::True | NameConstant::False => Ok(()),
            | NameConstant::None => ctx.type_err("Invalid name constant: None", e),
        }
    }
    fn trans_name_constant(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }

    fn ana_pat_name_constant(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx,
    ) -> Result<Bindings> {
        match util::name_constant(ctx, pat)? {
            | NameConstant::True | NameConstant::False => Ok(Bindings::new()),
            | NameConstant::None => ctx.type_err("Invalid name constant: None", pat),
        }
    }
    fn trans_pat_name_constant(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let guard = match util::name_constant(ctx, pat)? {
            | NameConstant::True => scrutinee,
            | _ => ctx.arena.unary(UnaryOperator::Not, scrutinee),
        };
        Ok((guard, IndexMap::new()))
    }

    /* ------------------------------ Operators ----------------------------- */

    fn syn_bool_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let BoolOp { values, .. } = util::bool_op(ctx, e)?;
        for value in values {
            ctx.ana(value, &boolean_ty())?;
        }
        Ok(boolean_ty())
    }
    fn ana_bool_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        self.syn_bool_op(ctx, e).map(|_| ())
    }
    fn trans_bool_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_bool_op(ctx, e)
    }

    fn syn_compare(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let cmp = util::compare(ctx, e)?;
        if cmp.ops.iter().any(|op| op.is_ordering() || op.is_membership()) {
            return ctx.type_err("Invalid comparison operator on boolean.", e);
        }
        for operand in util::comparison_operands(&cmp) {
            ctx.ana(operand, &boolean_ty())?;
        }
        Ok(boolean_ty())
    }
    fn trans_compare(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_compare(ctx, e)
    }

    fn syn_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let UnaryOp { op, .. } = util::unary_op(ctx, e)?;
        match op {
            | UnaryOperator::Not => Ok(boolean_ty()),
            | op => ctx.type_err(format!("Invalid unary operator '{}' for boolean.", op), e),
        }
    }
    fn trans_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_unary_op(ctx, e)
    }

    /* ---------------------------- Conditionals ---------------------------- */

    fn syn_if_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let IfExp { body, orelse, .. } = util::if_exp(ctx, e)?;
        let ty = ctx.syn(body)?;
        ctx.ana(orelse, &ty)?;
        Ok(ty)
    }
    fn ana_if_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx, ty: &TyExpr) -> Result<()> {
        let IfExp { body, orelse, .. } = util::if_exp(ctx, e)?;
        ctx.ana(body, ty)?;
        ctx.ana(orelse, ty)
    }
    fn trans_if_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_if_exp(ctx, e)
    }

    /// An `if` without `else` runs for effect and has type unit.
    fn syn_if(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<TyExpr> {
        let If { body, orelse, .. } = util::if_stmt(ctx, s)?;
        ctx.push_scope();
        let res = if ctx.arena.stmts_of(&orelse).is_empty() {
            ctx.check_block(body).map(|()| unit_ty())
        } else {
            ctx.syn_block(body, s)
        };
        ctx.pop_scope();
        let ty = res?;
        if !ctx.arena.stmts_of(&orelse).is_empty() {
            ctx.push_scope();
            let res = ctx.ana_block(orelse, &ty, s);
            ctx.pop_scope();
            res?;
        }
        Ok(ty)
    }
    fn ana_if(&self, ctx: &mut Context, s: StmtId, _idx: &Idx, ty: &TyExpr) -> Result<()> {
        let If { body, orelse, .. } = util::if_stmt(ctx, s)?;
        if ctx.arena.stmts_of(&orelse).is_empty() {
            let found = self.syn_if(ctx, s, &Idx::Triv)?;
            if ctx.ty_expr_eq(ty, &found, &Kind::Type)? {
                return Ok(());
            }
            return ctx.mismatch(ty, &found, s.into());
        }
        for block in [body, orelse] {
            ctx.push_scope();
            let res = ctx.ana_block(block, ty, s);
            ctx.pop_scope();
            res?;
        }
        Ok(())
    }
    fn trans_if(
        &self, ctx: &mut Context, s: StmtId, _idx: &Idx, mechanism: Mechanism,
    ) -> Result<Vec<StmtId>> {
        let If { test, body, orelse } = util::if_stmt(ctx, s)?;
        let test = ctx.trans(test)?;
        if ctx.arena.stmts_of(&orelse).is_empty() {
            let body = ctx.trans_block(body, Mechanism::Statement)?;
            let mut tr = vec![ctx.arena.if_stmt(test, body, Vec::new())];
            if mechanism != Mechanism::Statement {
                let unit = ctx.arena.tuple(Vec::new());
                tr.push(ctx.deliver(unit, mechanism));
            }
            return Ok(tr);
        }
        let body = ctx.trans_block(body, mechanism)?;
        let orelse = ctx.trans_block(orelse, mechanism)?;
        Ok(vec![ctx.arena.if_stmt(test, body, orelse)])
    }
}
