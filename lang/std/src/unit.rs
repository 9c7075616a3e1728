use crate::{util, *};

pub struct UnitFragment;

static UNIT: UnitFragment = UnitFragment;

pub fn unit() -> FragmentRef {
    FragmentRef(&UNIT)
}
pub fn unit_ty() -> TyExpr {
    TyExpr::triv(unit())
}

impl Fragment for UnitFragment {
    fn name(&self) -> &'static str {
        "unit"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        util::trivial_idx(ctx, self.name(), idx, site)
    }

    fn ana_tuple(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let Tuple { elts } = util::tuple(ctx, e)?;
        if !elts.is_empty() {
            return ctx.type_err("Tuple must be empty to be a unit value.", e);
        }
        Ok(())
    }
    fn trans_tuple(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }

    fn ana_pat_tuple(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        let Tuple { elts } = util::tuple(ctx, pat)?;
        if !elts.is_empty() {
            return ctx.type_err("Tuple pattern must be empty to match unit values.", pat);
        }
        Ok(Bindings::new())
    }
    fn trans_pat_tuple(
        &self, ctx: &mut Context, _pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Ok((ctx.arena.bool_lit(true), IndexMap::new()))
    }

    fn syn_compare(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let cmp = util::compare(ctx, e)?;
        if cmp.ops.iter().any(|op| op.is_ordering() || op.is_membership()) {
            return ctx.type_err("Invalid comparison operator on unit.", e);
        }
        for operand in util::comparison_operands(&cmp) {
            ctx.ana(operand, &unit_ty())?;
        }
        Ok(boolean_ty())
    }
    fn trans_compare(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_compare(ctx, e)
    }
}
