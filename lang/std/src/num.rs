use crate::{util, *};

/// Integers.
pub struct NumFragment;

static NUM: NumFragment = NumFragment;

pub fn num() -> FragmentRef {
    FragmentRef(&NUM)
}
pub fn num_ty() -> TyExpr {
    TyExpr::triv(num())
}

/// Operands of arithmetic on numbers: `num` where possible, `ieee`
/// otherwise. Returns whether any operand is an `ieee`.
fn ana_operands(ctx: &mut Context, operands: &[ExprId]) -> Result<bool> {
    let mut any_ieee = false;
    for operand in operands {
        any_ieee |= util::ana_either(ctx, *operand, &num_ty(), &ieee_ty())?;
    }
    Ok(any_ieee)
}

impl Fragment for NumFragment {
    fn name(&self) -> &'static str {
        "num"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        util::trivial_idx(ctx, self.name(), idx, site)
    }

    /* ------------------------------ Literals ------------------------------ */

    fn ana_num(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        match util::num_lit(ctx, e)? {
            | Num::Int(_) => Ok(()),
            | _ => ctx.type_err("Invalid literal for num type.", e),
        }
    }
    fn trans_num(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }

    /// `-1`, `+1`, `~1`
    fn ana_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let UnaryOp { op, operand } = util::unary_op(ctx, e)?;
        if op == UnaryOperator::Not {
            return ctx.type_err("Invalid unary operator 'not' for num type.", e);
        }
        ctx.ana(operand, &num_ty())
    }
    fn trans_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_unary_op(ctx, e)
    }

    /* ------------------------------ Patterns ------------------------------ */

    fn ana_pat_num(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        match util::num_lit(ctx, pat)? {
            | Num::Int(_) => Ok(Bindings::new()),
            | _ => ctx.type_err("Invalid pattern literal for num type.", pat),
        }
    }
    fn trans_pat_num(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Ok((ctx.arena.compare(scrutinee, CmpOp::Eq, pat), IndexMap::new()))
    }

    /// `-n` matches negative numbers with `n` bound to the magnitude, and
    /// `+n` positive ones.
    fn ana_pat_unary_op(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        let UnaryOp { op, operand } = util::unary_op(ctx, pat)?;
        match op {
            | UnaryOperator::USub | UnaryOperator::UAdd => ctx.ana_pat(operand, &num_ty()),
            | _ => ctx.type_err("Invalid pattern for num type.", pat),
        }
    }
    fn trans_pat_unary_op(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let UnaryOp { op, operand } = util::unary_op(ctx, pat)?;
        let zero = ctx.arena.int(0);
        let (sign, inner) = match op {
            | UnaryOperator::USub => {
                let sign = ctx.arena.compare(scrutinee, CmpOp::Lt, zero);
                (sign, ctx.arena.unary(UnaryOperator::USub, scrutinee))
            }
            | _ => (ctx.arena.compare(scrutinee, CmpOp::Gt, zero), scrutinee),
        };
        let (guard, values) = ctx.trans_pat(operand, inner)?;
        Ok((util::conj(ctx, vec![sign, guard]), values))
    }

    /* ------------------------------ Operators ----------------------------- */

    fn syn_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let BinOp { left, op, right } = util::bin_op(ctx, e)?;
        if op == Operator::MatMult {
            return ctx.type_err("Invalid operator on numbers.", e);
        }
        if op.is_bitwise() {
            ctx.ana(left, &num_ty())?;
            ctx.ana(right, &num_ty())?;
            return Ok(num_ty());
        }
        let any_ieee = ana_operands(ctx, &[left, right])?;
        if any_ieee || op == Operator::Div { Ok(ieee_ty()) } else { Ok(num_ty()) }
    }
    fn ana_bin_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let BinOp { left, op, right } = util::bin_op(ctx, e)?;
        match op {
            | Operator::MatMult => ctx.type_err("Invalid operator on numbers.", e),
            | Operator::Div => ctx.type_err("Cannot use division at num type.", e),
            | _ => {
                ctx.ana(left, &num_ty())?;
                ctx.ana(right, &num_ty())
            }
        }
    }
    fn trans_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_bin_op(ctx, e)
    }

    fn syn_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let UnaryOp { op, .. } = util::unary_op(ctx, e)?;
        if op == UnaryOperator::Not {
            return ctx.type_err("Invalid unary operator 'not' for num type.", e);
        }
        Ok(num_ty())
    }

    fn syn_compare(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let cmp = util::compare(ctx, e)?;
        if cmp.ops.iter().any(CmpOp::is_membership) {
            return ctx.type_err("Invalid comparison operator for num.", e);
        }
        ana_operands(ctx, &util::comparison_operands(&cmp))?;
        Ok(boolean_ty())
    }
    fn trans_compare(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_compare(ctx, e)
    }
}
