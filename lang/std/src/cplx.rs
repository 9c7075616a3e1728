use crate::{util, *};

/// Complex numbers, written as numbers or `(re, im)` pairs.
pub struct CplxFragment;

static CPLX: CplxFragment = CplxFragment;

pub fn cplx() -> FragmentRef {
    FragmentRef(&CPLX)
}
pub fn cplx_ty() -> TyExpr {
    TyExpr::triv(cplx())
}

fn is_imag(ctx: &Context, e: ExprId) -> bool {
    matches!(ctx.arena.exprs[&e], Expr::Num(Num::Imag(_)))
}

#[track_caller]
fn pair(ctx: &Context, e: ExprId, msg: &str) -> Result<(ExprId, ExprId)> {
    let Tuple { elts } = util::tuple(ctx, e)?;
    match elts.as_slice() {
        | [re, im] => Ok((*re, *im)),
        | _ => ctx.type_err(msg, e),
    }
}

fn ana_operands(ctx: &mut Context, operands: &[ExprId]) -> Result<()> {
    let tys = [cplx_ty(), ieee_ty(), num_ty()];
    for operand in operands {
        util::ana_first(ctx, *operand, &tys)?;
    }
    Ok(())
}

impl Fragment for CplxFragment {
    fn name(&self) -> &'static str {
        "cplx"
    }
    fn precedence(&self) -> Vec<FragmentRef> {
        vec![num(), ieee()]
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        util::trivial_idx(ctx, self.name(), idx, site)
    }

    /* ------------------------------ Literals ------------------------------ */

    fn ana_num(&self, _ctx: &mut Context, _e: ExprId, _idx: &Idx) -> Result<()> {
        Ok(())
    }
    fn trans_num(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        if is_imag(ctx, e) {
            return Ok(e);
        }
        Ok(util::builtin_call(ctx, "complex", vec![e]))
    }

    /// `(re, im)`
    fn ana_tuple(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let (re, im) = pair(ctx, e, "Using a tuple to introduce a value of type cplx requires two elements.")?;
        ctx.ana(re, &ieee_ty())?;
        if !is_imag(ctx, im) {
            ctx.ana(im, &ieee_ty())?;
        }
        Ok(())
    }
    fn trans_tuple(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let (re, im) = pair(ctx, e, "Expected a pair.")?;
        let re = ctx.trans(re)?;
        let im = match ctx.arena.exprs[&im] {
            | Expr::Num(Num::Imag(x)) => ctx.arena.float(x),
            | _ => ctx.trans(im)?,
        };
        Ok(util::builtin_call(ctx, "complex", vec![re, im]))
    }

    fn ana_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let UnaryOp { op, operand } = util::unary_op(ctx, e)?;
        match op {
            | UnaryOperator::UAdd | UnaryOperator::USub => ctx.ana(operand, &cplx_ty()),
            | _ => ctx.type_err("Invalid unary operator for cplx type.", e),
        }
    }
    fn trans_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_unary_op(ctx, e)
    }

    /* ------------------------------ Patterns ------------------------------ */

    fn ana_pat_num(&self, _ctx: &mut Context, _pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        Ok(Bindings::new())
    }
    fn trans_pat_num(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Ok((ctx.arena.compare(scrutinee, CmpOp::Eq, pat), IndexMap::new()))
    }

    /// `(re, im)` matches the real and imaginary parts.
    fn ana_pat_tuple(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        let (re, im) = pair(ctx, pat, "Tuple pattern for cplx type requires two elements.")?;
        let mut bindings = ctx.ana_pat(re, &ieee_ty())?;
        if !is_imag(ctx, im) {
            let im_bindings = ctx.ana_pat(im, &ieee_ty())?;
            ctx.merge_bindings(&mut bindings, im_bindings, pat)?;
        }
        Ok(bindings)
    }
    fn trans_pat_tuple(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let (re, im) = pair(ctx, pat, "Expected a pair.")?;
        let mut conditions = Vec::new();
        let mut values = IndexMap::new();
        let real = ctx.arena.attr(scrutinee, "real");
        util::trans_subpat(ctx, re, real, &mut conditions, &mut values)?;
        let imag = ctx.arena.attr(scrutinee, "imag");
        match ctx.arena.exprs[&im] {
            | Expr::Num(Num::Imag(x)) => {
                let x = ctx.arena.float(x);
                conditions.push(ctx.arena.compare(imag, CmpOp::Eq, x));
            }
            | _ => util::trans_subpat(ctx, im, imag, &mut conditions, &mut values)?,
        }
        Ok((util::conj(ctx, conditions), values))
    }

    /* ---------------------------- Projections ----------------------------- */

    fn syn_attribute(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let Attribute { attr, .. } = util::attribute(ctx, e)?;
        match attr.as_str() {
            | "real" | "imag" => Ok(ieee_ty()),
            | _ => ctx.type_err(format!("Invalid attribute: {}", attr), e),
        }
    }
    fn trans_attribute(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Attribute { value, attr } = util::attribute(ctx, e)?;
        let value = ctx.trans(value)?;
        Ok(ctx.arena.attr(value, &attr))
    }

    /* ------------------------------ Operators ----------------------------- */

    fn syn_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        self.ana_bin_op(ctx, e, &Idx::Triv)?;
        Ok(cplx_ty())
    }
    fn ana_bin_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let BinOp { left, op, right } = util::bin_op(ctx, e)?;
        match op {
            | Operator::Add | Operator::Sub | Operator::Mult | Operator::Div | Operator::Pow => {
                ana_operands(ctx, &[left, right])
            }
            | _ => ctx.type_err("Invalid operator on cplx.", e),
        }
    }
    fn trans_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_bin_op(ctx, e)
    }

    fn syn_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let UnaryOp { op, .. } = util::unary_op(ctx, e)?;
        match op {
            | UnaryOperator::UAdd | UnaryOperator::USub => Ok(cplx_ty()),
            | _ => ctx.type_err("Invalid unary operator for cplx type.", e),
        }
    }

    fn syn_compare(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let cmp = util::compare(ctx, e)?;
        if cmp.ops.iter().any(|op| op.is_ordering() || op.is_membership()) {
            return ctx.type_err("Invalid comparison operator for cplx.", e);
        }
        ana_operands(ctx, &util::comparison_operands(&cmp))?;
        Ok(boolean_ty())
    }
    fn trans_compare(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_compare(ctx, e)
    }
}
