use crate::{util, *};

/// IEEE 754 floating point numbers.
pub struct IeeeFragment;

static IEEE: IeeeFragment = IeeeFragment;

pub fn ieee() -> FragmentRef {
    FragmentRef(&IEEE)
}
pub fn ieee_ty() -> TyExpr {
    TyExpr::triv(ieee())
}

const SPECIAL: [&str; 3] = ["NaN", "Inf", "Infinity"];

fn ana_operands(ctx: &mut Context, operands: &[ExprId]) -> Result<()> {
    for operand in operands {
        util::ana_either(ctx, *operand, &ieee_ty(), &num_ty())?;
    }
    Ok(())
}

impl Fragment for IeeeFragment {
    fn name(&self) -> &'static str {
        "ieee"
    }
    fn precedence(&self) -> Vec<FragmentRef> {
        vec![num()]
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        util::trivial_idx(ctx, self.name(), idx, site)
    }

    /* ------------------------------ Literals ------------------------------ */

    fn ana_num(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        match util::num_lit(ctx, e)? {
            | Num::Int(_) | Num::Float(_) => Ok(()),
            | Num::Imag(_) => ctx.type_err("Invalid literal for ieee type.", e),
        }
    }
    /// Integer literals become float literals.
    fn trans_num(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        match util::num_lit(ctx, e)? {
            | Num::Int(n) => Ok(ctx.arena.float(n as f64)),
            | _ => Ok(e),
        }
    }

    /// `NaN`, `Inf` and `Infinity`
    fn ana_name(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let id = util::name(ctx, e)?;
        if SPECIAL.contains(&id.as_str()) {
            Ok(())
        } else {
            ctx.type_err("Invalid name constant for ieee type.", e)
        }
    }
    fn trans_name(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let id = util::name(ctx, e)?;
        let id = ctx.arena.str_lit(&id);
        Ok(util::builtin_call(ctx, "float", vec![id]))
    }

    fn ana_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let UnaryOp { op, operand } = util::unary_op(ctx, e)?;
        match op {
            | UnaryOperator::Not | UnaryOperator::Invert => {
                ctx.type_err("Invalid unary operator for ieee type.", e)
            }
            | _ => ctx.ana(operand, &ieee_ty()),
        }
    }
    fn trans_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_unary_op(ctx, e)
    }

    /* ------------------------------ Patterns ------------------------------ */

    fn ana_pat_num(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        match util::num_lit(ctx, pat)? {
            | Num::Int(_) | Num::Float(_) => Ok(Bindings::new()),
            | Num::Imag(_) => ctx.type_err("Invalid pattern literal for ieee type.", pat),
        }
    }
    fn trans_pat_num(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Ok((ctx.arena.compare(scrutinee, CmpOp::Eq, pat), IndexMap::new()))
    }

    fn ana_pat_name(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        let id = util::name(ctx, pat)?;
        if SPECIAL.contains(&id.as_str()) {
            Ok(Bindings::new())
        } else {
            ctx.type_err(format!("Invalid name constant for ieee type: {}", id), pat)
        }
    }
    /// `NaN` never equals itself, so it is tested with `math.isnan`.
    fn trans_pat_name(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let id = util::name(ctx, pat)?;
        let guard = if id == "NaN" {
            let math = ctx.add_import("math");
            let math = ctx.arena.name(&math);
            let isnan = ctx.arena.attr(math, "isnan");
            ctx.arena.call(isnan, vec![scrutinee])
        } else {
            let inf = ctx.arena.str_lit("Inf");
            let inf = util::builtin_call(ctx, "float", vec![inf]);
            ctx.arena.compare(scrutinee, CmpOp::Eq, inf)
        };
        Ok((guard, IndexMap::new()))
    }

    fn ana_pat_unary_op(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        let UnaryOp { op, operand } = util::unary_op(ctx, pat)?;
        match op {
            | UnaryOperator::USub | UnaryOperator::UAdd => ctx.ana_pat(operand, &ieee_ty()),
            | _ => ctx.type_err("Invalid pattern for ieee type.", pat),
        }
    }
    fn trans_pat_unary_op(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let UnaryOp { op, operand } = util::unary_op(ctx, pat)?;
        let zero = ctx.arena.float(0.0);
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
        self.ana_bin_op(ctx, e, &Idx::Triv)?;
        Ok(ieee_ty())
    }
    fn ana_bin_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let BinOp { left, op, right } = util::bin_op(ctx, e)?;
        if op.is_bitwise() || op == Operator::MatMult {
            return ctx.type_err("Invalid operator on ieee.", e);
        }
        ana_operands(ctx, &[left, right])
    }
    fn trans_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_bin_op(ctx, e)
    }

    fn syn_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let UnaryOp { op, .. } = util::unary_op(ctx, e)?;
        match op {
            | UnaryOperator::Not | UnaryOperator::Invert => {
                ctx.type_err("Invalid unary operator for ieee type.", e)
            }
            | _ => Ok(ieee_ty()),
        }
    }

    fn syn_compare(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let cmp = util::compare(ctx, e)?;
        if cmp.ops.iter().any(CmpOp::is_membership) {
            return ctx.type_err("Invalid comparison operator for ieee.", e);
        }
        ana_operands(ctx, &util::comparison_operands(&cmp))?;
        Ok(boolean_ty())
    }
    fn trans_compare(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_compare(ctx, e)
    }
}
