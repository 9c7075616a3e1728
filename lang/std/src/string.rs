use crate::{util, *};
use typy_statics::classify::fstring_parts;

pub struct StringFragment;

static STRING: StringFragment = StringFragment;

pub fn string() -> FragmentRef {
    FragmentRef(&STRING)
}
pub fn string_ty() -> TyExpr {
    TyExpr::triv(string())
}

impl Fragment for StringFragment {
    fn name(&self) -> &'static str {
        "string"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        util::trivial_idx(ctx, self.name(), idx, site)
    }

    fn ana_str(&self, _ctx: &mut Context, _e: ExprId, _idx: &Idx) -> Result<()> {
        Ok(())
    }
    fn trans_str(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }

    fn ana_joined_str(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        for part in fstring_parts(&ctx.arena, &e) {
            match ctx.arena.exprs[&part].clone() {
                | Expr::Str(_) => {}
                | Expr::FormattedValue(FormattedValue { value, conversion, format_spec }) => {
                    if conversion.is_some() {
                        return ctx.type_err("string types do not support conversions.", part);
                    }
                    if format_spec.is_some() {
                        return ctx
                            .type_err("string types do not support format specifications.", part);
                    }
                    ctx.ana(value, &string_ty())?;
                }
                | _ => return ctx.internal_err("Expected an f-string part.", part),
            }
        }
        Ok(())
    }
    fn trans_joined_str(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_joined_str(ctx, e)
    }

    fn ana_pat_str(&self, _ctx: &mut Context, _pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        Ok(Bindings::new())
    }
    fn trans_pat_str(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Ok((ctx.arena.compare(scrutinee, CmpOp::Eq, pat), IndexMap::new()))
    }

    /// `"lit" + p` and `p + "lit"`
    fn ana_pat_bin_op(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        Affixes::of_bin_op(ctx, pat)?.ana(ctx)
    }
    fn trans_pat_bin_op(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Affixes::of_bin_op(ctx, pat)?.trans(ctx, scrutinee)
    }
    /// `f"lit{p}lit"`
    fn ana_pat_joined_str(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx,
    ) -> Result<Bindings> {
        Affixes::of_joined_str(ctx, pat)?.ana(ctx)
    }
    fn trans_pat_joined_str(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Affixes::of_joined_str(ctx, pat)?.trans(ctx, scrutinee)
    }

    /* ------------------------------ Operators ----------------------------- */

    fn syn_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        self.ana_bin_op(ctx, e, &Idx::Triv)?;
        Ok(string_ty())
    }
    fn ana_bin_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let BinOp { left, op, right } = util::bin_op(ctx, e)?;
        if op != Operator::Add {
            return ctx.type_err("Invalid string operator.", e);
        }
        ctx.ana(left, &string_ty())?;
        ctx.ana(right, &string_ty())
    }
    fn trans_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_bin_op(ctx, e)
    }

    fn syn_compare(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let cmp = util::compare(ctx, e)?;
        if cmp.ops.iter().any(CmpOp::is_membership) {
            return ctx.type_err("Invalid comparison operator for strings.", e);
        }
        for operand in util::comparison_operands(&cmp) {
            ctx.ana(operand, &string_ty())?;
        }
        Ok(boolean_ty())
    }
    fn trans_compare(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_compare(ctx, e)
    }

    /* ------------------------------- Slicing ------------------------------ */

    /// `s[i]` and `s[lower:upper:step]` with `num` parts.
    fn syn_subscript(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let Subscript { slice, .. } = util::subscript(ctx, e)?;
        match slice {
            | Slice::Index(i) => ctx.ana(i, &num_ty())?,
            | Slice::Range(Range { lower, upper, step }) => {
                for part in [lower, upper, step].into_iter().flatten() {
                    ctx.ana(part, &num_ty())?;
                }
            }
            | Slice::Ext(_) => return ctx.type_err("Invalid string slice.", e),
        }
        Ok(string_ty())
    }
    fn trans_subscript(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Subscript { value, slice } = util::subscript(ctx, e)?;
        let value = ctx.trans(value)?;
        let slice = util::trans_slice(ctx, &slice)?;
        Ok(ctx.arena.subscript(value, slice))
    }
}

/* -------------------------------- Patterns -------------------------------- */

/// A string pattern read as a literal prefix, an optional subpattern for
/// the middle, and a literal suffix.
struct Affixes {
    prefix: String,
    suffix: String,
    hole: Option<ExprId>,
}

mod impls {
    use super::*;

    impl Affixes {
        pub(super) fn of_bin_op(ctx: &Context, pat: ExprId) -> Result<Self> {
            let BinOp { left, op, right } = util::bin_op(ctx, pat)?;
            if op != Operator::Add {
                return ctx.type_err("Invalid pattern operator on strings.", pat);
            }
            let literal = |e: ExprId| match &ctx.arena.exprs[&e] {
                | Expr::Str(Str(s)) => Some(s.clone()),
                | _ => None,
            };
            let (affixes, lit, lit_site) = match (literal(left), literal(right)) {
                | (Some(prefix), _) => {
                    let affixes =
                        Affixes { prefix: prefix.clone(), suffix: String::new(), hole: Some(right) };
                    (affixes, prefix, left)
                }
                | (None, Some(suffix)) => {
                    let affixes =
                        Affixes { prefix: String::new(), suffix: suffix.clone(), hole: Some(left) };
                    (affixes, suffix, right)
                }
                | (None, None) => {
                    return ctx.type_err("One side of + pattern must be a literal.", pat);
                }
            };
            if lit.is_empty() {
                return ctx.type_err("Literal pattern in + pattern must be non-empty.", lit_site);
            }
            Ok(affixes)
        }

        pub(super) fn of_joined_str(ctx: &Context, pat: ExprId) -> Result<Self> {
            let mut affixes = Affixes { prefix: String::new(), suffix: String::new(), hole: None };
            for part in fstring_parts(&ctx.arena, &pat) {
                match &ctx.arena.exprs[&part] {
                    | Expr::Str(Str(s)) if affixes.hole.is_none() => affixes.prefix += s,
                    | Expr::Str(Str(s)) => affixes.suffix += s,
                    | Expr::FormattedValue(FormattedValue { value, conversion, format_spec }) => {
                        if affixes.hole.is_some() {
                            return ctx.type_err(
                                "Can only have one formatted value in format string pattern.",
                                part,
                            );
                        }
                        if format_spec.is_some() {
                            return ctx.type_err(
                                "Cannot use format specification in format string pattern.",
                                part,
                            );
                        }
                        if conversion.is_some() {
                            return ctx
                                .type_err("Cannot use conversions in format string pattern.", part);
                        }
                        affixes.hole = Some(*value);
                    }
                    | _ => return ctx.internal_err("Expected an f-string part.", part),
                }
            }
            Ok(affixes)
        }

        pub(super) fn ana(&self, ctx: &mut Context) -> Result<Bindings> {
            match self.hole {
                | Some(hole) => ctx.ana_pat(hole, &string_ty()),
                | None => Ok(Bindings::new()),
            }
        }

        /// `s.startswith(prefix) and s.endswith(suffix)`, with the middle
        /// `s[len(prefix):-len(suffix)]` matched against the hole.
        pub(super) fn trans(&self, ctx: &mut Context, scrutinee: ExprId) -> Result<PatTrans> {
            let Some(hole) = self.hole else {
                let lit = ctx.arena.str_lit(&self.prefix);
                return Ok((ctx.arena.compare(scrutinee, CmpOp::Eq, lit), IndexMap::new()));
            };
            let (n_pre, n_suf) = (self.prefix.chars().count(), self.suffix.chars().count());
            let mut conditions = Vec::new();
            if n_pre > 0 && n_suf > 0 {
                // the affixes must not overlap
                let len = util::builtin_call(ctx, "len", vec![scrutinee]);
                let n = ctx.arena.int((n_pre + n_suf) as i64);
                conditions.push(ctx.arena.compare(len, CmpOp::GtE, n));
            }
            if n_pre > 0 {
                let prefix = ctx.arena.str_lit(&self.prefix);
                conditions.push(util::method_call(ctx, scrutinee, "startswith", vec![prefix]));
            }
            if n_suf > 0 {
                let suffix = ctx.arena.str_lit(&self.suffix);
                conditions.push(util::method_call(ctx, scrutinee, "endswith", vec![suffix]));
            }
            let middle = if n_pre == 0 && n_suf == 0 {
                scrutinee
            } else {
                let lower = (n_pre > 0).then(|| ctx.arena.int(n_pre as i64));
                let upper = (n_suf > 0).then(|| ctx.arena.int(-(n_suf as i64)));
                ctx.arena.subscript(scrutinee, HostArena::range(lower, upper, None))
            };
            let mut values = IndexMap::new();
            util::trans_subpat(ctx, hole, middle, &mut conditions, &mut values)?;
            Ok((util::conj(ctx, conditions), values))
        }
    }
}
