//! Tagged sums: `variant[Nil, Cons(num, List)]`.
//!
//! A value is a host tuple whose first element is the tag as a string,
//! followed by the constructor arguments.

use crate::{util, *};

pub struct VariantFragment;

static VARIANT: VariantFragment = VariantFragment;

pub fn variant() -> FragmentRef {
    FragmentRef(&VARIANT)
}
pub fn variant_ty<'a>(cases: impl IntoIterator<Item = (&'a str, Vec<TyExpr>)>) -> TyExpr {
    let cases = cases.into_iter().map(|(tag, tys)| (tag.to_string(), tys));
    TyExpr::canonical(variant(), Idx::Cases(cases.collect()))
}

fn is_tag(id: &str) -> bool {
    id.chars().next().is_some_and(char::is_uppercase)
}

/// The argument types of `tag`.
#[track_caller]
fn case<'a>(ctx: &Context, idx: &'a Idx, tag: &str, site: ExprId) -> Result<&'a [TyExpr]> {
    match util::cases(ctx, idx, site)?.get(tag) {
        | Some(tys) => Ok(tys),
        | None => ctx.type_err(format!("Invalid tag: {}", tag), site),
    }
}

/// Splits a constructor call into its tag and arguments.
fn constructor_call(ctx: &Context, e: ExprId) -> Result<(String, Vec<ExprId>)> {
    let Call { func, args, keywords } = util::call(ctx, e)?;
    if !keywords.is_empty() {
        return ctx.type_err("Keyword arguments are not supported.", e);
    }
    match ctx.arena.name_of(&func) {
        | Some(tag) if is_tag(tag) => Ok((tag.to_string(), args)),
        | _ => ctx.type_err("Invalid tag.", func),
    }
}

#[track_caller]
fn arity(ctx: &Context, expected: usize, found: usize, site: ExprId) -> Result<()> {
    if found > expected {
        return ctx.type_err("Too many arguments.", site);
    }
    if found < expected {
        return ctx.type_err("Too few arguments.", site);
    }
    Ok(())
}

/// `scrutinee[0] == 'Tag'`
fn tag_test(ctx: &mut Context, scrutinee: ExprId, tag: &str) -> ExprId {
    let head = util::item(ctx, scrutinee, 0);
    let tag = ctx.arena.str_lit(tag);
    ctx.arena.compare(head, CmpOp::Eq, tag)
}

impl Fragment for VariantFragment {
    fn name(&self) -> &'static str {
        "variant"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        let Some(idx) = idx else {
            return ctx.formation_err("Invalid case specification.", site);
        };
        let mut cases = IndexMap::new();
        for dim in util::dims(&ctx.arena, idx) {
            let Slice::Index(case) = dim else {
                return ctx.formation_err("Invalid case specification.", site);
            };
            let (tag, args) = match ctx.arena.exprs[&case].clone() {
                | Expr::Name(Name(tag)) => (tag, Vec::new()),
                | Expr::Call(Call { func, args, keywords }) if keywords.is_empty() => {
                    match ctx.arena.name_of(&func) {
                        | Some(tag) => (tag.to_string(), args),
                        | None => return ctx.formation_err("Invalid case specification.", case),
                    }
                }
                | _ => return ctx.formation_err("Invalid case specification.", case),
            };
            if !is_tag(&tag) {
                return ctx.formation_err("Tag must start with an uppercase letter.", case);
            }
            if cases.contains_key(&tag) {
                return ctx.formation_err(format!("Duplicate tag: {}", tag), case);
            }
            let tys = args.into_iter().map(|arg| ctx.as_type(arg)).collect::<Result<Vec<_>>>()?;
            cases.insert(tag, tys);
        }
        Ok(Idx::Cases(cases))
    }
    /// Cases are compared by tag, whatever order they were declared in.
    fn idx_eq(
        &self, ctx: &mut Context, idx1: &Idx, idx2: &Idx, assumptions: &mut Assumptions,
    ) -> Result<bool> {
        let (Idx::Cases(a), Idx::Cases(b)) = (idx1, idx2) else { return Ok(false) };
        if a.len() != b.len() {
            return Ok(false);
        }
        for (tag, tys1) in a {
            let Some(tys2) = b.get(tag) else { return Ok(false) };
            if tys1.len() != tys2.len() {
                return Ok(false);
            }
            for (t1, t2) in tys1.iter().zip(tys2) {
                if !ctx.ty_expr_eq_under(t1, t2, &Kind::Type, assumptions)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /* ---------------------------- Constructors ---------------------------- */

    /// `Nil`
    fn ana_name(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<()> {
        let tag = util::name(ctx, e)?;
        if !case(ctx, idx, &tag, e)?.is_empty() {
            return ctx.type_err("Missing arguments to constructor.", e);
        }
        Ok(())
    }
    fn trans_name(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let tag = util::name(ctx, e)?;
        let tag = ctx.arena.str_lit(&tag);
        Ok(ctx.arena.tuple(vec![tag]))
    }

    /// `Cons(1, xs)`
    fn ana_call(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<()> {
        let (tag, args) = constructor_call(ctx, e)?;
        let tys = case(ctx, idx, &tag, e)?;
        arity(ctx, tys.len(), args.len(), e)?;
        for (arg, ty) in args.into_iter().zip(tys) {
            ctx.ana(arg, ty)?;
        }
        Ok(())
    }
    fn trans_call(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let (tag, args) = constructor_call(ctx, e)?;
        let mut elts = vec![ctx.arena.str_lit(&tag)];
        elts.extend(util::trans_exprs(ctx, args)?);
        Ok(ctx.arena.tuple(elts))
    }

    /* ------------------------------ Patterns ------------------------------ */

    fn ana_pat_name(&self, ctx: &mut Context, pat: ExprId, idx: &Idx) -> Result<Bindings> {
        let tag = util::name(ctx, pat)?;
        if !case(ctx, idx, &tag, pat)?.is_empty() {
            return ctx.type_err("Missing arguments to constructor.", pat);
        }
        Ok(Bindings::new())
    }
    fn trans_pat_name(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let tag = util::name(ctx, pat)?;
        Ok((tag_test(ctx, scrutinee, &tag), IndexMap::new()))
    }

    fn ana_pat_call(&self, ctx: &mut Context, pat: ExprId, idx: &Idx) -> Result<Bindings> {
        let (tag, args) = constructor_call(ctx, pat)?;
        let tys = case(ctx, idx, &tag, pat)?;
        arity(ctx, tys.len(), args.len(), pat)?;
        let pats: Vec<_> = args.into_iter().zip(tys.iter().cloned()).collect();
        util::ana_subpats(ctx, pats, pat)
    }
    fn trans_pat_call(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let (tag, args) = constructor_call(ctx, pat)?;
        let mut conditions = vec![tag_test(ctx, scrutinee, &tag)];
        let mut values = IndexMap::new();
        for (i, arg) in args.into_iter().enumerate() {
            let item = util::item(ctx, scrutinee, i + 1);
            util::trans_subpat(ctx, arg, item, &mut conditions, &mut values)?;
        }
        Ok((util::conj(ctx, conditions), values))
    }
}
