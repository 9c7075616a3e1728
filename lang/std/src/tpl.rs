//! Labelled tuples.
//!
//! `tpl[A, B]` has positional fields, `tpl[a : A, 'b' : B]` named ones; the
//! two can be mixed. Values are host tuples holding the fields in index
//! order.

use crate::{util, *};

pub struct TplFragment;

static TPL: TplFragment = TplFragment;

pub fn tpl() -> FragmentRef {
    FragmentRef(&TPL)
}
pub fn tpl_ty(fields: impl IntoIterator<Item = (Label, TyExpr)>) -> TyExpr {
    TyExpr::canonical(tpl(), Idx::Fields(fields.into_iter().collect()))
}

/// The label written in a field specification or a dict key.
fn label_of(ctx: &Context, e: ExprId) -> Option<Label> {
    match &ctx.arena.exprs[&e] {
        | Expr::Name(Name(id)) => Some(Label::Name(id.clone())),
        | Expr::Str(Str(s)) => Some(Label::Name(s.clone())),
        | Expr::Num(Num::Int(n)) if *n >= 0 => Some(Label::Pos(*n as usize)),
        | _ => None,
    }
}

#[track_caller]
fn position(ctx: &Context, idx: &Idx, label: &Label, site: ExprId) -> Result<(usize, TyExpr)> {
    let fields = util::fields(ctx, idx, site)?;
    match fields.get_full(label) {
        | Some((pos, _, ty)) => Ok((pos, ty.clone())),
        | None => ctx.type_err("Label not found in type.", site),
    }
}

/// Pairs every key of a dict literal or pattern with the position and type
/// of its field; every field must be mentioned exactly once.
fn keyed(
    ctx: &Context, idx: &Idx, keys: &[ExprId], site: ExprId, missing: &str, extra: &str,
) -> Result<Vec<(usize, TyExpr)>> {
    let fields = util::fields(ctx, idx, site)?;
    let mut seen = Vec::new();
    for key in keys {
        let Some(label) = label_of(ctx, *key) else {
            return ctx.type_err("Invalid label.", *key);
        };
        let (pos, ty) = position(ctx, idx, &label, *key)?;
        if seen.iter().any(|(p, _)| *p == pos) {
            return ctx.type_err("Duplicate label.", *key);
        }
        seen.push((pos, ty));
    }
    if seen.len() < fields.len() {
        return ctx.type_err(missing, site);
    }
    if seen.len() > fields.len() {
        return ctx.type_err(extra, site);
    }
    Ok(seen)
}

impl Fragment for TplFragment {
    fn name(&self) -> &'static str {
        "tpl"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        let Some(idx) = idx else {
            return ctx.formation_err("Invalid tpl specification.", site);
        };
        let mut fields = IndexMap::new();
        for (i, dim) in util::dims(&ctx.arena, idx).into_iter().enumerate() {
            let (label, ty) = match dim {
                | Slice::Index(ty) => (Label::Pos(i), ty),
                | Slice::Range(Range { lower: Some(label), upper: Some(ty), step: None }) => {
                    let label = match &ctx.arena.exprs[&label] {
                        | Expr::Str(Str(s)) if s.is_empty() => {
                            return ctx.formation_err("Empty label.", label);
                        }
                        | Expr::UnaryOp(UnaryOp { op: UnaryOperator::USub, operand })
                            if matches!(ctx.arena.exprs[operand], Expr::Num(Num::Int(_))) =>
                        {
                            return ctx.formation_err("Negative numeric label.", label);
                        }
                        | _ => match label_of(ctx, label) {
                            | Some(label) => label,
                            | None => return ctx.formation_err("Invalid tpl specification.", label),
                        },
                    };
                    (label, ty)
                }
                | _ => return ctx.formation_err("Invalid tpl specification.", site),
            };
            if fields.contains_key(&label) {
                return ctx.formation_err("Duplicate label.", site);
            }
            let ty = ctx.as_type(ty)?;
            fields.insert(label, ty);
        }
        Ok(Idx::Fields(fields))
    }

    /* ------------------------------ Literals ------------------------------ */

    fn ana_tuple(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<()> {
        let Tuple { elts } = util::tuple(ctx, e)?;
        let fields = util::fields(ctx, idx, e)?;
        if elts.len() != fields.len() {
            return ctx.type_err("Incorrect number of elements.", e);
        }
        for (elt, ty) in elts.into_iter().zip(fields.values()) {
            ctx.ana(elt, ty)?;
        }
        Ok(())
    }
    fn trans_tuple(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Tuple { elts } = util::tuple(ctx, e)?;
        let elts = util::trans_exprs(ctx, elts)?;
        Ok(ctx.arena.tuple(elts))
    }

    /// `{a: 1, 'b': 2, 0: 3}`
    fn ana_dict(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<()> {
        let Dict { keys, values } = util::dict(ctx, e)?;
        let keyed = keyed(
            ctx,
            idx,
            &keys,
            e,
            "Labels do not match those in type.",
            "Labels do not match those in type.",
        )?;
        for (value, (_, ty)) in values.into_iter().zip(keyed) {
            ctx.ana(value, &ty)?;
        }
        Ok(())
    }
    fn trans_dict(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<ExprId> {
        let Dict { keys, values } = util::dict(ctx, e)?;
        let keyed = keyed(ctx, idx, &keys, e, "Missing fields.", "Too many fields.")?;
        let mut slots: Vec<_> = keyed.into_iter().map(|(pos, _)| pos).zip(values).collect();
        slots.sort_by_key(|(pos, _)| *pos);
        let elts = util::trans_exprs(ctx, slots.into_iter().map(|(_, v)| v).collect())?;
        Ok(ctx.arena.tuple(elts))
    }

    /* ------------------------------ Patterns ------------------------------ */

    fn ana_pat_tuple(&self, ctx: &mut Context, pat: ExprId, idx: &Idx) -> Result<Bindings> {
        let Tuple { elts } = util::tuple(ctx, pat)?;
        let fields = util::fields(ctx, idx, pat)?;
        if elts.len() != fields.len() {
            return ctx.type_err("Incorrect number of elements.", pat);
        }
        let pats: Vec<_> = elts.into_iter().zip(fields.values().cloned()).collect();
        util::ana_subpats(ctx, pats, pat)
    }
    fn trans_pat_tuple(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let Tuple { elts } = util::tuple(ctx, pat)?;
        let mut conditions = Vec::new();
        let mut values = IndexMap::new();
        for (i, elt) in elts.into_iter().enumerate() {
            let item = util::item(ctx, scrutinee, i);
            util::trans_subpat(ctx, elt, item, &mut conditions, &mut values)?;
        }
        Ok((util::conj(ctx, conditions), values))
    }

    fn ana_pat_dict(&self, ctx: &mut Context, pat: ExprId, idx: &Idx) -> Result<Bindings> {
        let Dict { keys, values } = util::dict(ctx, pat)?;
        let fields = util::fields(ctx, idx, pat)?;
        for key in &keys {
            match label_of(ctx, *key) {
                | Some(label) if fields.contains_key(&label) => {}
                | _ => return ctx.type_err("Field not found.", *key),
            }
        }
        let keyed = keyed(ctx, idx, &keys, pat, "Missing fields.", "Too many fields.")?;
        let pats: Vec<_> = values.into_iter().zip(keyed.into_iter().map(|(_, ty)| ty)).collect();
        util::ana_subpats(ctx, pats, pat)
    }
    fn trans_pat_dict(
        &self, ctx: &mut Context, pat: ExprId, idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let Dict { keys, values } = util::dict(ctx, pat)?;
        let keyed = keyed(ctx, idx, &keys, pat, "Missing fields.", "Too many fields.")?;
        let mut conditions = Vec::new();
        let mut bound = IndexMap::new();
        for (value, (pos, _)) in values.into_iter().zip(keyed) {
            let item = util::item(ctx, scrutinee, pos);
            util::trans_subpat(ctx, value, item, &mut conditions, &mut bound)?;
        }
        Ok((util::conj(ctx, conditions), bound))
    }

    /// `{a, b}` binds the fields `a` and `b` to variables of the same name.
    fn ana_pat_set(&self, ctx: &mut Context, pat: ExprId, idx: &Idx) -> Result<Bindings> {
        let Set { elts } = util::set(ctx, pat)?;
        let mut bindings = Bindings::new();
        for elt in elts {
            let Some(id) = ctx.arena.name_of(&elt).map(str::to_string) else {
                return ctx.type_err("Invalid record field.", elt);
            };
            let label = Label::Name(id.clone());
            let Some(ty) = util::fields(ctx, idx, pat)?.get(&label).cloned() else {
                return ctx.type_err(format!("Invalid field name: {}", id), elt);
            };
            let mut one = Bindings::new();
            one.insert(id, ty);
            ctx.merge_bindings(&mut bindings, one, pat)?;
        }
        Ok(bindings)
    }
    fn trans_pat_set(
        &self, ctx: &mut Context, pat: ExprId, idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let Set { elts } = util::set(ctx, pat)?;
        let mut values = IndexMap::new();
        for elt in elts {
            let id = util::name(ctx, elt)?;
            let (pos, _) = position(ctx, idx, &Label::Name(id.clone()), elt)?;
            let item = util::item(ctx, scrutinee, pos);
            values.insert(id, item);
        }
        Ok((ctx.arena.bool_lit(true), values))
    }

    /* ---------------------------- Projections ----------------------------- */

    fn syn_attribute(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<TyExpr> {
        let Attribute { attr, .. } = util::attribute(ctx, e)?;
        match util::fields(ctx, idx, e)?.get(&Label::Name(attr.clone())) {
            | Some(ty) => Ok(ty.clone()),
            | None => ctx.type_err(format!("Invalid field label: {}", attr), e),
        }
    }
    fn trans_attribute(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<ExprId> {
        let Attribute { value, attr } = util::attribute(ctx, e)?;
        let (pos, _) = position(ctx, idx, &Label::Name(attr), e)?;
        let value = ctx.trans(value)?;
        Ok(util::item(ctx, value, pos))
    }

    /// `t[0]` and `t['a']`
    fn syn_subscript(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<TyExpr> {
        let Subscript { slice, .. } = util::subscript(ctx, e)?;
        let Slice::Index(key) = slice else {
            return ctx.type_err("Invalid subscript.", e);
        };
        let label = match &ctx.arena.exprs[&key] {
            | Expr::Num(Num::Int(_)) | Expr::Str(_) => label_of(ctx, key),
            | _ => None,
        };
        let Some(label) = label else {
            return ctx.type_err("Invalid subscript.", e);
        };
        match util::fields(ctx, idx, e)?.get(&label) {
            | Some(ty) => Ok(ty.clone()),
            | None => ctx.type_err("Invalid field position.", e),
        }
    }
    fn trans_subscript(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<ExprId> {
        let Subscript { value, slice } = util::subscript(ctx, e)?;
        let Some(label) = (match slice {
            | Slice::Index(key) => label_of(ctx, key),
            | _ => None,
        }) else {
            return ctx.internal_err("Subscript was not checked.", e);
        };
        let (pos, _) = position(ctx, idx, &label, e)?;
        let value = ctx.trans(value)?;
        Ok(util::item(ctx, value, pos))
    }
}
