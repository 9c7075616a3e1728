//! Records: named fields, equal regardless of the order they are written
//! in. Values are host tuples holding the fields sorted by label.

use crate::{util, *};

pub struct RecordFragment;

static RECORD: RecordFragment = RecordFragment;

pub fn record() -> FragmentRef {
    FragmentRef(&RECORD)
}
pub fn record_ty<'a>(fields: impl IntoIterator<Item = (&'a str, TyExpr)>) -> TyExpr {
    let fields = fields.into_iter().map(|(label, ty)| (Label::Name(label.to_string()), ty));
    TyExpr::canonical(record(), Idx::Fields(fields.collect()))
}

/// The position of a field in a record value.
fn sorted_position(fields: &IndexMap<Label, TyExpr>, label: &Label) -> Option<usize> {
    if !fields.contains_key(label) {
        return None;
    }
    Some(fields.keys().filter(|l| *l < label).count())
}

#[track_caller]
fn field(ctx: &Context, idx: &Idx, id: &str, site: ExprId) -> Result<(usize, TyExpr)> {
    let fields = util::fields(ctx, idx, site)?;
    let label = Label::Name(id.to_string());
    match (sorted_position(fields, &label), fields.get(&label)) {
        | (Some(pos), Some(ty)) => Ok((pos, ty.clone())),
        | _ => ctx.type_err(format!("Invalid label: {}", id), site),
    }
}

/// The identifiers used as keys of a dict literal or pattern; every field
/// must be mentioned exactly once.
fn keys_of(ctx: &Context, idx: &Idx, keys: &[ExprId], site: ExprId) -> Result<Vec<String>> {
    let fields = util::fields(ctx, idx, site)?;
    let mut ids: Vec<String> = Vec::new();
    for key in keys {
        let Some(id) = ctx.arena.name_of(key) else {
            return ctx.type_err("Label is not an identifier.", *key);
        };
        if !fields.contains_key(&Label::Name(id.to_string())) {
            return ctx.type_err(format!("Invalid label: {}", id), *key);
        }
        if ids.iter().any(|seen| seen == id) {
            return ctx.type_err(format!("Duplicate label: {}", id), *key);
        }
        ids.push(id.to_string());
    }
    if ids.len() != fields.len() {
        return ctx.type_err("Labels do not match those in type.", site);
    }
    Ok(ids)
}

impl Fragment for RecordFragment {
    fn name(&self) -> &'static str {
        "record"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        let Some(idx) = idx else {
            return ctx.formation_err("Invalid record specification.", site);
        };
        let mut fields = IndexMap::new();
        for dim in util::dims(&ctx.arena, idx) {
            let Slice::Range(Range { lower: Some(label), upper: Some(ty), step: None }) = dim
            else {
                return ctx.formation_err("Invalid record specification.", site);
            };
            let label = match &ctx.arena.exprs[&label] {
                | Expr::Name(Name(id)) => id.clone(),
                | Expr::Str(Str(s)) if !s.is_empty() => s.clone(),
                | _ => return ctx.formation_err("Invalid field specification.", label),
            };
            let label = Label::Name(label);
            if fields.contains_key(&label) {
                return ctx.formation_err("Duplicate label.", site);
            }
            let ty = ctx.as_type(ty)?;
            fields.insert(label, ty);
        }
        Ok(Idx::Fields(fields))
    }
    fn idx_eq(
        &self, ctx: &mut Context, idx1: &Idx, idx2: &Idx, assumptions: &mut Assumptions,
    ) -> Result<bool> {
        match (idx1, idx2) {
            | (Idx::Fields(a), Idx::Fields(b)) => util::fields_eq_unordered(ctx, a, b, assumptions),
            | _ => Ok(false),
        }
    }

    /* ------------------------------ Literals ------------------------------ */

    /// `{a: 1, b: True}`
    fn ana_dict(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<()> {
        let Dict { keys, values } = util::dict(ctx, e)?;
        let ids = keys_of(ctx, idx, &keys, e)?;
        for (id, value) in ids.iter().zip(values) {
            let (_, ty) = field(ctx, idx, id, e)?;
            ctx.ana(value, &ty)?;
        }
        Ok(())
    }
    fn trans_dict(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<ExprId> {
        let Dict { keys, values } = util::dict(ctx, e)?;
        let ids = keys_of(ctx, idx, &keys, e)?;
        let mut slots = Vec::new();
        for (id, value) in ids.iter().zip(values) {
            let (pos, _) = field(ctx, idx, id, e)?;
            slots.push((pos, value));
        }
        slots.sort_by_key(|(pos, _)| *pos);
        let elts = util::trans_exprs(ctx, slots.into_iter().map(|(_, v)| v).collect())?;
        Ok(ctx.arena.tuple(elts))
    }

    /* ------------------------------ Patterns ------------------------------ */

    fn ana_pat_dict(&self, ctx: &mut Context, pat: ExprId, idx: &Idx) -> Result<Bindings> {
        let Dict { keys, values } = util::dict(ctx, pat)?;
        let ids = keys_of(ctx, idx, &keys, pat)?;
        let mut pats = Vec::new();
        for (id, value) in ids.iter().zip(values) {
            let (_, ty) = field(ctx, idx, id, pat)?;
            pats.push((value, ty));
        }
        util::ana_subpats(ctx, pats, pat)
    }
    fn trans_pat_dict(
        &self, ctx: &mut Context, pat: ExprId, idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let Dict { keys, values } = util::dict(ctx, pat)?;
        let ids = keys_of(ctx, idx, &keys, pat)?;
        let mut conditions = Vec::new();
        let mut bound = IndexMap::new();
        for (id, value) in ids.iter().zip(values) {
            let (pos, _) = field(ctx, idx, id, pat)?;
            let item = util::item(ctx, scrutinee, pos);
            util::trans_subpat(ctx, value, item, &mut conditions, &mut bound)?;
        }
        Ok((util::conj(ctx, conditions), bound))
    }

    /// `{a, b}` binds fields to variables of the same name.
    fn ana_pat_set(&self, ctx: &mut Context, pat: ExprId, idx: &Idx) -> Result<Bindings> {
        let Set { elts } = util::set(ctx, pat)?;
        let mut bindings = Bindings::new();
        for elt in elts {
            let Some(id) = ctx.arena.name_of(&elt).map(str::to_string) else {
                return ctx.type_err("Invalid record field.", elt);
            };
            let (_, ty) = field(ctx, idx, &id, elt)?;
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
            let (pos, _) = field(ctx, idx, &id, elt)?;
            let item = util::item(ctx, scrutinee, pos);
            values.insert(id, item);
        }
        Ok((ctx.arena.bool_lit(true), values))
    }

    /* ---------------------------- Projections ----------------------------- */

    fn syn_attribute(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<TyExpr> {
        let Attribute { attr, .. } = util::attribute(ctx, e)?;
        field(ctx, idx, &attr, e).map(|(_, ty)| ty)
    }
    fn trans_attribute(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<ExprId> {
        let Attribute { value, attr } = util::attribute(ctx, e)?;
        let (pos, _) = field(ctx, idx, &attr, e)?;
        let value = ctx.trans(value)?;
        Ok(util::item(ctx, value, pos))
    }
}
