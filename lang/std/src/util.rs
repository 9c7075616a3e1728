//! Helpers shared by the standard fragments.

use indexmap::IndexMap;
use typy_statics::{classify::fstring_parts, syntax::*, *};

/* ------------------------------- Destructors ------------------------------ */

macro_rules! expr_destructors {
    ($($fn:ident => $variant:ident, $what:literal;)*) => {
        $(
            #[track_caller]
            pub(crate) fn $fn(ctx: &Context, e: ExprId) -> Result<$variant> {
                match &ctx.arena.exprs[&e] {
                    | Expr::$variant(node) => Ok(node.clone()),
                    | _ => ctx.internal_err(concat!("Expected ", $what, "."), e),
                }
            }
        )*
    };
}

expr_destructors! {
    bin_op => BinOp, "a binary operation";
    unary_op => UnaryOp, "a unary operation";
    compare => Compare, "a comparison";
    bool_op => BoolOp, "a boolean operation";
    call => Call, "a call";
    attribute => Attribute, "an attribute";
    subscript => Subscript, "a subscript";
    if_exp => IfExp, "a conditional expression";
    lambda => Lambda, "a lambda";
    tuple => Tuple, "a tuple";
    list => List, "a list";
    set => Set, "a set";
    dict => Dict, "a dict";
    list_comp => ListComp, "a list comprehension";
    dict_comp => DictComp, "a dict comprehension";
    generator_exp => GeneratorExp, "a generator expression";
}

#[track_caller]
pub(crate) fn num_lit(ctx: &Context, e: ExprId) -> Result<Num> {
    match &ctx.arena.exprs[&e] {
        | Expr::Num(n) => Ok(*n),
        | _ => ctx.internal_err("Expected a number.", e),
    }
}

#[track_caller]
pub(crate) fn str_lit(ctx: &Context, e: ExprId) -> Result<String> {
    match &ctx.arena.exprs[&e] {
        | Expr::Str(Str(s)) => Ok(s.clone()),
        | _ => ctx.internal_err("Expected a string.", e),
    }
}

#[track_caller]
pub(crate) fn name_constant(ctx: &Context, e: ExprId) -> Result<NameConstant> {
    match &ctx.arena.exprs[&e] {
        | Expr::NameConstant(c) => Ok(*c),
        | _ => ctx.internal_err("Expected a name constant.", e),
    }
}

#[track_caller]
pub(crate) fn name(ctx: &Context, e: ExprId) -> Result<String> {
    match ctx.arena.name_of(&e) {
        | Some(id) => Ok(id.to_string()),
        | None => ctx.internal_err("Expected a name.", e),
    }
}

#[track_caller]
pub(crate) fn if_stmt(ctx: &Context, s: StmtId) -> Result<If> {
    match &ctx.arena.stmts[&s] {
        | Stmt::If(node) => Ok(node.clone()),
        | _ => ctx.internal_err("Expected an if statement.", s),
    }
}

#[track_caller]
pub(crate) fn function_def(ctx: &Context, s: StmtId) -> Result<FunctionDef> {
    match &ctx.arena.stmts[&s] {
        | Stmt::FunctionDef(node) => Ok(node.clone()),
        | _ => ctx.internal_err("Expected a function definition.", s),
    }
}

/// The body without its docstring; a lone string stays, it is the value.
pub(crate) fn proper_body(ctx: &Context, s: StmtId, body: BlockId) -> Result<Vec<StmtId>> {
    let stmts = ctx.arena.stmts_of(&body);
    let docstring = match stmts.first() {
        | Some(first) => match &ctx.arena.stmts[first] {
            | Stmt::Expr(e) => matches!(ctx.arena.exprs[e], Expr::Str(_)),
            | _ => false,
        },
        | None => false,
    };
    let proper = if docstring && stmts.len() > 1 { &stmts[1..] } else { stmts };
    if proper.is_empty() {
        return ctx.type_err(
            "Must be at least one statement, other than the docstring, in the body.",
            s,
        );
    }
    Ok(proper.to_vec())
}

/* --------------------------------- Indices -------------------------------- */

/// `F` and `F[()]` are the only forms of a fragment without an index.
pub(crate) fn trivial_idx(
    ctx: &Context, name: &str, idx: Option<&Slice>, site: ExprId,
) -> Result<Idx> {
    let empty = match idx {
        | None => true,
        | Some(Slice::Index(e)) => {
            matches!(&ctx.arena.exprs[e], Expr::Tuple(Tuple { elts }) if elts.is_empty())
        }
        | Some(_) => false,
    };
    if empty {
        Ok(Idx::Triv)
    } else {
        ctx.formation_err(format!("{} type can only have trivial index.", name), site)
    }
}

/// The dimensions of an index: `F[a, b : c]` has two.
pub(crate) fn dims(arena: &HostArena, slice: &Slice) -> Vec<Slice> {
    match slice {
        | Slice::Index(e) => match &arena.exprs[e] {
            | Expr::Tuple(Tuple { elts }) => elts.iter().map(|e| Slice::Index(*e)).collect(),
            | _ => vec![slice.clone()],
        },
        | Slice::Range(_) => vec![slice.clone()],
        | Slice::Ext(dims) => dims.clone(),
    }
}

#[track_caller]
pub(crate) fn fields<'a>(
    ctx: &Context, idx: &'a Idx, site: impl Into<Tree>,
) -> Result<&'a IndexMap<Label, TyExpr>> {
    match idx {
        | Idx::Fields(fields) => Ok(fields),
        | _ => ctx.internal_err("Expected a field index.", site),
    }
}

#[track_caller]
pub(crate) fn cases<'a>(
    ctx: &Context, idx: &'a Idx, site: impl Into<Tree>,
) -> Result<&'a IndexMap<String, Vec<TyExpr>>> {
    match idx {
        | Idx::Cases(cases) => Ok(cases),
        | _ => ctx.internal_err("Expected a case index.", site),
    }
}

#[track_caller]
pub(crate) fn arrow<'a>(
    ctx: &Context, idx: &'a Idx, site: impl Into<Tree>,
) -> Result<(&'a [TyExpr], &'a TyExpr)> {
    match idx {
        | Idx::Arrow { args, ret } => Ok((args, ret)),
        | _ => ctx.internal_err("Expected an arrow index.", site),
    }
}

/// Field equality ignoring the order fields were written in.
pub(crate) fn fields_eq_unordered(
    ctx: &mut Context, a: &IndexMap<Label, TyExpr>, b: &IndexMap<Label, TyExpr>,
    assumptions: &mut Assumptions,
) -> Result<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (label, t1) in a {
        let Some(t2) = b.get(label) else { return Ok(false) };
        if !ctx.ty_expr_eq_under(t1, t2, &Kind::Type, assumptions)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/* --------------------------------- Checking ------------------------------- */

/// Analyzes `e` at `primary`, falling back to `fallback`; true if it fell
/// back.
pub(crate) fn ana_either(
    ctx: &mut Context, e: ExprId, primary: &TyExpr, fallback: &TyExpr,
) -> Result<bool> {
    if ctx.try_ana(e, primary)? {
        return Ok(false);
    }
    ctx.ana(e, fallback)?;
    Ok(true)
}

/// Analyzes `e` at the first of `tys` it checks against; the last one
/// reports the error.
pub(crate) fn ana_first(ctx: &mut Context, e: ExprId, tys: &[TyExpr]) -> Result<usize> {
    let Some((last, init)) = tys.split_last() else {
        return ctx.internal_err("No type to analyze against.", e);
    };
    for (i, ty) in init.iter().enumerate() {
        if ctx.try_ana(e, ty)? {
            return Ok(i);
        }
    }
    ctx.ana(e, last)?;
    Ok(init.len())
}

/// Both operands of a comparison chain.
pub(crate) fn comparison_operands(cmp: &Compare) -> Vec<ExprId> {
    std::iter::once(cmp.left).chain(cmp.comparators.iter().copied()).collect()
}

/* ------------------------------- Translation ------------------------------ */

pub(crate) fn trans_bin_op(ctx: &mut Context, e: ExprId) -> Result<ExprId> {
    let BinOp { left, op, right } = bin_op(ctx, e)?;
    let left = ctx.trans(left)?;
    let right = ctx.trans(right)?;
    Ok(ctx.arena.bin(left, op, right))
}

pub(crate) fn trans_unary_op(ctx: &mut Context, e: ExprId) -> Result<ExprId> {
    let UnaryOp { op, operand } = unary_op(ctx, e)?;
    let operand = ctx.trans(operand)?;
    Ok(ctx.arena.unary(op, operand))
}

pub(crate) fn trans_compare(ctx: &mut Context, e: ExprId) -> Result<ExprId> {
    let Compare { left, ops, comparators } = compare(ctx, e)?;
    let left = ctx.trans(left)?;
    let comparators =
        comparators.into_iter().map(|c| ctx.trans(c)).collect::<Result<Vec<_>>>()?;
    Ok(ctx.arena.expr(Compare { left, ops, comparators }))
}

pub(crate) fn trans_bool_op(ctx: &mut Context, e: ExprId) -> Result<ExprId> {
    let BoolOp { op, values } = bool_op(ctx, e)?;
    let values = values.into_iter().map(|v| ctx.trans(v)).collect::<Result<Vec<_>>>()?;
    Ok(ctx.arena.bool_op(op, values))
}

pub(crate) fn trans_if_exp(ctx: &mut Context, e: ExprId) -> Result<ExprId> {
    let IfExp { test, body, orelse } = if_exp(ctx, e)?;
    let test = ctx.trans(test)?;
    let body = ctx.trans(body)?;
    let orelse = ctx.trans(orelse)?;
    Ok(ctx.arena.if_exp(test, body, orelse))
}

pub(crate) fn trans_exprs(ctx: &mut Context, es: Vec<ExprId>) -> Result<Vec<ExprId>> {
    es.into_iter().map(|e| ctx.trans(e)).collect()
}

pub(crate) fn trans_slice(ctx: &mut Context, slice: &Slice) -> Result<Slice> {
    let part = |ctx: &mut Context, e: &Option<ExprId>| match e {
        | Some(e) => ctx.trans(*e).map(Some),
        | None => Ok(None),
    };
    Ok(match slice {
        | Slice::Index(e) => Slice::Index(ctx.trans(*e)?),
        | Slice::Range(Range { lower, upper, step }) => Slice::Range(Range {
            lower: part(ctx, lower)?,
            upper: part(ctx, upper)?,
            step: part(ctx, step)?,
        }),
        | Slice::Ext(dims) => {
            Slice::Ext(dims.iter().map(|d| trans_slice(ctx, d)).collect::<Result<Vec<_>>>()?)
        }
    })
}

/// Translates an f-string part by part; literal parts are kept.
pub(crate) fn trans_joined_str(ctx: &mut Context, e: ExprId) -> Result<ExprId> {
    let mut values = Vec::new();
    for part in fstring_parts(&ctx.arena, &e) {
        let part = match ctx.arena.exprs[&part].clone() {
            | Expr::Str(_) => part,
            | Expr::FormattedValue(FormattedValue { value, conversion, format_spec }) => {
                let value = ctx.trans(value)?;
                let format_spec = match format_spec {
                    | Some(spec) => Some(ctx.trans(spec)?),
                    | None => None,
                };
                ctx.arena.expr(FormattedValue { value, conversion, format_spec })
            }
            | _ => return ctx.internal_err("Expected an f-string part.", part),
        };
        values.push(part);
    }
    Ok(ctx.arena.joined_str(values))
}

/// `guard1 and guard2 and ...`, dropping trivially true guards.
pub(crate) fn conj(ctx: &mut Context, conditions: Vec<ExprId>) -> ExprId {
    let conditions: Vec<_> = conditions
        .into_iter()
        .filter(|c| !matches!(ctx.arena.exprs[c], Expr::NameConstant(NameConstant::True)))
        .collect();
    let mut iter = conditions.into_iter();
    let Some(first) = iter.next() else {
        return ctx.arena.bool_lit(true);
    };
    iter.fold(first, |acc, c| ctx.arena.and(acc, c))
}

/// `__builtins__.<name>`
pub(crate) fn builtin(ctx: &mut Context, name: &str) -> ExprId {
    let builtins = ctx.add_import("builtins");
    let builtins = ctx.arena.name(&builtins);
    ctx.arena.attr(builtins, name)
}

/// `__builtins__.<name>(args...)`
pub(crate) fn builtin_call(ctx: &mut Context, name: &str, args: Vec<ExprId>) -> ExprId {
    let func = builtin(ctx, name);
    ctx.arena.call(func, args)
}

/// `scrutinee.method(args...)`
pub(crate) fn method_call(
    ctx: &mut Context, scrutinee: ExprId, method: &str, args: Vec<ExprId>,
) -> ExprId {
    let method = ctx.arena.attr(scrutinee, method);
    ctx.arena.call(method, args)
}

/// `isinstance(scrutinee, __builtins__.<class>)`
pub(crate) fn isinstance(ctx: &mut Context, scrutinee: ExprId, class: &str) -> ExprId {
    let class = builtin(ctx, class);
    builtin_call(ctx, "isinstance", vec![scrutinee, class])
}

/// `scrutinee[i]`
pub(crate) fn item(ctx: &mut Context, scrutinee: ExprId, i: usize) -> ExprId {
    let i = ctx.arena.int(i as i64);
    ctx.arena.index(scrutinee, i)
}

/// Translates a subpattern and folds its result into the parent's.
pub(crate) fn trans_subpat(
    ctx: &mut Context, pat: ExprId, scrutinee: ExprId, conditions: &mut Vec<ExprId>,
    values: &mut IndexMap<String, ExprId>,
) -> Result<()> {
    let (guard, vs) = ctx.trans_pat(pat, scrutinee)?;
    conditions.push(guard);
    values.extend(vs);
    Ok(())
}

/// Analyzes subpatterns in order, rejecting a variable bound twice.
pub(crate) fn ana_subpats(
    ctx: &mut Context, pats: impl IntoIterator<Item = (ExprId, TyExpr)>, site: ExprId,
) -> Result<Bindings> {
    let mut bindings = Bindings::new();
    for (pat, ty) in pats {
        let sub = ctx.ana_pat(pat, &ty)?;
        ctx.merge_bindings(&mut bindings, sub, site)?;
    }
    Ok(bindings)
}
