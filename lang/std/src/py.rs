//! Opaque host values.
//!
//! Names bound to host values in the static environment synthesize `py`.
//! Nothing is known about them, so every operation on a `py` value is
//! allowed and yields another `py` value.

use crate::{util, *};
use std::collections::HashSet;
use typy_statics::classify::{fstring_parts, pat_and_ann};

pub struct PyFragment;

static PY: PyFragment = PyFragment;

pub fn py() -> FragmentRef {
    FragmentRef(&PY)
}
pub fn py_ty() -> TyExpr {
    TyExpr::triv(py())
}

fn ana_all(ctx: &mut Context, es: impl IntoIterator<Item = ExprId>) -> Result<()> {
    for e in es {
        ctx.ana(e, &py_ty())?;
    }
    Ok(())
}

fn ana_slice(ctx: &mut Context, slice: &Slice) -> Result<()> {
    match slice {
        | Slice::Index(e) => ctx.ana(*e, &py_ty()),
        | Slice::Range(Range { lower, upper, step }) => {
            ana_all(ctx, [*lower, *upper, *step].into_iter().flatten())
        }
        | Slice::Ext(dims) => dims.iter().try_for_each(|dim| ana_slice(ctx, dim)),
    }
}

/// The target and the value of `x.attr = e` or `x[i] = e`.
fn assign_target(ctx: &Context, s: StmtId) -> Result<(ExprId, ExprId)> {
    let Stmt::Assign(Assign { targets, value }) = &ctx.arena.stmts[&s] else {
        return ctx.internal_err("Expected an assignment.", s);
    };
    let Some(target) = targets.first() else {
        return ctx.internal_err("Assignment without a target.", s);
    };
    match pat_and_ann(&ctx.arena, target) {
        | (target, None) => Ok((target, *value)),
        | (_, Some(ann)) => {
            ctx.type_err("Cannot annotate an attribute or subscript target.", ann)
        }
    }
}

/// The decorators of a def besides the `py` that put it in this fragment.
fn other_decorators(ctx: &Context, decorators: Vec<ExprId>) -> Vec<ExprId> {
    match decorators.split_first() {
        | Some((first, rest))
            if matches!(
                ctx.static_env.eval(&ctx.arena, first),
                Some(StaticValue::Fragment(fragment)) if fragment == py()
            ) =>
        {
            rest.to_vec()
        }
        | _ => decorators,
    }
}

/* ------------------------------ Comprehensions ---------------------------- */

/// Binds every name of a comprehension target.
fn bind_target(ctx: &mut Context, target: ExprId) -> Result<()> {
    match ctx.arena.exprs[&target].clone() {
        | Expr::Name(Name(id)) => {
            ctx.bind(target, &id, py_ty());
            Ok(())
        }
        | Expr::Tuple(Tuple { elts }) | Expr::List(List { elts }) => {
            elts.into_iter().try_for_each(|elt| bind_target(ctx, elt))
        }
        | _ => ctx.type_err("Invalid pattern form in generator.", target),
    }
}

fn trans_target(ctx: &mut Context, target: ExprId) -> Result<ExprId> {
    match ctx.arena.exprs[&target].clone() {
        | Expr::Name(Name(id)) => {
            let uniq = ctx.uniq_of(target, &id).unwrap_or(id);
            Ok(ctx.arena.name(&uniq))
        }
        | Expr::Tuple(Tuple { elts }) => {
            let elts = elts.into_iter().map(|elt| trans_target(ctx, elt)).collect::<Result<_>>()?;
            Ok(ctx.arena.tuple(elts))
        }
        | Expr::List(List { elts }) => {
            let elts = elts.into_iter().map(|elt| trans_target(ctx, elt)).collect::<Result<_>>()?;
            Ok(ctx.arena.list(elts))
        }
        | _ => ctx.internal_err("Expected a comprehension target.", target),
    }
}

/// Checks the generators in a scope of their own, then `body` inside it.
fn ana_generators(
    ctx: &mut Context, generators: &[Comprehension],
    body: impl FnOnce(&mut Context) -> Result<()>,
) -> Result<()> {
    ctx.push_scope();
    let res = (|| {
        for Comprehension { target, iter, ifs } in generators {
            ctx.ana(*iter, &py_ty())?;
            bind_target(ctx, *target)?;
            ana_all(ctx, ifs.iter().copied())?;
        }
        body(ctx)
    })();
    ctx.pop_scope();
    res
}

fn trans_generators(
    ctx: &mut Context, generators: Vec<Comprehension>,
) -> Result<Vec<Comprehension>> {
    let mut out = Vec::new();
    for Comprehension { target, iter, ifs } in generators {
        let iter = ctx.trans(iter)?;
        let target = trans_target(ctx, target)?;
        let ifs = util::trans_exprs(ctx, ifs)?;
        out.push(HostArena::comprehension(target, iter, ifs));
    }
    Ok(out)
}

/* --------------------------------- Patterns ------------------------------- */

/// The keys of `{"a": p, b: q}`, as strings.
fn dict_pat_keys(ctx: &Context, keys: &[ExprId]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for key in keys {
        let label = match &ctx.arena.exprs[key] {
            | Expr::Str(Str(s)) => s.clone(),
            | Expr::Name(Name(id)) => id.clone(),
            | _ => return ctx.type_err("Invalid key in dict pattern.", *key),
        };
        if !seen.insert(label.clone()) {
            return ctx.type_err("Duplicate key.", *key);
        }
        out.push(label);
    }
    Ok(out)
}

impl Fragment for PyFragment {
    fn name(&self) -> &'static str {
        "py"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        util::trivial_idx(ctx, self.name(), idx, site)
    }

    /* ------------------------------ Literals ------------------------------ */

    fn ana_num(&self, _ctx: &mut Context, _e: ExprId, _idx: &Idx) -> Result<()> {
        Ok(())
    }
    fn trans_num(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }
    fn ana_str(&self, _ctx: &mut Context, _e: ExprId, _idx: &Idx) -> Result<()> {
        Ok(())
    }
    fn trans_str(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }
    fn ana_name_constant(&self, _ctx: &mut Context, _e: ExprId, _idx: &Idx) -> Result<()> {
        Ok(())
    }
    fn trans_name_constant(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }

    fn ana_list(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let List { elts } = util::list(ctx, e)?;
        ana_all(ctx, elts)
    }
    fn trans_list(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let List { elts } = util::list(ctx, e)?;
        let elts = util::trans_exprs(ctx, elts)?;
        Ok(ctx.arena.list(elts))
    }
    fn ana_tuple(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let Tuple { elts } = util::tuple(ctx, e)?;
        ana_all(ctx, elts)
    }
    fn trans_tuple(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Tuple { elts } = util::tuple(ctx, e)?;
        let elts = util::trans_exprs(ctx, elts)?;
        Ok(ctx.arena.tuple(elts))
    }
    fn ana_set(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let Set { elts } = util::set(ctx, e)?;
        ana_all(ctx, elts)
    }
    fn trans_set(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Set { elts } = util::set(ctx, e)?;
        let elts = util::trans_exprs(ctx, elts)?;
        Ok(ctx.arena.set(elts))
    }
    fn ana_dict(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let Dict { keys, values } = util::dict(ctx, e)?;
        ana_all(ctx, keys.into_iter().chain(values))
    }
    fn trans_dict(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Dict { keys, values } = util::dict(ctx, e)?;
        let keys = util::trans_exprs(ctx, keys)?;
        let values = util::trans_exprs(ctx, values)?;
        Ok(ctx.arena.dict(keys.into_iter().zip(values).collect()))
    }

    /// Formatted values and their format specifications are host values.
    fn ana_joined_str(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        for part in fstring_parts(&ctx.arena, &e) {
            match ctx.arena.exprs[&part].clone() {
                | Expr::Str(_) => {}
                | Expr::FormattedValue(FormattedValue { value, format_spec, .. }) => {
                    ana_all(ctx, std::iter::once(value).chain(format_spec))?
                }
                | _ => return ctx.internal_err("Expected an f-string part.", part),
            }
        }
        Ok(())
    }
    fn trans_joined_str(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_joined_str(ctx, e)
    }

    fn ana_list_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let ListComp { elt, generators } = util::list_comp(ctx, e)?;
        ana_generators(ctx, &generators, |ctx| ctx.ana(elt, &py_ty()))
    }
    fn trans_list_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let ListComp { elt, generators } = util::list_comp(ctx, e)?;
        let generators = trans_generators(ctx, generators)?;
        let elt = ctx.trans(elt)?;
        Ok(ctx.arena.list_comp(elt, generators))
    }
    fn ana_dict_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let DictComp { key, value, generators } = util::dict_comp(ctx, e)?;
        ana_generators(ctx, &generators, |ctx| ana_all(ctx, [key, value]))
    }
    fn trans_dict_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let DictComp { key, value, generators } = util::dict_comp(ctx, e)?;
        let generators = trans_generators(ctx, generators)?;
        let key = ctx.trans(key)?;
        let value = ctx.trans(value)?;
        Ok(ctx.arena.dict_comp(key, value, generators))
    }
    fn ana_generator_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let GeneratorExp { elt, generators } = util::generator_exp(ctx, e)?;
        ana_generators(ctx, &generators, |ctx| ctx.ana(elt, &py_ty()))
    }
    fn trans_generator_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let GeneratorExp { elt, generators } = util::generator_exp(ctx, e)?;
        let generators = trans_generators(ctx, generators)?;
        let elt = ctx.trans(elt)?;
        Ok(ctx.arena.generator_exp(elt, generators))
    }

    fn ana_lambda(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let Lambda { args, body } = util::lambda(ctx, e)?;
        if !args.is_simple() {
            return ctx.type_err("py lambdas take positional arguments only.", e);
        }
        ctx.push_scope();
        for Arg { arg, .. } in &args.args {
            ctx.bind(e, arg, py_ty());
        }
        let res = ctx.ana(body, &py_ty());
        ctx.pop_scope();
        res
    }
    fn trans_lambda(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Lambda { args, body } = util::lambda(ctx, e)?;
        let params: Vec<String> = args
            .args
            .iter()
            .map(|Arg { arg, .. }| ctx.uniq_of(e, arg).unwrap_or_else(|| arg.clone()))
            .collect();
        let body = ctx.trans(body)?;
        let params: Vec<&str> = params.iter().map(String::as_str).collect();
        Ok(ctx.arena.lambda(&params, body))
    }

    /// `-x` for a host `x`
    fn ana_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        let UnaryOp { operand, .. } = util::unary_op(ctx, e)?;
        ctx.ana(operand, &py_ty())
    }
    fn trans_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_unary_op(ctx, e)
    }

    /* -------------------------------- Defs -------------------------------- */

    fn syn_function_def(&self, ctx: &mut Context, s: StmtId) -> Result<TyExpr> {
        self.ana_function_def(ctx, s, &Idx::Triv)?;
        Ok(py_ty())
    }
    /// `@py def f(x): ...`; everything in it is a host value, and any
    /// further decorators are applied as usual.
    fn ana_function_def(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        let FunctionDef { name, args, body, decorators, returns } = util::function_def(ctx, s)?;
        let decorators = other_decorators(ctx, decorators);
        ana_all(ctx, decorators)?;
        if !args.is_simple() {
            return ctx.type_err("py defs take positional arguments only.", s);
        }
        ana_all(ctx, args.args.iter().filter_map(|arg| arg.annotation))?;
        ana_all(ctx, returns)?;
        let proper = util::proper_body(ctx, s, body)?;
        ctx.push_scope();
        let res = (|| {
            let uniq = ctx.def_uniq(s, &name);
            ctx.bind_as(&name, &uniq, py_ty());
            for Arg { arg, .. } in &args.args {
                ctx.bind(s, arg, py_ty());
            }
            let block = ctx.derived_block(s, &proper);
            ctx.ana_block(block, &py_ty(), s)
        })();
        ctx.pop_scope();
        res
    }
    fn trans_function_def(
        &self, ctx: &mut Context, s: StmtId, _idx: &Idx, _mechanism: Mechanism,
    ) -> Result<Vec<StmtId>> {
        let FunctionDef { name, args, body, decorators, .. } = util::function_def(ctx, s)?;
        let uniq = match ctx.def_id(s) {
            | Some(uniq) => uniq,
            | None => ctx.def_uniq(s, &name),
        };
        let decorators = other_decorators(ctx, decorators);
        let decorators = util::trans_exprs(ctx, decorators)?;
        let mut params = Vec::new();
        for Arg { arg, annotation } in &args.args {
            let uniq = ctx.uniq_of(s, arg).unwrap_or_else(|| arg.clone());
            let annotation = match annotation {
                | Some(annotation) => Some(ctx.trans(*annotation)?),
                | None => None,
            };
            params.push((uniq, annotation));
        }
        let proper = util::proper_body(ctx, s, body)?;
        let block = ctx.derived_block(s, &proper);
        let body = ctx.trans_block(block, Mechanism::Return)?;
        let params = params.iter().map(|(p, ann)| (p.as_str(), *ann)).collect();
        Ok(vec![ctx.arena.def(&uniq, params, None, decorators, body)])
    }
    /// A def nested in a host def binds its name there.
    fn integrate_static_function_def(
        &self, ctx: &mut Context, s: StmtId, ty: &TyExpr,
    ) -> Result<()> {
        let FunctionDef { name, .. } = util::function_def(ctx, s)?;
        let uniq = ctx.def_uniq(s, &name);
        ctx.bind_as(&name, &uniq, ty.clone());
        Ok(())
    }
    fn integrate_trans_function_def(
        &self, ctx: &mut Context, s: StmtId, translation: &mut Vec<StmtId>, mechanism: Mechanism,
    ) -> Result<()> {
        let FunctionDef { name, .. } = util::function_def(ctx, s)?;
        let uniq = ctx.def_uniq(s, &name);
        if mechanism != Mechanism::Statement {
            let value = ctx.arena.name(&uniq);
            translation.push(ctx.deliver(value, mechanism));
        }
        Ok(())
    }

    /* --------------------------- Targeted Forms --------------------------- */

    fn syn_unary_op(&self, _ctx: &mut Context, _e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        Ok(py_ty())
    }

    fn syn_call(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let Call { args, keywords, .. } = util::call(ctx, e)?;
        ana_all(ctx, args.into_iter().chain(keywords.into_iter().map(|kw| kw.value)))?;
        Ok(py_ty())
    }
    fn trans_call(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Call { func, args, keywords } = util::call(ctx, e)?;
        let func = ctx.trans(func)?;
        let args = util::trans_exprs(ctx, args)?;
        let keywords = keywords
            .into_iter()
            .map(|Keyword { arg, value }| Ok(Keyword { arg, value: ctx.trans(value)? }))
            .collect::<Result<Vec<_>>>()?;
        Ok(ctx.arena.expr(Call { func, args, keywords }))
    }

    fn syn_attribute(&self, _ctx: &mut Context, _e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        Ok(py_ty())
    }
    fn trans_attribute(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Attribute { value, attr } = util::attribute(ctx, e)?;
        let value = ctx.trans(value)?;
        Ok(ctx.arena.attr(value, &attr))
    }

    fn syn_subscript(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        let Subscript { slice, .. } = util::subscript(ctx, e)?;
        ana_slice(ctx, &slice)?;
        Ok(py_ty())
    }
    fn trans_subscript(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Subscript { value, slice } = util::subscript(ctx, e)?;
        let value = ctx.trans(value)?;
        let slice = util::trans_slice(ctx, &slice)?;
        Ok(ctx.arena.subscript(value, slice))
    }

    /// Conditionals on host values test their truthiness and otherwise
    /// behave like those on booleans.
    fn syn_if_exp(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<TyExpr> {
        boolean().syn_if_exp(ctx, e, idx)
    }
    fn ana_if_exp(&self, ctx: &mut Context, e: ExprId, idx: &Idx, ty: &TyExpr) -> Result<()> {
        boolean().ana_if_exp(ctx, e, idx, ty)
    }
    fn trans_if_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        util::trans_if_exp(ctx, e)
    }
    fn syn_if(&self, ctx: &mut Context, s: StmtId, idx: &Idx) -> Result<TyExpr> {
        boolean().syn_if(ctx, s, idx)
    }
    fn ana_if(&self, ctx: &mut Context, s: StmtId, idx: &Idx, ty: &TyExpr) -> Result<()> {
        boolean().ana_if(ctx, s, idx, ty)
    }
    fn trans_if(
        &self, ctx: &mut Context, s: StmtId, idx: &Idx, mechanism: Mechanism,
    ) -> Result<Vec<StmtId>> {
        boolean().trans_if(ctx, s, idx, mechanism)
    }

    /* ---------------------------- Binary Forms ---------------------------- */

    fn syn_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let BinOp { left, right, .. } = util::bin_op(ctx, e)?;
        ana_all(ctx, [left, right])?;
        Ok(py_ty())
    }
    fn ana_bin_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        self.syn_bin_op(ctx, e).map(|_| ())
    }
    fn trans_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_bin_op(ctx, e)
    }

    fn syn_compare(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let cmp = util::compare(ctx, e)?;
        ana_all(ctx, util::comparison_operands(&cmp))?;
        Ok(py_ty())
    }
    fn trans_compare(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_compare(ctx, e)
    }

    fn syn_bool_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let BoolOp { values, .. } = util::bool_op(ctx, e)?;
        ana_all(ctx, values)?;
        Ok(py_ty())
    }
    fn ana_bool_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        self.syn_bool_op(ctx, e).map(|_| ())
    }
    fn trans_bool_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        util::trans_bool_op(ctx, e)
    }

    /* ----------------------------- Statements ----------------------------- */

    /// `x.attr = e` and `x[i] = e`
    fn check_assign_target(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        let (target, value) = assign_target(ctx, s)?;
        match ctx.arena.exprs[&target].clone() {
            | Expr::Attribute(_) => {}
            | Expr::Subscript(Subscript { slice, .. }) => ana_slice(ctx, &slice)?,
            | _ => return ctx.internal_err("Expected an attribute or subscript target.", target),
        }
        ctx.ana(value, &py_ty())
    }
    fn trans_assign_target(
        &self, ctx: &mut Context, s: StmtId, _idx: &Idx,
    ) -> Result<Vec<StmtId>> {
        let (target, value) = assign_target(ctx, s)?;
        let target = match ctx.arena.exprs[&target].clone() {
            | Expr::Attribute(Attribute { value, attr }) => {
                let value = ctx.trans(value)?;
                ctx.arena.attr(value, &attr)
            }
            | Expr::Subscript(Subscript { value, slice }) => {
                let value = ctx.trans(value)?;
                let slice = util::trans_slice(ctx, &slice)?;
                ctx.arena.subscript(value, slice)
            }
            | _ => return ctx.internal_err("Expected an attribute or subscript target.", target),
        };
        let value = ctx.trans(value)?;
        Ok(vec![ctx.arena.assign(target, value)])
    }

    /// `x += e`
    fn check_aug_assign(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        let Stmt::AugAssign(AugAssign { value, .. }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected an augmented assignment.", s);
        };
        ctx.ana(value, &py_ty())
    }
    fn trans_aug_assign(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<Vec<StmtId>> {
        let Stmt::AugAssign(AugAssign { target, op, value }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected an augmented assignment.", s);
        };
        let target = ctx.trans(target)?;
        let value = ctx.trans(value)?;
        Ok(vec![ctx.arena.stmt(Stmt::AugAssign(AugAssign { target, op, value }))])
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
    fn ana_pat_str(&self, _ctx: &mut Context, _pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        Ok(Bindings::new())
    }
    fn trans_pat_str(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Ok((ctx.arena.compare(scrutinee, CmpOp::Eq, pat), IndexMap::new()))
    }
    fn ana_pat_name_constant(
        &self, _ctx: &mut Context, _pat: ExprId, _idx: &Idx,
    ) -> Result<Bindings> {
        Ok(Bindings::new())
    }
    fn trans_pat_name_constant(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Ok((ctx.arena.compare(scrutinee, CmpOp::Is, pat), IndexMap::new()))
    }

    /// `(p1, p2)` matches host sequences of length two.
    fn ana_pat_tuple(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        let Tuple { elts } = util::tuple(ctx, pat)?;
        util::ana_subpats(ctx, elts.into_iter().map(|elt| (elt, py_ty())), pat)
    }
    fn trans_pat_tuple(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let Tuple { elts } = util::tuple(ctx, pat)?;
        let len = util::builtin_call(ctx, "len", vec![scrutinee]);
        let n = ctx.arena.int(elts.len() as i64);
        let mut conditions = vec![ctx.arena.compare(len, CmpOp::Eq, n)];
        let mut values = IndexMap::new();
        for (i, elt) in elts.into_iter().enumerate() {
            let item = util::item(ctx, scrutinee, i);
            util::trans_subpat(ctx, elt, item, &mut conditions, &mut values)?;
        }
        Ok((util::conj(ctx, conditions), values))
    }

    /// `[p1, p2]` matches host lists of length two.
    fn ana_pat_list(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        let List { elts } = util::list(ctx, pat)?;
        util::ana_subpats(ctx, elts.into_iter().map(|elt| (elt, py_ty())), pat)
    }
    fn trans_pat_list(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let List { elts } = util::list(ctx, pat)?;
        let is_list = util::isinstance(ctx, scrutinee, "list");
        let len = util::builtin_call(ctx, "len", vec![scrutinee]);
        let n = ctx.arena.int(elts.len() as i64);
        let mut conditions = vec![is_list, ctx.arena.compare(len, CmpOp::Eq, n)];
        let mut values = IndexMap::new();
        for (i, elt) in elts.into_iter().enumerate() {
            let item = util::item(ctx, scrutinee, i);
            util::trans_subpat(ctx, elt, item, &mut conditions, &mut values)?;
        }
        Ok((util::conj(ctx, conditions), values))
    }

    /// `{"a": p, b: q}` matches host dicts with exactly the keys `"a"` and
    /// `"b"`.
    fn ana_pat_dict(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        let Dict { keys, values } = util::dict(ctx, pat)?;
        dict_pat_keys(ctx, &keys)?;
        util::ana_subpats(ctx, values.into_iter().map(|value| (value, py_ty())), pat)
    }
    fn trans_pat_dict(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let Dict { keys, values: pats } = util::dict(ctx, pat)?;
        let labels = dict_pat_keys(ctx, &keys)?;
        let is_dict = util::isinstance(ctx, scrutinee, "dict");
        let len = util::builtin_call(ctx, "len", vec![scrutinee]);
        let n = ctx.arena.int(labels.len() as i64);
        let mut conditions = vec![is_dict, ctx.arena.compare(len, CmpOp::Eq, n)];
        for label in &labels {
            let key = ctx.arena.str_lit(label);
            conditions.push(ctx.arena.compare(key, CmpOp::In, scrutinee));
        }
        let mut values = IndexMap::new();
        for (label, pat) in labels.iter().zip(pats) {
            let key = ctx.arena.str_lit(label);
            let item = ctx.arena.index(scrutinee, key);
            util::trans_subpat(ctx, pat, item, &mut conditions, &mut values)?;
        }
        Ok((util::conj(ctx, conditions), values))
    }

    /// String patterns on host values first test for a host string.
    fn ana_pat_bin_op(&self, ctx: &mut Context, pat: ExprId, idx: &Idx) -> Result<Bindings> {
        string().ana_pat_bin_op(ctx, pat, idx)
    }
    fn trans_pat_bin_op(
        &self, ctx: &mut Context, pat: ExprId, idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let is_str = util::isinstance(ctx, scrutinee, "str");
        let (guard, values) = string().trans_pat_bin_op(ctx, pat, idx, scrutinee)?;
        Ok((util::conj(ctx, vec![is_str, guard]), values))
    }
    fn ana_pat_joined_str(
        &self, ctx: &mut Context, pat: ExprId, idx: &Idx,
    ) -> Result<Bindings> {
        string().ana_pat_joined_str(ctx, pat, idx)
    }
    fn trans_pat_joined_str(
        &self, ctx: &mut Context, pat: ExprId, idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let is_str = util::isinstance(ctx, scrutinee, "str");
        let (guard, values) = string().trans_pat_joined_str(ctx, pat, idx, scrutinee)?;
        Ok((util::conj(ctx, vec![is_str, guard]), values))
    }
}
