//! Functions.
//!
//! `fn[A, B > R]` is the type of functions from `A` and `B` to `R`. Besides
//! defs, lambdas and calls, `fn` is the default fragment of the bodies it
//! checks, so it gives meaning to assignments, `assert`, `raise` and `pass`
//! there.

use crate::{util, *};
use typy_statics::{
    classify::{classify_pat, pat_and_ann, PatShape},
    tyck::trans::MATCH_FAILURE,
};

pub struct FnFragment;

static FN: FnFragment = FnFragment;

pub fn function() -> FragmentRef {
    FragmentRef(&FN)
}
pub fn function_ty(args: Vec<TyExpr>, ret: TyExpr) -> TyExpr {
    TyExpr::canonical(function(), Idx::Arrow { args, ret })
}

/// Rejects every parameter form but plain positional ones.
fn simple_args(ctx: &Context, args: &Arguments, site: impl Into<Tree> + Copy) -> Result<()> {
    let Arguments { vararg, kwonlyargs, kwarg, defaults, .. } = args;
    if vararg.is_some() {
        return ctx.type_err("fn does not support varargs", site);
    }
    if !kwonlyargs.is_empty() {
        return ctx.type_err("fn does not support kw only args", site);
    }
    if kwarg.is_some() {
        return ctx.type_err("fn does not support kw arg", site);
    }
    if !defaults.is_empty() {
        return ctx.type_err("fn does not support defaults", site);
    }
    Ok(())
}

#[track_caller]
fn var_uniq(ctx: &Context, var_bindings: &VarBindings, name: &str, pat: ExprId) -> Result<String> {
    match var_bindings.get(name) {
        | Some((uniq, _)) => Ok(uniq.clone()),
        | None => ctx.internal_err(format!("Unbound pattern variable: {}", name), pat),
    }
}

/// Binds the function to its own name for recursive calls.
fn bind_self(ctx: &mut Context, s: StmtId, name: &str, ty: TyExpr) {
    let uniq = ctx.def_uniq(s, name);
    ctx.bind_as(name, &uniq, ty);
}

impl Fragment for FnFragment {
    fn name(&self) -> &'static str {
        "fn"
    }
    /// `fn[A > R]`, `fn[() > R]` and `fn[A, B > R]`
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        let Some(Slice::Index(idx)) = idx else {
            return ctx.formation_err("Invalid type index format.", site);
        };
        let (mut args, last) = match &ctx.arena.exprs[idx] {
            | Expr::Tuple(Tuple { elts }) => match elts.split_last() {
                | Some((last, init)) => (init.to_vec(), *last),
                | None => return ctx.formation_err("Invalid type index format.", site),
            },
            | _ => (Vec::new(), *idx),
        };
        let (arg, ret) = match &ctx.arena.exprs[&last] {
            | Expr::Compare(Compare { left, ops, comparators })
                if ops.as_slice() == [CmpOp::Gt] && comparators.len() == 1 =>
            {
                (*left, comparators[0])
            }
            | _ => return ctx.formation_err("Invalid type index format.", site),
        };
        match &ctx.arena.exprs[&arg] {
            | Expr::Tuple(Tuple { elts }) if elts.is_empty() && args.is_empty() => {}
            | _ => args.push(arg),
        }
        let args = args.into_iter().map(|arg| ctx.as_type(arg)).collect::<Result<Vec<_>>>()?;
        let ret = ctx.as_type(ret)?;
        Ok(Idx::Arrow { args, ret })
    }

    /* -------------------------------- Defs -------------------------------- */

    /// `@fn def f(x : A) -> R: ...`; without a return annotation the type of
    /// the body is synthesized and `f` cannot call itself.
    fn syn_function_def(&self, ctx: &mut Context, s: StmtId) -> Result<TyExpr> {
        let FunctionDef { name, args, body, decorators, returns } = util::function_def(ctx, s)?;
        if decorators.len() > 1 {
            return ctx.type_err("fn does not support additional decorators.", s);
        }
        simple_args(ctx, &args, s)?;
        let mut tys = Vec::new();
        for Arg { arg, annotation } in &args.args {
            let Some(annotation) = annotation else {
                return ctx.type_err(format!("Missing argument type on {}", arg), s);
            };
            tys.push(ctx.as_type(*annotation)?);
        }
        let ret = match returns {
            | Some(returns) => Some(ctx.as_type(returns)?),
            | None => None,
        };
        let proper = util::proper_body(ctx, s, body)?;
        ctx.push_scope();
        let res = (|| {
            if let Some(ret) = &ret {
                bind_self(ctx, s, &name, function_ty(tys.clone(), ret.clone()));
            }
            for (Arg { arg, .. }, ty) in args.args.iter().zip(&tys) {
                ctx.bind(s, arg, ty.clone());
            }
            let block = ctx.derived_block(s, &proper);
            match &ret {
                | Some(ret) => ctx.ana_block(block, ret, s).map(|()| ret.clone()),
                | None => ctx.syn_block(block, s),
            }
        })();
        ctx.pop_scope();
        Ok(function_ty(tys, res?))
    }

    /// `@fn[A > R] def f(x): ...`, or an undecorated def in analytic
    /// position. Annotations that are given must agree with the index.
    fn ana_function_def(&self, ctx: &mut Context, s: StmtId, idx: &Idx) -> Result<()> {
        let FunctionDef { name, args, body, decorators, returns } = util::function_def(ctx, s)?;
        let (arg_tys, ret) = util::arrow(ctx, idx, s)?;
        let ty = TyExpr::canonical(function(), idx.clone());
        match decorators.as_slice() {
            | [] => {}
            | [decorator] => {
                let decorator = *decorator;
                if let Some(given) = ctx.attempt(|ctx| ctx.as_type(decorator))? {
                    if !ctx.ty_expr_eq(&given, &ty, &Kind::Type)? {
                        return ctx.type_err("Decorator is inconsistent with expected type.", s);
                    }
                } else {
                    match ctx.static_env.eval(&ctx.arena, &decorator) {
                        | Some(StaticValue::Fragment(fragment)) if fragment == function() => {}
                        | Some(StaticValue::Fragment(_)) => {
                            return ctx.type_err("Decorator is not fn.", decorator);
                        }
                        | _ => {
                            return ctx
                                .type_err("Decorator is neither a type nor a fragment.", decorator);
                        }
                    }
                }
            }
            | _ => return ctx.type_err("fn does not support decorators in analytic position.", s),
        }
        simple_args(ctx, &args, s)?;
        if args.args.len() < arg_tys.len() {
            return ctx.type_err("Too few arguments", s);
        }
        if args.args.len() > arg_tys.len() {
            return ctx.type_err("Too many arguments", s);
        }
        for (Arg { annotation, .. }, expected) in args.args.iter().zip(arg_tys) {
            if let Some(annotation) = annotation {
                let given = ctx.as_type(*annotation)?;
                if !ctx.ty_expr_eq(&given, expected, &Kind::Type)? {
                    return ctx.type_err("Given type annotation is inconsistent with ascription.", *annotation);
                }
            }
        }
        if let Some(returns) = returns {
            let given = ctx.as_type(returns)?;
            if !ctx.ty_expr_eq(&given, ret, &Kind::Type)? {
                return ctx
                    .type_err("Given return type annotation is inconsistent with ascription.", returns);
            }
        }
        let proper = util::proper_body(ctx, s, body)?;
        ctx.push_scope();
        let res = (|| {
            bind_self(ctx, s, &name, ty.clone());
            for (Arg { arg, .. }, ty) in args.args.iter().zip(arg_tys) {
                ctx.bind(s, arg, ty.clone());
            }
            let block = ctx.derived_block(s, &proper);
            ctx.ana_block(block, ret, s)
        })();
        ctx.pop_scope();
        res
    }

    fn trans_function_def(
        &self, ctx: &mut Context, s: StmtId, _idx: &Idx, _mechanism: Mechanism,
    ) -> Result<Vec<StmtId>> {
        let FunctionDef { name, args, body, .. } = util::function_def(ctx, s)?;
        let uniq = match ctx.def_id(s) {
            | Some(uniq) => uniq,
            | None => ctx.def_uniq(s, &name),
        };
        let params: Vec<String> = args
            .args
            .iter()
            .map(|Arg { arg, .. }| ctx.uniq_of(s, arg).unwrap_or_else(|| arg.clone()))
            .collect();
        let proper = util::proper_body(ctx, s, body)?;
        let block = ctx.derived_block(s, &proper);
        let body = ctx.trans_block(block, Mechanism::Return)?;
        let params = params.iter().map(|p| (p.as_str(), None)).collect();
        Ok(vec![ctx.arena.def(&uniq, params, None, Vec::new(), body)])
    }

    /// A nested def binds its name in the enclosing body.
    fn integrate_static_function_def(
        &self, ctx: &mut Context, s: StmtId, ty: &TyExpr,
    ) -> Result<()> {
        let FunctionDef { name, .. } = util::function_def(ctx, s)?;
        bind_self(ctx, s, &name, ty.clone());
        Ok(())
    }
    /// A nested def that is the value of its block delivers the function.
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

    /* ------------------------------- Lambdas ------------------------------ */

    fn ana_lambda(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<()> {
        let Lambda { args, body } = util::lambda(ctx, e)?;
        let (arg_tys, ret) = util::arrow(ctx, idx, e)?;
        simple_args(ctx, &args, e)?;
        if args.args.len() < arg_tys.len() {
            return ctx.type_err("Too few arguments", e);
        }
        if args.args.len() > arg_tys.len() {
            return ctx.type_err("Too many arguments", e);
        }
        ctx.push_scope();
        for (Arg { arg, .. }, ty) in args.args.iter().zip(arg_tys) {
            ctx.bind(e, arg, ty.clone());
        }
        let res = ctx.ana(body, ret);
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

    /* -------------------------------- Calls ------------------------------- */

    fn syn_call(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<TyExpr> {
        let Call { args, keywords, .. } = util::call(ctx, e)?;
        if !keywords.is_empty() {
            return ctx.type_err("fn does not support keyword arguments.", e);
        }
        let (arg_tys, ret) = util::arrow(ctx, idx, e)?;
        if args.len() < arg_tys.len() {
            return ctx.type_err("Too few arguments provided.", e);
        }
        if args.len() > arg_tys.len() {
            return ctx.type_err("Too many arguments provided.", e);
        }
        for (arg, ty) in args.into_iter().zip(arg_tys) {
            ctx.ana(arg, ty)?;
        }
        Ok(ret.clone())
    }
    fn trans_call(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Call { func, args, .. } = util::call(ctx, e)?;
        let func = ctx.trans(func)?;
        let args = util::trans_exprs(ctx, args)?;
        Ok(ctx.arena.call(func, args))
    }

    /* ----------------------------- Statements ----------------------------- */

    /// `pat [: T] = e`
    fn check_assign(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        let Stmt::Assign(Assign { targets, value }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected an assignment.", s);
        };
        let [target] = targets.as_slice() else {
            return ctx.type_err("typy does not support multiple targets.", s);
        };
        let (pat, ann) = pat_and_ann(&ctx.arena, target);
        let ty = match ann {
            | Some(ann) => {
                let ty = ctx.as_type(ann)?;
                ctx.ana(value, &ty)?;
                ty
            }
            | None => ctx.syn(value)?,
        };
        let bindings = ctx.ana_pat(pat, &ty)?;
        ctx.bind_pattern(pat, &bindings);
        Ok(())
    }
    /// Variables become plain assignments; refutable patterns are tested
    /// against a temporary and raise the match failure.
    fn trans_checked_assign(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        let Stmt::Assign(Assign { targets, value }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected an assignment.", s);
        };
        let Some(target) = targets.first() else {
            return ctx.internal_err("Assignment without a target.", s);
        };
        let (pat, _) = pat_and_ann(&ctx.arena, target);
        let value = ctx.trans(value)?;
        let var_bindings = ctx.var_bindings(pat).cloned().unwrap_or_default();
        match classify_pat(&ctx.arena, &pat) {
            | PatShape::Wildcard => Ok(vec![ctx.arena.expr_stmt(value)]),
            | PatShape::Var(x) => {
                let uniq = var_uniq(ctx, &var_bindings, &x, pat)?;
                Ok(vec![ctx.arena.assign_name(&uniq, value)])
            }
            | _ => {
                let tmp = ctx.fresh("__typy_let_scrutinee__");
                let mut tr = vec![ctx.arena.assign_name(&tmp, value)];
                let scrutinee = ctx.arena.name(&tmp);
                let (guard, values) = ctx.trans_pat(pat, scrutinee)?;
                if !matches!(ctx.arena.exprs[&guard], Expr::NameConstant(NameConstant::True)) {
                    let msg = ctx.arena.str_lit(MATCH_FAILURE);
                    let exception = util::builtin_call(ctx, "Exception", vec![msg]);
                    let raise = ctx.arena.raise(exception);
                    let failed = ctx.arena.unary(UnaryOperator::Not, guard);
                    tr.push(ctx.arena.if_stmt(failed, vec![raise], Vec::new()));
                }
                for (name, value) in values {
                    let uniq = var_uniq(ctx, &var_bindings, &name, pat)?;
                    tr.push(ctx.arena.assign_name(&uniq, value));
                }
                Ok(tr)
            }
        }
    }

    fn check_pass(&self, _ctx: &mut Context, _s: StmtId) -> Result<()> {
        Ok(())
    }
    fn trans_checked_pass(&self, ctx: &mut Context, _s: StmtId) -> Result<Vec<StmtId>> {
        Ok(vec![ctx.arena.pass()])
    }

    fn check_assert(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        let Stmt::Assert(Assert { test, msg }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected an assert statement.", s);
        };
        ctx.ana(test, &boolean_ty())?;
        if let Some(msg) = msg {
            ctx.ana(msg, &string_ty())?;
        }
        Ok(())
    }
    fn trans_checked_assert(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        let Stmt::Assert(Assert { test, msg }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected an assert statement.", s);
        };
        let test = ctx.trans(test)?;
        let msg = match msg {
            | Some(msg) => Some(ctx.trans(msg)?),
            | None => None,
        };
        Ok(vec![ctx.arena.stmt(Stmt::Assert(Assert { test, msg }))])
    }

    /// `raise e` for an `e` of any type.
    fn check_raise(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        let Stmt::Raise(Raise { exc, cause }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected a raise statement.", s);
        };
        if cause.is_some() {
            return ctx.type_err("fn does not support exception causes.", s);
        }
        match exc {
            | Some(exc) => ctx.syn(exc).map(|_| ()),
            | None => ctx.type_err("fn does not support re-raising.", s),
        }
    }
    fn trans_checked_raise(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        let Stmt::Raise(Raise { exc: Some(exc), .. }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected a raise statement.", s);
        };
        let exc = ctx.trans(exc)?;
        Ok(vec![ctx.arena.raise(exc)])
    }
}
