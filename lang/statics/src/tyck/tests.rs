use crate::{classify::pat_and_ann, syntax::*, *};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::rc::Rc;

/* ----------------------------- Test Fragments ----------------------------- */

struct Nat;
static NAT: Nat = Nat;

fn nat() -> TyExpr {
    TyExpr::triv(FragmentRef(&NAT))
}

impl Fragment for Nat {
    fn name(&self) -> &'static str {
        "nat"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        match idx {
            | None => Ok(Idx::Triv),
            | Some(_) => ctx.formation_err("nat takes no index.", site),
        }
    }
    fn ana_num(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        match ctx.arena.exprs[&e] {
            | Expr::Num(Num::Int(n)) if n >= 0 => Ok(()),
            | _ => ctx.type_err("Invalid literal for nat.", e),
        }
    }
    fn trans_num(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }
    fn syn_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        let Expr::BinOp(BinOp { left, right, .. }) = ctx.arena.exprs[&e].clone() else {
            return ctx.internal_err("Expected a binary operation.", e);
        };
        ctx.ana(left, &nat())?;
        ctx.ana(right, &nat())?;
        Ok(nat())
    }
    fn trans_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        let Expr::BinOp(BinOp { left, op, right }) = ctx.arena.exprs[&e].clone() else {
            return ctx.internal_err("Expected a binary operation.", e);
        };
        let left = ctx.trans(left)?;
        let right = ctx.trans(right)?;
        Ok(ctx.arena.bin(left, op, right))
    }
    fn ana_pat_num(&self, _ctx: &mut Context, _pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        Ok(Bindings::new())
    }
    fn trans_pat_num(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        Ok((ctx.arena.compare(scrutinee, CmpOp::Eq, pat), IndexMap::new()))
    }
}

/// `stream[T]`, a type with one type argument and nothing else.
struct Stream;
static STREAM: Stream = Stream;

impl Fragment for Stream {
    fn name(&self) -> &'static str {
        "stream"
    }
    fn init_idx(&self, ctx: &mut Context, idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        match idx {
            | Some(Slice::Index(arg)) => {
                let ty = ctx.as_type(*arg)?;
                Ok(Idx::Fields([(Label::Pos(0), ty)].into_iter().collect()))
            }
            | _ => ctx.formation_err("stream takes one type argument.", site),
        }
    }
}

/// Assignments with an optional annotation, and nothing else.
struct Stmts;
static STMTS: Stmts = Stmts;

impl Fragment for Stmts {
    fn name(&self) -> &'static str {
        "stmts"
    }
    fn check_assign(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        let Stmt::Assign(Assign { targets, value }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected an assignment.", s);
        };
        let (pat, ann) = pat_and_ann(&ctx.arena, &targets[0]);
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
    fn trans_checked_assign(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        let Stmt::Assign(Assign { targets, value }) = ctx.arena.stmts[&s].clone() else {
            return ctx.internal_err("Expected an assignment.", s);
        };
        let (pat, _) = pat_and_ann(&ctx.arena, &targets[0]);
        let value = ctx.trans(value)?;
        let Some((_, (uniq, _))) = ctx.var_bindings(pat).and_then(|vars| vars.first()) else {
            return ctx.internal_err("Assignment bound nothing.", s);
        };
        let uniq = uniq.clone();
        Ok(vec![ctx.arena.assign_name(&uniq, value)])
    }
}

/// Fragments that only differ in identity and precedence.
struct Twin;
static TWIN: Twin = Twin;
struct OtherTwin;
static OTHER_TWIN: OtherTwin = OtherTwin;

impl Fragment for Twin {
    fn name(&self) -> &'static str {
        "twin"
    }
    fn precedence(&self) -> Vec<FragmentRef> {
        vec![FragmentRef(&OTHER_TWIN)]
    }
}
impl Fragment for OtherTwin {
    fn name(&self) -> &'static str {
        "twin"
    }
    fn precedence(&self) -> Vec<FragmentRef> {
        vec![FragmentRef(&TWIN)]
    }
}

/// Translates number patterns into a binding it never analyzed.
struct Leaky;
static LEAKY: Leaky = Leaky;

impl Fragment for Leaky {
    fn name(&self) -> &'static str {
        "leaky"
    }
    fn ana_pat_num(&self, _ctx: &mut Context, _pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        Ok(Bindings::new())
    }
    fn trans_pat_num(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, scrutinee: ExprId,
    ) -> Result<PatTrans> {
        let guard = ctx.arena.compare(scrutinee, CmpOp::Eq, pat);
        Ok((guard, [("ghost".to_string(), scrutinee)].into_iter().collect()))
    }
}

fn context() -> Context {
    let env = StaticEnv::new()
        .with("nat", FragmentRef(&NAT))
        .with("stream", FragmentRef(&STREAM));
    let mut ctx = Context::new(HostArena::new(), env);
    ctx.push_default_fragment(FragmentRef(&STMTS));
    ctx
}

fn render(ctx: &Context, stmts: &[StmtId]) -> String {
    Formatter::new(&ctx.arena).source(stmts)
}

/* ---------------------------------- Tests --------------------------------- */

#[test]
fn shadowed_names_get_fresh_ids() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let nat_ty = a.name("nat");
    let one = a.int(1);
    let first = a.assign_asc("x", nat_ty, one);
    let nat_ty = a.name("nat");
    let two = a.int(2);
    let second = a.assign_asc("x", nat_ty, two);
    let x = a.name("x");
    let last = a.expr_stmt(x);
    let b = a.block(vec![first, second, last]);

    let ty = ctx.syn_block(b, last).unwrap();
    assert!(ctx.ty_expr_eq(&ty, &nat(), &Kind::Type).unwrap());
    let stmts = ctx.trans_block(b, Mechanism::Return).unwrap();
    assert_eq!(
        render(&ctx, &stmts),
        "x = 1\n__typy_id_x_1__ = 2\nreturn __typy_id_x_1__"
    );
}

#[test]
fn checking_and_translating_are_idempotent() {
    let mut ctx = context();
    let x = ctx.arena.name("x");
    let one = ctx.arena.int(1);
    let sum = ctx.arena.bin(x, Operator::Add, one);
    ctx.bind(sum, "x", nat());

    let first = ctx.syn(sum).unwrap();
    let second = ctx.syn(sum).unwrap();
    assert_eq!(first, second);
    ctx.ana(sum, &nat()).unwrap();
    let tr = ctx.trans(sum).unwrap();
    assert_eq!(ctx.trans(sum).unwrap(), tr);
    let stmt = ctx.deliver(tr, Mechanism::Statement);
    assert_eq!(render(&ctx, &[stmt]), "(x + 1)");
}

#[test]
fn failed_attempts_leave_no_trace() {
    let mut ctx = context();
    let one = ctx.arena.int(1);
    assert!(ctx.try_syn(one).unwrap().is_none());
    assert!(ctx.annotation(one).is_none());
    assert!(ctx.try_ana(one, &nat()).unwrap());
    assert!(ctx.annotation(one).is_some());
}

#[test]
fn singleton_kinds_are_transparent() {
    let mut ctx = context();
    let nat_ty = ctx.arena.name("nat");
    ctx.bind_ty_member("n", nat_ty).unwrap();
    let n = ctx.arena.name("n");
    let n = ctx.as_type(n).unwrap();
    assert!(ctx.ty_expr_eq(&n, &nat(), &Kind::Type).unwrap());
    let one = ctx.arena.int(1);
    ctx.ana(one, &n).unwrap();
    assert!(matches!(ctx.canonicalize(&n).unwrap(), TyExpr::Canonical(_)));
}

#[test]
fn recursive_types_are_equal_up_to_unfolding() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let stream = a.name("stream");
    let t = a.name("t");
    let stream_t = a.index(stream, t);
    let stream = a.name("stream");
    let u = a.name("u");
    let stream_u = a.index(stream, u);
    let stream = a.name("stream");
    let stream_stream_u = a.index(stream, stream_u);
    let stream = a.name("stream");
    let nat_ty = a.name("nat");
    let stream_nat = a.index(stream, nat_ty);

    ctx.bind_ty_member("t", stream_t).unwrap();
    ctx.bind_ty_member("u", stream_stream_u).unwrap();
    let t = ctx.arena.name("t");
    let t = ctx.as_type(t).unwrap();
    let u = ctx.arena.name("u");
    let u = ctx.as_type(u).unwrap();
    let stream_nat = ctx.as_type(stream_nat).unwrap();
    assert!(ctx.ty_expr_eq(&t, &u, &Kind::Type).unwrap());
    assert!(ctx.ty_expr_eq(&u, &t, &Kind::Type).unwrap());
    assert!(!ctx.ty_expr_eq(&t, &stream_nat, &Kind::Type).unwrap());
}

#[test]
fn recursive_types_must_be_contractive() {
    let mut ctx = context();
    let v = ctx.arena.name("v");
    let err = ctx.bind_ty_member("v", v).unwrap_err();
    assert_eq!(err.error, TyckError::Type("Recursive type is not contractive.".into()));
}

#[test]
fn inconsistent_types_are_reported_canonically() {
    let mut ctx = context();
    let x = ctx.arena.name("x");
    ctx.bind(x, "x", nat());
    let stream = ctx.arena.name("stream");
    let nat_ty = ctx.arena.name("nat");
    let stream_nat = ctx.arena.index(stream, nat_ty);
    let stream_nat = ctx.as_type(stream_nat).unwrap();
    let err = ctx.ana(x, &stream_nat).unwrap_err();
    assert_eq!(
        err.error.message(),
        "Type inconsistency. Expected: stream[nat]. Got: nat."
    );
    assert_eq!(err.site, Some(Tree::Expr(x)));
}

#[test]
fn unknown_names_and_missing_defaults() {
    let mut ctx = context();
    let y = ctx.arena.name("y");
    let err = ctx.syn(y).unwrap_err();
    assert_eq!(err.error, TyckError::Type("Invalid name: y".into()));

    let mut ctx = Context::new(HostArena::new(), StaticEnv::new());
    let pass = ctx.arena.pass();
    let err = ctx.check(pass).unwrap_err();
    assert_eq!(err.error, TyckError::Type("No default fragment.".into()));
}

#[test]
fn matches_translate_to_guarded_cascades() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let x = a.name("x");
    let scrutinizer = a.scrutinize(x);
    let zero = a.int(0);
    let one = a.int(1);
    let body = a.expr_stmt(one);
    let first = a.rule(zero, vec![body]);
    let y = a.name("y");
    let y_ref = a.name("y");
    let one = a.int(1);
    let succ = a.bin(y_ref, Operator::Add, one);
    let body = a.expr_stmt(succ);
    let second = a.rule(y, vec![body]);
    let b = a.block(vec![scrutinizer, first, second]);
    ctx.bind(x, "x", nat());

    ctx.ana_block(b, &nat(), scrutinizer).unwrap();
    let stmts = ctx.trans_block(b, Mechanism::Return).unwrap();
    let out = render(&ctx, &stmts);
    assert!(out.starts_with("__typy_scrutinee__ = x\n"), "{}", out);
    assert!(out.contains("y = __typy_scrutinee__"), "{}", out);
    assert!(out.contains("return (y + 1)"), "{}", out);
    assert!(out.contains("raise __builtins__.Exception('typy match failure')"), "{}", out);
}

#[test]
fn matches_need_a_rule_to_synthesize() {
    let mut ctx = context();
    let x = ctx.arena.name("x");
    let scrutinizer = ctx.arena.scrutinize(x);
    let b = ctx.arena.block(vec![scrutinizer]);
    ctx.bind(x, "x", nat());
    let err = ctx.syn_block(b, scrutinizer).unwrap_err();
    assert_eq!(
        err.error,
        TyckError::Type(
            "Cannot synthesize a type for a match statement expression without any rules.".into()
        )
    );
}

#[test]
fn fragments_sharing_a_name_stay_distinct() {
    let mut ctx = context();
    let twin = TyExpr::triv(FragmentRef(&TWIN));
    let other = TyExpr::triv(FragmentRef(&OTHER_TWIN));
    assert!(FragmentRef(&TWIN) != FragmentRef(&OTHER_TWIN));
    assert!(ctx.ty_expr_eq(&twin, &twin, &Kind::Type).unwrap());
    assert!(!ctx.ty_expr_eq(&twin, &other, &Kind::Type).unwrap());
    let x = ctx.arena.name("x");
    ctx.bind(x, "x", twin);
    assert!(ctx.ana(x, &other).is_err());
}

#[test]
fn fresh_names_avoid_static_names() {
    let mut ctx = context();
    assert_eq!(ctx.fresh("nat"), "__typy_id_nat_1__");
    assert_eq!(ctx.fresh("nat"), "__typy_id_nat_2__");
    assert_eq!(ctx.fresh("__builtins__"), "__typy_id___builtins___1__");
    assert_eq!(ctx.fresh("y"), "y");
}

#[test]
fn binary_operators_need_a_governing_fragment() {
    let mut ctx = context();
    let (x, y) = (ctx.arena.name("x"), ctx.arena.name("y"));
    let sum = ctx.arena.bin(x, Operator::Add, y);
    ctx.bind(x, "x", TyExpr::triv(FragmentRef(&TWIN)));
    ctx.bind(y, "y", TyExpr::triv(FragmentRef(&OTHER_TWIN)));
    let err = ctx.syn(sum).unwrap_err();
    assert_eq!(err.error, TyckError::Type("Circular precedence sets.".into()));

    let mut ctx = context();
    let (x, y) = (ctx.arena.name("x"), ctx.arena.name("y"));
    let sum = ctx.arena.bin(x, Operator::Add, y);
    ctx.bind(x, "x", nat());
    ctx.bind(y, "y", TyExpr::triv(FragmentRef(&TWIN)));
    let err = ctx.syn(sum).unwrap_err();
    assert_eq!(
        err.error.message(),
        "Left and right of operator synthesize types where the fragments are mutually non-precedent: nat and twin."
    );
}

#[test]
fn kinds_must_match_on_analysis() {
    let mut ctx = context();
    let stream = ctx.arena.name("stream");
    let nat_ty = ctx.arena.name("nat");
    let stream_nat = ctx.arena.index(stream, nat_ty);
    let stream_nat = ctx.as_type(stream_nat).unwrap();
    ctx.ana_ty_expr(&nat(), &Kind::Type).unwrap();
    let err = ctx.ana_ty_expr(&nat(), &Kind::Singleton(Rc::new(stream_nat))).unwrap_err();
    assert_eq!(
        err.error,
        TyckError::Kind("Kind mismatch. Expected: 'Singleton(stream[nat])'. Got: 'Singleton(nat)'.".into())
    );
}

#[test]
fn empty_blocks_have_no_value() {
    let mut ctx = context();
    let b = ctx.arena.block(vec![]);
    let site = ctx.arena.pass();
    let err = ctx.syn_block(b, site).unwrap_err();
    assert_eq!(err.error, TyckError::Type("Empty block".into()));
}

#[test]
fn pattern_translations_bind_what_analysis_bound() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let x = a.name("x");
    let scrutinizer = a.scrutinize(x);
    let zero = a.int(0);
    let one = a.int(1);
    let body = a.expr_stmt(one);
    let rule = a.rule(zero, vec![body]);
    let b = a.block(vec![scrutinizer, rule]);
    ctx.bind(x, "x", TyExpr::triv(FragmentRef(&LEAKY)));

    ctx.ana_block(b, &nat(), scrutinizer).unwrap();
    let err = ctx.trans_block(b, Mechanism::Return).unwrap_err();
    assert_eq!(
        err.error,
        TyckError::Usage(
            "leaky translated a pattern binding different variables than it analyzed.".into()
        )
    );
}
