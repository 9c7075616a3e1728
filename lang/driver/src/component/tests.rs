use crate::{component::err::ComponentError, BuildSystem, Conf, Stage};
use pretty_assertions::assert_eq;
use typy_dynamics::{RuntimeError, Value};
use typy_statics::syntax::*;

fn build_system(stop_after: Stage) -> BuildSystem {
    BuildSystem::with_conf(Conf { stop_after, ..Default::default() })
}

/// `@component def name(): body`
fn component(a: &mut HostArena, name: &str, body: Vec<StmtId>) -> StmtId {
    let decorator = a.name("component");
    a.def(name, vec![], None, vec![decorator], body)
}

/// `@fn def name() [-> returns]: body`
fn thunk(a: &mut HostArena, name: &str, returns: Option<&str>, body: Vec<StmtId>) -> StmtId {
    let decorator = a.name("fn");
    let returns = returns.map(|ty| a.name(ty));
    a.def(name, vec![], returns, vec![decorator], body)
}

fn formation_message(err: crate::BuildError) -> String {
    let crate::BuildError::ComponentError(err) = err else { panic!("not a component error") };
    err.tyck_error().expect("not a checker error").message()
}

/* -------------------------------- Scenarios ------------------------------- */

#[test]
fn unit_members_return_the_empty_tuple() {
    let mut a = HostArena::new();
    let unit = a.name("unit");
    let empty = a.tuple(vec![]);
    let bind = a.assign_asc("x", unit, empty);
    let x = a.name("x");
    let ret = a.expr_stmt(x);
    let f = thunk(&mut a, "f", None, vec![bind, ret]);
    let def = component(&mut a, "c", vec![f]);

    let mut bs = build_system(Stage::Evaluate);
    let id = bs.add(a, def).unwrap();
    let c = bs.components[&id].clone();
    assert_eq!(c.stage, Stage::Evaluate);
    assert!(c.interface.tys.contains_key("f"));
    let out = c.source(100);
    assert!(out.contains("def f():"), "{}", out);
    assert!(out.contains("return x"), "{}", out);
    let Value::Tuple(elts) = c.call("f", vec![]).unwrap() else { panic!("not a tuple") };
    assert!(elts.is_empty());
}

#[test]
fn boolean_matches_evaluate_the_chosen_rule() {
    let mut a = HostArena::new();
    let (boolean1, boolean2) = (a.name("boolean"), a.name("boolean"));
    let tt = a.bool_lit(true);
    let ff = a.bool_lit(false);
    let bind_x = a.assign_asc("x", boolean1, tt);
    let bind_y = a.assign_asc("y", boolean2, ff);
    let x = a.name("x");
    let scrutinizer = a.scrutinize(x);
    let (pat_t, pat_f) = (a.bool_lit(true), a.bool_lit(false));
    let (y1, y2) = (a.name("y"), a.name("y"));
    let (body_t, body_f) = (a.expr_stmt(y1), a.expr_stmt(y2));
    let rule_t = a.rule(pat_t, vec![body_t]);
    let rule_f = a.rule(pat_f, vec![body_f]);
    let f = thunk(&mut a, "f", Some("boolean"), vec![bind_x, bind_y, scrutinizer, rule_t, rule_f]);
    let def = component(&mut a, "c", vec![f]);

    let mut bs = build_system(Stage::Evaluate);
    let id = bs.add(a, def).unwrap();
    let c = bs.components[&id].clone();
    assert!(matches!(c.call("f", vec![]).unwrap(), Value::Bool(false)));
}

#[test]
fn ieee_literals_are_promoted_in_translation() {
    let mut a = HostArena::new();
    let ieee = a.name("ieee");
    let lit = a.int(42);
    let bind = a.assign_asc("x1", ieee, lit);
    let x1 = a.name("x1");
    let two = a.int(2);
    let quotient = a.bin(x1, Operator::Div, two);
    let ret = a.expr_stmt(quotient);
    let f = thunk(&mut a, "f", None, vec![bind, ret]);
    let def = component(&mut a, "c", vec![f]);

    let mut bs = build_system(Stage::Evaluate);
    let id = bs.add(a, def).unwrap();
    let c = bs.components[&id].clone();
    let out = c.source(100);
    assert!(out.contains("x1 = 42.0"), "{}", out);
    assert!(out.contains("return (x1 / 2.0)"), "{}", out);
    let Value::Float(x) = c.call("f", vec![]).unwrap() else { panic!("not a float") };
    assert_eq!(x, 21.0);
}

#[test]
fn cplx_patterns_project_parts() {
    let mut a = HostArena::new();
    let cplx = a.name("cplx");
    let (re, im) = (a.float(1.5), a.float(2.0));
    let pair = a.tuple(vec![re, im]);
    let bind = a.assign_asc("z", cplx, pair);
    let z = a.name("z");
    let scrutinizer = a.scrutinize(z);
    let y = a.name("y");
    let two = a.float(2.0);
    let pat = a.tuple(vec![y, two]);
    let y_ref = a.name("y");
    let body = a.expr_stmt(y_ref);
    let rule = a.rule(pat, vec![body]);
    let f = thunk(&mut a, "f", Some("ieee"), vec![bind, scrutinizer, rule]);
    let def = component(&mut a, "c", vec![f]);

    let mut bs = build_system(Stage::Evaluate);
    let id = bs.add(a, def).unwrap();
    let c = bs.components[&id].clone();
    let out = c.source(100);
    assert!(out.contains(".real"), "{}", out);
    assert!(out.contains(".imag == 2.0"), "{}", out);
    let Value::Float(x) = c.call("f", vec![]).unwrap() else { panic!("not a float") };
    assert_eq!(x, 1.5);
}

#[test]
fn cplx_patterns_reject_duplicate_variables_before_translation() {
    let mut a = HostArena::new();
    let cplx = a.name("cplx");
    let (re, im) = (a.float(1.5), a.float(2.0));
    let pair = a.tuple(vec![re, im]);
    let bind = a.assign_asc("z", cplx, pair);
    let z = a.name("z");
    let scrutinizer = a.scrutinize(z);
    let (y1, y2) = (a.name("y"), a.name("y"));
    let pat = a.tuple(vec![y1, y2]);
    let y_ref = a.name("y");
    let body = a.expr_stmt(y_ref);
    let rule = a.rule(pat, vec![body]);
    let f = thunk(&mut a, "f", Some("ieee"), vec![bind, scrutinizer, rule]);
    let def = component(&mut a, "c", vec![f]);

    let mut bs = build_system(Stage::Evaluate);
    let err = bs.add(a, def).unwrap_err();
    assert_eq!(formation_message(err), "Duplicate variable in pattern: y");
    assert!(bs.get("c").is_none());
}

#[test]
fn shadowed_members_translate_to_fresh_identifiers() {
    let mut a = HostArena::new();
    let boolean = a.name("boolean");
    let tt = a.bool_lit(true);
    let first = a.assign_asc("x", boolean, tt);
    let unit = a.name("unit");
    let empty = a.tuple(vec![]);
    let second = a.assign_asc("x", unit, empty);
    let x = a.name("x");
    let ret = a.expr_stmt(x);
    let f = thunk(&mut a, "f", Some("unit"), vec![first, second, ret]);
    let def = component(&mut a, "c", vec![f]);

    let mut bs = build_system(Stage::Evaluate);
    let id = bs.add(a, def).unwrap();
    let c = bs.components[&id].clone();
    let out = c.source(100);
    assert!(out.contains("x = True"), "{}", out);
    let fresh = out.lines().find_map(|line| line.trim().strip_prefix("return ")).unwrap();
    assert!(fresh.starts_with("__typy_id_x_"), "{}", out);
    assert!(out.contains(&format!("{} = ()", fresh)), "{}", out);
    assert!(matches!(c.call("f", vec![]).unwrap(), Value::Tuple(elts) if elts.is_empty()));
}

#[test]
fn failed_matches_raise_at_runtime() {
    let mut a = HostArena::new();
    let boolean = a.name("boolean");
    let tt = a.bool_lit(true);
    let bind = a.assign_asc("x", boolean, tt);
    let x = a.name("x");
    let scrutinizer = a.scrutinize(x);
    let pat = a.bool_lit(false);
    let ff = a.bool_lit(false);
    let body = a.expr_stmt(ff);
    let rule = a.rule(pat, vec![body]);
    let f = thunk(&mut a, "f", Some("boolean"), vec![bind, scrutinizer, rule]);
    let def = component(&mut a, "c", vec![f]);

    let mut bs = build_system(Stage::Evaluate);
    let id = bs.add(a, def).unwrap();
    let c = bs.components[&id].clone();
    let err = c.call("f", vec![]).unwrap_err();
    let ComponentError::Runtime { error: RuntimeError::Raised { message, .. }, .. } = err else {
        panic!("expected a raised exception")
    };
    assert_eq!(message, "typy match failure");
}

/* ------------------------------- Components ------------------------------- */

#[test]
fn value_members_are_exported_and_evaluated() {
    let mut a = HostArena::new();
    let num = a.name("num");
    let one = a.int(1);
    let x = a.assign_asc("x", num, one);
    let string = a.name("string");
    let s = a.str_lit("hi");
    let greeting = a.assign_asc("greeting", string, s);
    let def = component(&mut a, "c", vec![x, greeting]);

    let mut bs = build_system(Stage::Evaluate);
    let id = bs.add(a, def).unwrap();
    let c = bs.components[&id].clone();
    assert_eq!(c.interface.tys.keys().collect::<Vec<_>>(), vec!["x", "greeting"]);
    assert!(matches!(c.member("x"), Some(Value::Int(1))));
    assert!(matches!(c.member("greeting"), Some(Value::Str(s)) if &*s == "hi"));
    let expected = unindent::unindent(
        "
        import builtins as __builtins__
        x = 1
        greeting = 'hi'",
    );
    assert_eq!(c.source(100), expected);
}

#[test]
fn components_reference_earlier_components() {
    let mut bs = build_system(Stage::Evaluate);

    let mut a = HostArena::new();
    let num = a.name("num");
    let t = a.type_member("t", num);
    let num = a.name("num");
    let one = a.int(1);
    let x = a.assign_asc("x", num, one);
    let def = component(&mut a, "A", vec![t, x]);
    bs.add(a, def).unwrap();
    assert!(bs.get("A").unwrap().interface.kinds.contains_key("t"));

    let mut b = HostArena::new();
    let comp = b.name("A");
    let ty = b.attr(comp, "t");
    let comp = b.name("A");
    let ax = b.attr(comp, "x");
    let one = b.int(1);
    let sum = b.bin(ax, Operator::Add, one);
    let y = b.assign_asc("y", ty, sum);
    let def = component(&mut b, "B", vec![y]);
    let id = bs.add(b, def).unwrap();

    let c = bs.components[&id].clone();
    assert!(c.source(100).contains("y = (A.x + 1)"), "{}", c.source(100));
    assert!(matches!(c.member("y"), Some(Value::Int(2))));
}

#[test]
fn host_values_are_visible_to_components() {
    let mut bs = build_system(Stage::Evaluate);
    bs.bind_host("answer", Value::Int(42));

    let mut a = HostArena::new();
    let answer = a.name("answer");
    let x = a.assign_name("x", answer);
    let def = component(&mut a, "c", vec![x]);
    let id = bs.add(a, def).unwrap();

    let c = bs.components[&id].clone();
    assert!(matches!(c.member("x"), Some(Value::Int(42))));
    assert!(c.member("answer").is_none());
}

#[test]
fn pattern_variables_do_not_capture_host_names() {
    let mut bs = build_system(Stage::Evaluate);
    bs.bind_host("h", Value::Int(42));

    // x [: num] = 1; [x].match; with h: h; y = h
    let mut a = HostArena::new();
    let num = a.name("num");
    let one = a.int(1);
    let x = a.assign_asc("x", num, one);
    let x_ref = a.name("x");
    let scrutinizer = a.scrutinize(x_ref);
    let pat = a.name("h");
    let h = a.name("h");
    let body = a.expr_stmt(h);
    let rule = a.rule(pat, vec![body]);
    let h = a.name("h");
    let y = a.assign_name("y", h);
    let def = component(&mut a, "c", vec![x, scrutinizer, rule, y]);
    let id = bs.add(a, def).unwrap();

    let c = bs.components[&id].clone();
    let out = c.source(100);
    assert!(out.contains("__typy_id_h_1__ = __typy_scrutinee__"), "{}", out);
    assert!(out.contains("y = h"), "{}", out);
    assert!(matches!(c.member("y"), Some(Value::Int(42))));
}

#[test]
fn stages_stop_where_configured() {
    let build = |stage| {
        let mut a = HostArena::new();
        let num = a.name("num");
        let one = a.int(1);
        let x = a.assign_asc("x", num, one);
        let def = component(&mut a, "c", vec![x]);
        let mut bs = build_system(stage);
        let id = bs.add(a, def).unwrap();
        bs.components[&id].clone()
    };
    let parsed = build(Stage::Parse);
    assert!(parsed.interface.tys.is_empty());
    let checked = build(Stage::Check);
    assert!(checked.interface.tys.contains_key("x"));
    assert!(checked.translation.is_empty());
    let translated = build(Stage::Translate);
    assert!(translated.source(100).ends_with("x = 1"));
    assert!(translated.member("x").is_none());
}

/* -------------------------------- Formation ------------------------------- */

#[test]
fn components_cannot_take_arguments() {
    let mut a = HostArena::new();
    let decorator = a.name("component");
    let body = a.pass();
    let def = a.def("c", vec![("x", None)], None, vec![decorator], vec![body]);
    let err = build_system(Stage::Evaluate).add(a, def).unwrap_err();
    assert_eq!(formation_message(err), "Components cannot take arguments.");
}

#[test]
fn components_reject_return_statements() {
    let mut a = HostArena::new();
    let ret = a.ret(None);
    let def = component(&mut a, "c", vec![ret]);
    let err = build_system(Stage::Evaluate).add(a, def).unwrap_err();
    assert_eq!(formation_message(err), "Invalid statement form in component definition.");
}

#[test]
fn components_reject_duplicate_members() {
    let mut a = HostArena::new();
    let (one, two) = (a.int(1), a.int(2));
    let first = a.assign_name("x", one);
    let second = a.assign_name("x", two);
    let def = component(&mut a, "c", vec![first, second]);
    let err = build_system(Stage::Parse).add(a, def).unwrap_err();
    assert_eq!(formation_message(err), "Duplicate component member: x");
}

#[test]
fn type_and_value_members_do_not_clash() {
    let mut a = HostArena::new();
    let num = a.name("num");
    let t = a.type_member("x", num);
    let one = a.int(1);
    let x_ty = a.name("num");
    let x = a.assign_asc("x", x_ty, one);
    let def = component(&mut a, "c", vec![t, x]);
    let mut bs = build_system(Stage::Check);
    let id = bs.add(a, def).unwrap();
    let c = &bs.components[&id];
    assert!(c.interface.kinds.contains_key("x"));
    assert!(c.interface.tys.contains_key("x"));
}

#[test]
fn components_reject_multiple_targets() {
    let mut a = HostArena::new();
    let (x, y) = (a.name("x"), a.name("y"));
    let one = a.int(1);
    let assign = a.stmt(Stmt::Assign(Assign { targets: vec![x, y], value: one }));
    let def = component(&mut a, "c", vec![assign]);
    let err = build_system(Stage::Parse).add(a, def).unwrap_err();
    assert_eq!(formation_message(err), "Too many assignment targets.");
}

#[test]
fn tyck_errors_carry_a_report() {
    let mut a = HostArena::new();
    let num = a.name("num");
    let s = a.str_lit("nope");
    let x = a.assign_asc("x", num, s);
    let def = component(&mut a, "c", vec![x]);
    let err = build_system(Stage::Evaluate).add(a, def).unwrap_err();
    let crate::BuildError::ComponentError(ComponentError::Tyck { name, report, .. }) = err else {
        panic!("expected a checker error")
    };
    assert_eq!(name, "c");
    assert!(!report.is_empty());
}

/* ---------------------------------- Conf ---------------------------------- */

#[test]
fn conf_fields_default_when_missing() {
    let conf = Conf::parse("stop_after = \"check\"").unwrap();
    assert_eq!(conf.stop_after, Stage::Check);
    assert_eq!(conf.width, 100);
    assert!(!conf.log_translation);
}

#[test]
fn conf_rejects_unknown_stages() {
    assert!(matches!(Conf::parse("stop_after = \"link\""), Err(crate::BuildError::ConfError(_))));
}
