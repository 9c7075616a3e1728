use crate::*;
use pretty_assertions::assert_eq;

fn context() -> Context {
    let mut ctx = Context::new(HostArena::new(), prelude());
    ctx.push_default_fragment(function());
    ctx
}

fn render(ctx: &Context, stmts: &[StmtId]) -> String {
    Formatter::new(&ctx.arena).source(stmts)
}

fn render_expr(ctx: &mut Context, e: ExprId) -> String {
    let tr = ctx.trans(e).unwrap();
    let stmt = ctx.deliver(tr, Mechanism::Statement);
    render(ctx, &[stmt])
}

/// The host source of a translated expression.
fn show(ctx: &mut Context, e: ExprId) -> String {
    let stmt = ctx.arena.expr_stmt(e);
    render(ctx, &[stmt])
}

fn message(err: TyckErrorEntry) -> String {
    err.error.message()
}

/// `fn[arg > ret]`
fn fn_ty_expr(ctx: &mut Context, arg: &str, ret: &str) -> ExprId {
    let a = &mut ctx.arena;
    let head = a.name("fn");
    let arg = a.name(arg);
    let ret = a.name(ret);
    let arrow = a.compare(arg, CmpOp::Gt, ret);
    a.index(head, arrow)
}

/* --------------------------------- Prelude -------------------------------- */

#[test]
fn prelude_binds_every_fragment_twice() {
    let env = prelude();
    for fragment in fragments() {
        assert!(matches!(env.get(fragment.name()), Some(StaticValue::Fragment(f)) if *f == fragment));
    }
    let Some(StaticValue::Namespace(std)) = env.get("std") else { panic!("no std namespace") };
    assert!(std.contains("variant"));
    assert!(std.contains("fn"));
}

/* ---------------------------------- ieee ---------------------------------- */

#[test]
fn ieee_coerces_integer_literals() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let ieee_name = a.name("ieee");
    let lit = a.int(42);
    let first = a.assign_asc("x1", ieee_name, lit);
    let x1 = a.name("x1");
    let two = a.int(2);
    let quotient = a.bin(x1, Operator::Div, two);
    let last = a.expr_stmt(quotient);
    let b = a.block(vec![first, last]);

    let ty = ctx.syn_block(b, last).unwrap();
    assert!(ctx.ty_expr_eq(&ty, &ieee_ty(), &Kind::Type).unwrap());
    let stmts = ctx.trans_block(b, Mechanism::Return).unwrap();
    assert_eq!(render(&ctx, &stmts), "x1 = 42.0\nreturn (x1 / 2.0)");
}

#[test]
fn ieee_rejects_imaginary_literals() {
    let mut ctx = context();
    let j = ctx.arena.imag(1.0);
    let err = ctx.ana(j, &ieee_ty()).unwrap_err();
    assert_eq!(message(err), "Invalid literal for ieee type.");
}

/* ---------------------------------- cplx ---------------------------------- */

#[test]
fn cplx_pairs_bind_both_parts() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let re = a.name("re");
    let im = a.name("im");
    let pat = a.tuple(vec![re, im]);
    let bindings = ctx.ana_pat(pat, &cplx_ty()).unwrap();
    assert_eq!(bindings.keys().cloned().collect::<Vec<_>>(), vec!["re", "im"]);
    for ty in bindings.values() {
        assert!(ctx.ty_expr_eq(ty, &ieee_ty(), &Kind::Type).unwrap());
    }

    let a = &mut ctx.arena;
    let y1 = a.name("y");
    let y2 = a.name("y");
    let pat = a.tuple(vec![y1, y2]);
    let err = ctx.ana_pat(pat, &cplx_ty()).unwrap_err();
    assert_eq!(message(err), "Duplicate variable in pattern: y");
}

#[test]
fn cplx_matches_project_real_and_imaginary_parts() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let z = a.name("z");
    let scrutinizer = a.scrutinize(z);
    let re = a.name("re");
    let im = a.name("im");
    let pat = a.tuple(vec![re, im]);
    let re_ref = a.name("re");
    let im_ref = a.name("im");
    let sum = a.bin(re_ref, Operator::Add, im_ref);
    let body = a.expr_stmt(sum);
    let rule = a.rule(pat, vec![body]);
    let b = a.block(vec![scrutinizer, rule]);
    ctx.bind(z, "z", cplx_ty());

    ctx.ana_block(b, &ieee_ty(), scrutinizer).unwrap();
    let stmts = ctx.trans_block(b, Mechanism::Return).unwrap();
    let out = render(&ctx, &stmts);
    assert!(out.contains("re = __typy_scrutinee__.real"), "{}", out);
    assert!(out.contains("im = __typy_scrutinee__.imag"), "{}", out);
    assert!(out.contains("return (re + im)"), "{}", out);
}

#[test]
fn cplx_attributes_are_ieee() {
    let mut ctx = context();
    let z = ctx.arena.name("z");
    let real = ctx.arena.attr(z, "real");
    ctx.bind(z, "z", cplx_ty());
    let ty = ctx.syn(real).unwrap();
    assert!(ctx.ty_expr_eq(&ty, &ieee_ty(), &Kind::Type).unwrap());

    let z = ctx.arena.name("z");
    let bogus = ctx.arena.attr(z, "conj");
    ctx.bind(z, "z", cplx_ty());
    let err = ctx.syn(bogus).unwrap_err();
    assert_eq!(message(err), "Invalid attribute: conj");
}

/* --------------------------------- record --------------------------------- */

#[test]
fn records_are_equal_in_any_field_order() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let head = a.name("record");
    let (x, num_name) = (a.name("x"), a.name("num"));
    let (y, string_name) = (a.name("y"), a.name("string"));
    let slice = Slice::Ext(vec![
        HostArena::range(Some(x), Some(num_name), None),
        HostArena::range(Some(y), Some(string_name), None),
    ]);
    let written = a.subscript(head, slice);
    let written = ctx.as_type(written).unwrap();
    let flipped = record_ty([("y", string_ty()), ("x", num_ty())]);
    assert!(ctx.ty_expr_eq(&written, &flipped, &Kind::Type).unwrap());
    let narrower = record_ty([("x", num_ty())]);
    assert!(!ctx.ty_expr_eq(&written, &narrower, &Kind::Type).unwrap());
}

#[test]
fn record_literals_store_fields_by_label() {
    let mut ctx = context();
    let ty = record_ty([("x", num_ty()), ("y", string_ty())]);
    let a = &mut ctx.arena;
    let (y, hi) = (a.name("y"), a.str_lit("hi"));
    let (x, one) = (a.name("x"), a.int(1));
    let lit = a.dict(vec![(y, hi), (x, one)]);
    ctx.ana(lit, &ty).unwrap();
    assert_eq!(render_expr(&mut ctx, lit), "(1, 'hi')");

    let r = ctx.arena.name("r");
    let field = ctx.arena.attr(r, "y");
    ctx.bind(r, "r", ty.clone());
    let field_ty = ctx.syn(field).unwrap();
    assert!(ctx.ty_expr_eq(&field_ty, &string_ty(), &Kind::Type).unwrap());
    assert_eq!(render_expr(&mut ctx, field), "r[1]");

    let a = &mut ctx.arena;
    let x = a.name("x");
    let one = a.int(1);
    let partial = a.dict(vec![(x, one)]);
    let err = ctx.ana(partial, &ty).unwrap_err();
    assert_eq!(message(err), "Labels do not match those in type.");
}

/* --------------------------------- variant -------------------------------- */

fn option_num() -> TyExpr {
    variant_ty([("Nothing", vec![]), ("Just", vec![num_ty()])])
}

#[test]
fn variant_constructors_translate_to_tagged_tuples() {
    let mut ctx = context();
    let nothing = ctx.arena.name("Nothing");
    ctx.ana(nothing, &option_num()).unwrap();
    assert_eq!(render_expr(&mut ctx, nothing), "('Nothing',)");

    let seven = ctx.arena.int(7);
    let just = ctx.arena.call_name("Just", vec![seven]);
    ctx.ana(just, &option_num()).unwrap();
    assert_eq!(render_expr(&mut ctx, just), "('Just', 7)");
}

#[test]
fn variant_patterns_test_the_tag() {
    let mut ctx = context();
    let x = ctx.arena.name("x");
    let pat = ctx.arena.call_name("Just", vec![x]);
    let bindings = ctx.ana_pat(pat, &option_num()).unwrap();
    assert!(ctx.ty_expr_eq(&bindings["x"], &num_ty(), &Kind::Type).unwrap());

    let pat = ctx.arena.call_name("Just", vec![]);
    let err = ctx.ana_pat(pat, &option_num()).unwrap_err();
    assert_eq!(message(err), "Too few arguments.");

    let pat = ctx.arena.name("Some");
    let err = ctx.ana_pat(pat, &option_num()).unwrap_err();
    assert_eq!(message(err), "Invalid tag: Some");
}

#[test]
fn variant_cases_compare_by_tag() {
    let mut ctx = context();
    let flipped = variant_ty([("Just", vec![num_ty()]), ("Nothing", vec![])]);
    assert!(ctx.ty_expr_eq(&option_num(), &flipped, &Kind::Type).unwrap());
    let other = variant_ty([("Just", vec![string_ty()]), ("Nothing", vec![])]);
    assert!(!ctx.ty_expr_eq(&option_num(), &other, &Kind::Type).unwrap());
}

/* --------------------------------- string --------------------------------- */

#[test]
fn fstrings_format_strings_only() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let hi = a.str_lit("hi ");
    let name = a.name("name");
    let hole = a.formatted(name);
    let greeting = a.joined_str(vec![hi, hole]);
    ctx.bind(name, "name", string_ty());
    ctx.ana(greeting, &string_ty()).unwrap();
    assert_eq!(render_expr(&mut ctx, greeting), "f'hi {name}'");

    let a = &mut ctx.arena;
    let name = a.name("name");
    let quoted = a.expr(FormattedValue { value: name, conversion: Some('r'), format_spec: None });
    let greeting = a.joined_str(vec![quoted]);
    ctx.bind(name, "name", string_ty());
    let err = ctx.ana(greeting, &string_ty()).unwrap_err();
    assert_eq!(message(err), "string types do not support conversions.");
}

#[test]
fn string_affix_patterns_slice_out_the_middle() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let (pre, rest) = (a.str_lit("ab"), a.name("rest"));
    let pat = a.bin(pre, Operator::Add, rest);
    let bindings = ctx.ana_pat(pat, &string_ty()).unwrap();
    assert!(ctx.ty_expr_eq(&bindings["rest"], &string_ty(), &Kind::Type).unwrap());
    let s = ctx.arena.name("s");
    let (guard, values) = ctx.trans_pat(pat, s).unwrap();
    assert_eq!(show(&mut ctx, guard), "s.startswith('ab')");
    assert_eq!(show(&mut ctx, values["rest"]), "s[2:]");

    let a = &mut ctx.arena;
    let (open, close) = (a.str_lit("<"), a.str_lit(">"));
    let body = a.name("body");
    let hole = a.formatted(body);
    let pat = a.joined_str(vec![open, hole, close]);
    ctx.ana_pat(pat, &string_ty()).unwrap();
    let s = ctx.arena.name("s");
    let (guard, values) = ctx.trans_pat(pat, s).unwrap();
    let guard = show(&mut ctx, guard);
    assert!(guard.contains("(s) >= 2)"), "{}", guard);
    assert!(guard.contains("s.startswith('<')"), "{}", guard);
    assert!(guard.contains("s.endswith('>')"), "{}", guard);
    assert_eq!(show(&mut ctx, values["body"]), "s[1:-1]");
}

#[test]
fn string_patterns_need_one_literal_side() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let (x, y) = (a.name("x"), a.name("y"));
    let neither = a.bin(x, Operator::Add, y);
    let (empty, z) = (a.str_lit(""), a.name("z"));
    let empty = a.bin(empty, Operator::Add, z);
    let (lit, w) = (a.str_lit("a"), a.name("w"));
    let times = a.bin(lit, Operator::Mult, w);
    let (p, q) = (a.name("p"), a.name("q"));
    let (p, q) = (a.formatted(p), a.formatted(q));
    let two_holes = a.joined_str(vec![p, q]);
    let r = a.name("r");
    let converted = a.expr(FormattedValue { value: r, conversion: Some('s'), format_spec: None });
    let converted = a.joined_str(vec![converted]);

    let cases = [
        (neither, "One side of + pattern must be a literal."),
        (empty, "Literal pattern in + pattern must be non-empty."),
        (times, "Invalid pattern operator on strings."),
        (two_holes, "Can only have one formatted value in format string pattern."),
        (converted, "Cannot use conversions in format string pattern."),
    ];
    for (pat, expected) in cases {
        let err = ctx.ana_pat(pat, &string_ty()).unwrap_err();
        assert_eq!(message(err), expected);
    }
}

/* ----------------------------------- tpl ---------------------------------- */

#[test]
fn tpl_fields_are_reachable_by_label_and_position() {
    let mut ctx = context();
    let ty = tpl_ty([(Label::Name("a".into()), num_ty()), (Label::Pos(1), string_ty())]);
    let t = ctx.arena.name("t");
    let by_name = ctx.arena.attr(t, "a");
    ctx.bind(t, "t", ty.clone());
    let found = ctx.syn(by_name).unwrap();
    assert!(ctx.ty_expr_eq(&found, &num_ty(), &Kind::Type).unwrap());
    assert_eq!(render_expr(&mut ctx, by_name), "t[0]");

    let t = ctx.arena.name("t");
    let one = ctx.arena.int(1);
    let by_pos = ctx.arena.index(t, one);
    ctx.bind(t, "t", ty.clone());
    let found = ctx.syn(by_pos).unwrap();
    assert!(ctx.ty_expr_eq(&found, &string_ty(), &Kind::Type).unwrap());

    let one = ctx.arena.int(1);
    let short = ctx.arena.tuple(vec![one]);
    let err = ctx.ana(short, &ty).unwrap_err();
    assert_eq!(message(err), "Incorrect number of elements.");
}

/* ----------------------------------- fn ----------------------------------- */

#[test]
fn defs_translate_to_host_functions() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let decorator = a.name("fn");
    let num_name = a.name("num");
    let returns = a.name("num");
    let x = a.name("x");
    let one = a.int(1);
    let succ = a.bin(x, Operator::Add, one);
    let body = a.expr_stmt(succ);
    let def = a.def("succ", vec![("x", Some(num_name))], Some(returns), vec![decorator], vec![body]);
    let two = a.int(2);
    let call = a.call_name("succ", vec![two]);
    let last = a.expr_stmt(call);
    let b = a.block(vec![def, last]);

    let ty = ctx.syn_block(b, last).unwrap();
    assert!(ctx.ty_expr_eq(&ty, &num_ty(), &Kind::Type).unwrap());
    let stmts = ctx.trans_block(b, Mechanism::Return).unwrap();
    let out = render(&ctx, &stmts);
    assert!(out.starts_with("def succ(x):"), "{}", out);
    assert!(out.contains("return (x + 1)"), "{}", out);
    assert!(out.ends_with("return succ(2)"), "{}", out);
}

#[test]
fn calls_check_arity() {
    let mut ctx = context();
    let f = ctx.arena.name("f");
    let (one, two) = (ctx.arena.int(1), ctx.arena.int(2));
    let call = ctx.arena.call(f, vec![one, two]);
    ctx.bind(f, "f", function_ty(vec![num_ty()], num_ty()));
    let err = ctx.syn(call).unwrap_err();
    assert_eq!(message(err), "Too many arguments provided.");
}

#[test]
fn lambdas_are_analyzed_against_arrows() {
    let mut ctx = context();
    let ty = fn_ty_expr(&mut ctx, "num", "num");
    let ty = ctx.as_type(ty).unwrap();
    assert!(ctx.ty_expr_eq(&ty, &function_ty(vec![num_ty()], num_ty()), &Kind::Type).unwrap());

    let a = &mut ctx.arena;
    let y = a.name("y");
    let two = a.int(2);
    let double = a.bin(y, Operator::Mult, two);
    let lambda = a.lambda(&["y"], double);
    ctx.ana(lambda, &ty).unwrap();
    assert_eq!(render_expr(&mut ctx, lambda), "(lambda y: (y * 2))");
}

#[test]
fn undecorated_defs_do_not_synthesize() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let body = a.pass();
    let def = a.def("f", vec![], None, vec![], vec![body]);
    let b = a.block(vec![def]);
    let err = ctx.syn_block(b, def).unwrap_err();
    assert_eq!(message(err), "Cannot synthesize a type for an undecorated definition.");
}

/* ----------------------------------- py ----------------------------------- */

#[test]
fn py_list_patterns_test_class_and_length() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let (x, wild) = (a.name("x"), a.name("_"));
    let pat = a.list(vec![x, wild]);
    let bindings = ctx.ana_pat(pat, &py_ty()).unwrap();
    assert_eq!(bindings.keys().cloned().collect::<Vec<_>>(), vec!["x"]);
    let s = ctx.arena.name("s");
    let (guard, values) = ctx.trans_pat(pat, s).unwrap();
    let guard = show(&mut ctx, guard);
    assert!(guard.contains("isinstance(s, "), "{}", guard);
    assert!(guard.contains(".list)"), "{}", guard);
    assert!(guard.contains("(s) == 2)"), "{}", guard);
    assert_eq!(show(&mut ctx, values["x"]), "s[0]");
}

#[test]
fn py_dict_patterns_require_exactly_their_keys() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let (key_a, key_b) = (a.str_lit("a"), a.name("b"));
    let (x, y) = (a.name("x"), a.name("y"));
    let pat = a.dict(vec![(key_a, x), (key_b, y)]);
    ctx.ana_pat(pat, &py_ty()).unwrap();
    let s = ctx.arena.name("s");
    let (guard, values) = ctx.trans_pat(pat, s).unwrap();
    let guard = show(&mut ctx, guard);
    assert!(guard.contains("('a' in s)"), "{}", guard);
    assert!(guard.contains("('b' in s)"), "{}", guard);
    assert_eq!(show(&mut ctx, values["y"]), "s['b']");

    let a = &mut ctx.arena;
    let (k1, k2) = (a.str_lit("a"), a.name("a"));
    let (x, y) = (a.name("x"), a.name("y"));
    let dup = a.dict(vec![(k1, x), (k2, y)]);
    let err = ctx.ana_pat(dup, &py_ty()).unwrap_err();
    assert_eq!(message(err), "Duplicate key.");

    let a = &mut ctx.arena;
    let (one, x) = (a.int(1), a.name("x"));
    let numeric = a.dict(vec![(one, x)]);
    let err = ctx.ana_pat(numeric, &py_ty()).unwrap_err();
    assert_eq!(message(err), "Invalid key in dict pattern.");
}

#[test]
fn py_string_patterns_check_for_host_strings() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let (rest, suffix) = (a.name("rest"), a.str_lit(".py"));
    let pat = a.bin(rest, Operator::Add, suffix);
    ctx.ana_pat(pat, &py_ty()).unwrap();
    let s = ctx.arena.name("s");
    let (guard, values) = ctx.trans_pat(pat, s).unwrap();
    let guard = show(&mut ctx, guard);
    assert!(guard.contains(".str)"), "{}", guard);
    assert!(guard.contains("s.endswith('.py')"), "{}", guard);
    assert_eq!(show(&mut ctx, values["rest"]), "s[:-3]");
}

#[test]
fn py_comprehensions_scope_their_targets() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let (x, xs, cond) = (a.name("x"), a.name("xs"), a.name("x"));
    let (elt, one) = (a.name("x"), a.int(1));
    let elt = a.bin(elt, Operator::Add, one);
    let comp = a.list_comp(elt, vec![HostArena::comprehension(x, xs, vec![cond])]);
    ctx.bind(xs, "xs", py_ty());
    ctx.ana(comp, &py_ty()).unwrap();
    assert!(ctx.lookup("x").is_none());
    assert_eq!(render_expr(&mut ctx, comp), "[(x + 1) for x in xs if x]");

    let a = &mut ctx.arena;
    let (k, v) = (a.name("k"), a.name("v"));
    let target = a.tuple(vec![k, v]);
    let pairs = a.name("pairs");
    let (key, value) = (a.name("v"), a.name("k"));
    let flipped = a.dict_comp(key, value, vec![HostArena::comprehension(target, pairs, vec![])]);
    ctx.bind(pairs, "pairs", py_ty());
    ctx.ana(flipped, &py_ty()).unwrap();
    assert_eq!(render_expr(&mut ctx, flipped), "{v: k for (k, v) in pairs}");

    let a = &mut ctx.arena;
    let (lit, ys) = (a.int(0), a.name("ys"));
    let elt = a.int(1);
    let bad = a.generator_exp(elt, vec![HostArena::comprehension(lit, ys, vec![])]);
    ctx.bind(ys, "ys", py_ty());
    let err = ctx.ana(bad, &py_ty()).unwrap_err();
    assert_eq!(message(err), "Invalid pattern form in generator.");
}

#[test]
fn py_defs_translate_with_their_other_decorators() {
    let mut ctx = context();
    let a = &mut ctx.arena;
    let (py_name, trace) = (a.name("py"), a.name("trace"));
    let x = a.name("x");
    let one = a.int(1);
    let succ = a.bin(x, Operator::Add, one);
    let body = a.expr_stmt(succ);
    let def = a.def("f", vec![("x", None)], None, vec![py_name, trace], vec![body]);
    let two = a.int(2);
    let call = a.call_name("f", vec![two]);
    let last = a.expr_stmt(call);
    let b = a.block(vec![def, last]);
    ctx.bind(trace, "trace", py_ty());

    let ty = ctx.syn_block(b, last).unwrap();
    assert!(ctx.ty_expr_eq(&ty, &py_ty(), &Kind::Type).unwrap());
    let stmts = ctx.trans_block(b, Mechanism::Return).unwrap();
    let out = render(&ctx, &stmts);
    assert!(out.starts_with("@trace\ndef f(x):"), "{}", out);
    assert!(out.contains("return (x + 1)"), "{}", out);
    assert!(out.ends_with("return f(2)"), "{}", out);
}
