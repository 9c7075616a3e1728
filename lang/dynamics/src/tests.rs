use crate::{fmt::repr, syntax::*, RuntimeError};
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn run(build: impl FnOnce(&mut HostArena) -> Vec<StmtId>) -> crate::Result<Rc<Module>> {
    let mut arena = HostArena::new();
    let body = build(&mut arena);
    let mut runtime = Runtime::new(Rc::new(arena));
    runtime.run_module("test", &body, Frame::root())
}

fn member(module: &Module, name: &str) -> String {
    repr(&module.members[name])
}

#[test]
fn numeric_promotion() {
    let module = run(|a| {
        let (one, half) = (a.int(1), a.float(2.5));
        let sum = a.bin(one, Operator::Add, half);
        let (seven, neg_two) = (a.int(7), a.int(-2));
        let floor = a.bin(seven, Operator::FloorDiv, neg_two);
        let (i, j) = (a.imag(1.0), a.imag(1.0));
        let sq = a.bin(i, Operator::Mult, j);
        let (six, four) = (a.int(6), a.int(4));
        let div = a.bin(six, Operator::Div, four);
        vec![
            a.assign_name("x", sum),
            a.assign_name("y", floor),
            a.assign_name("z", sq),
            a.assign_name("w", div),
        ]
    })
    .unwrap();
    assert_eq!(member(&module, "x"), "3.5");
    assert_eq!(member(&module, "y"), "-4");
    assert_eq!(member(&module, "z"), "(-1+0j)");
    assert_eq!(member(&module, "w"), "1.5");
}

#[test]
fn nan_from_string() {
    let module = run(|a| {
        let import = a.import("math", None);
        let nan = a.str_lit("NaN");
        let x = a.call_name("float", vec![nan]);
        let isnan = {
            let math = a.name("math");
            a.attr(math, "isnan")
        };
        let arg = a.name("x");
        let check = a.call(isnan, vec![arg]);
        vec![import, a.assign_name("x", x), a.assign_name("r", check)]
    })
    .unwrap();
    assert_eq!(member(&module, "x"), "nan");
    assert_eq!(member(&module, "r"), "True");
}

#[test]
fn raised_exceptions_carry_their_message() {
    let err = run(|a| {
        let msg = a.str_lit("typy match failure");
        let exc = a.call_name("Exception", vec![msg]);
        vec![a.raise(exc)]
    })
    .unwrap_err();
    assert_eq!(err.kind(), "Exception");
    assert_eq!(err.to_string(), "Exception: typy match failure");
}

#[test]
fn recursive_functions() {
    let module = run(|a| {
        let n = a.name("n");
        let one = a.int(1);
        let test = a.compare(n, CmpOp::LtE, one);
        let base = {
            let one = a.int(1);
            a.ret(Some(one))
        };
        let step = {
            let (n, m) = (a.name("n"), a.name("n"));
            let one = a.int(1);
            let pred = a.bin(m, Operator::Sub, one);
            let rec = a.call_name("fact", vec![pred]);
            let prod = a.bin(n, Operator::Mult, rec);
            a.ret(Some(prod))
        };
        let branch = a.if_stmt(test, vec![base], vec![step]);
        let def = a.def("fact", vec![("n", None)], None, vec![], vec![branch]);
        let five = a.int(5);
        let call = a.call_name("fact", vec![five]);
        vec![def, a.assign_name("r", call)]
    })
    .unwrap();
    assert_eq!(member(&module, "r"), "120");
}

#[test]
fn unbounded_recursion_is_reported() {
    let worker = std::thread::Builder::new().stack_size(64 << 20).spawn(|| {
        run(|a| {
            let rec = a.call_name("loop", vec![]);
            let body = a.ret(Some(rec));
            let def = a.def("loop", vec![], None, vec![], vec![body]);
            let call = a.call_name("loop", vec![]);
            vec![def, a.expr_stmt(call)]
        })
        .map(|_| ())
    });
    let err = worker.unwrap().join().unwrap().unwrap_err();
    assert_eq!(err, RuntimeError::Recursion);
}

#[test]
fn closures_capture_their_frame() {
    let module = run(|a| {
        let (x, y) = (a.name("x"), a.name("y"));
        let add = a.bin(x, Operator::Add, y);
        let inner = a.lambda(&["y"], add);
        let ret = a.ret(Some(inner));
        let def = a.def("adder", vec![("x", None)], None, vec![], vec![ret]);
        let ten = a.int(10);
        let add10 = a.call_name("adder", vec![ten]);
        let f = a.name("f");
        let five = a.int(5);
        let call = a.call(f, vec![five]);
        vec![def, a.assign_name("f", add10), a.assign_name("r", call)]
    })
    .unwrap();
    assert_eq!(member(&module, "r"), "15");
}

#[test]
fn slices_and_indexing() {
    let module = run(|a| {
        let hello = a.str_lit("hello");
        let (lo, hi) = (a.int(1), a.int(3));
        let sub = a.subscript(hello, HostArena::range(Some(lo), Some(hi), None));
        let elts = vec![a.int(1), a.int(2), a.int(3)];
        let tpl = a.tuple(elts);
        let last = a.int(-1);
        let picked = a.index(tpl, last);
        vec![a.assign_name("s", sub), a.assign_name("t", picked)]
    })
    .unwrap();
    assert_eq!(member(&module, "s"), "'el'");
    assert_eq!(member(&module, "t"), "3");
}

#[test]
fn handlers_catch_by_kind() {
    let module = run(|a| {
        let (one, zero) = (a.int(1), a.int(0));
        let div = a.bin(one, Operator::Div, zero);
        let body = vec![a.assign_name("r", div)];
        let caught = {
            let msg = a.str_lit("caught");
            vec![a.assign_name("r", msg)]
        };
        let ty = a.name("Exception");
        let (body, handler_body, orelse, finalbody) =
            (a.block(body), a.block(caught), a.block(vec![]), a.block(vec![]));
        let handler = ExceptHandler { ty: Some(ty), name: None, body: handler_body };
        vec![a.stmt(Stmt::Try(Try { body, handlers: vec![handler], orelse, finalbody }))]
    })
    .unwrap();
    assert_eq!(member(&module, "r"), "'caught'");
}

#[test]
fn fstrings_format_their_parts() {
    let module = run(|a| {
        let hello = a.str_lit("hello ");
        let name = a.str_lit("world");
        let name = a.formatted(name);
        let quoted = a.str_lit("q");
        let quoted = a.expr(FormattedValue { value: quoted, conversion: Some('r'), format_spec: None });
        let s = a.joined_str(vec![hello, name, quoted]);
        vec![a.assign_name("s", s)]
    })
    .unwrap();
    assert_eq!(module.members["s"].to_string(), "hello world'q'");
}

#[test]
fn comprehensions_filter_and_bind() {
    let module = run(|a| {
        let xs = vec![a.int(-1), a.int(2), a.int(3)];
        let xs = a.list(xs);
        let (x, x_elt, x_cond, zero) = (a.name("x"), a.name("x"), a.name("x"), a.int(0));
        let positive = a.compare(x_cond, CmpOp::Gt, zero);
        let ten = a.int(10);
        let elt = a.bin(x_elt, Operator::Mult, ten);
        let squares = a.list_comp(elt, vec![HostArena::comprehension(x, xs, vec![positive])]);

        let pairs = {
            let (one, two) = (a.str_lit("a"), a.int(1));
            let first = a.tuple(vec![one, two]);
            let (one, two) = (a.str_lit("b"), a.int(2));
            let second = a.tuple(vec![one, two]);
            a.list(vec![first, second])
        };
        let (k, v) = (a.name("k"), a.name("v"));
        let target = a.tuple(vec![k, v]);
        let (key, value) = (a.name("k"), a.name("v"));
        let table = a.dict_comp(key, value, vec![HostArena::comprehension(target, pairs, vec![])]);

        let word = a.str_lit("ab");
        let (c, c_elt) = (a.name("c"), a.name("c"));
        let chars = a.generator_exp(c_elt, vec![HostArena::comprehension(c, word, vec![])]);
        vec![a.assign_name("xs", squares), a.assign_name("d", table), a.assign_name("cs", chars)]
    })
    .unwrap();
    assert_eq!(member(&module, "xs"), "[20, 30]");
    assert_eq!(member(&module, "d"), "{'a': 1, 'b': 2}");
    assert_eq!(member(&module, "cs"), "['a', 'b']");
    assert!(!module.members.contains_key("x"));
}

#[test]
fn string_methods_and_instance_checks() {
    let module = run(|a| {
        let s = a.str_lit("prefix-body");
        let starts = a.attr(s, "startswith");
        let pre = a.str_lit("prefix");
        let starts = a.call(starts, vec![pre]);
        let s = a.str_lit("prefix-body");
        let ends = a.attr(s, "endswith");
        let suf = a.str_lit("tail");
        let ends = a.call(ends, vec![suf]);

        let flag = a.bool_lit(true);
        let int = a.name("int");
        let is_int = a.call_name("isinstance", vec![flag, int]);
        let elts = vec![a.int(1)];
        let xs = a.list(elts);
        let (str_ty, list_ty) = (a.name("str"), a.name("list"));
        let classes = a.tuple(vec![str_ty, list_ty]);
        let is_seq = a.call_name("isinstance", vec![xs, classes]);
        vec![
            a.assign_name("starts", starts),
            a.assign_name("ends", ends),
            a.assign_name("is_int", is_int),
            a.assign_name("is_seq", is_seq),
        ]
    })
    .unwrap();
    assert_eq!(member(&module, "starts"), "True");
    assert_eq!(member(&module, "ends"), "False");
    assert_eq!(member(&module, "is_int"), "True");
    assert_eq!(member(&module, "is_seq"), "True");
}

#[test]
fn isinstance_rejects_non_classes() {
    let err = run(|a| {
        let (one, two) = (a.int(1), a.int(2));
        let check = a.call_name("isinstance", vec![one, two]);
        vec![a.assign_name("r", check)]
    })
    .unwrap_err();
    assert!(matches!(err, RuntimeError::Type(_)));
    assert_eq!(err.to_string(), "TypeError: isinstance() arg 2 must be a type or tuple of types");
}
