use crate::*;
use pretty_assertions::assert_eq;
use unindent::unindent;

fn expect(actual: String, expected: &str) {
    assert_eq!(actual.trim(), unindent(expected).trim());
}

#[test]
fn literals() {
    let mut arena = HostArena::new();
    let one = arena.int(1);
    let half = arena.float(0.5);
    let two = arena.float(2.0);
    let i = arena.imag(1.0);
    let s = arena.str_lit("it's");
    let single = arena.tuple(vec![one]);
    let unit = arena.tuple(vec![]);
    let all = arena.tuple(vec![half, two, i, s, single, unit]);
    let f = Formatter::new(&arena);
    assert_eq!(all.ugly(&f), r"(0.5, 2.0, 1j, 'it\'s', (1,), ())");
}

#[test]
fn fstrings_and_comprehensions() {
    let mut arena = HostArena::new();
    let hello = arena.str_lit("{hi} ");
    let name = arena.name("name");
    let name = arena.formatted(name);
    let greeting = arena.joined_str(vec![hello, name]);
    let x = arena.name("x");
    let (target, xs) = (arena.name("x"), arena.name("xs"));
    let zero = arena.int(0);
    let cond = arena.compare(x, CmpOp::Gt, zero);
    let x = arena.name("x");
    let r#gen = HostArena::comprehension(target, xs, vec![cond]);
    let evens = arena.list_comp(x, vec![r#gen]);
    let all = arena.tuple(vec![greeting, evens]);
    let f = Formatter::new(&arena);
    assert_eq!(all.ugly(&f), "(f'{{hi}} {name}', [x for x in xs if (x > 0)])");
}

#[test]
fn surface_idioms() {
    let mut arena = HostArena::new();
    let num = arena.name("num");
    let forty_two = arena.int(42);
    let asc = arena.assign_asc("x", num, forty_two);
    let ty = arena.name("boolean");
    let member = arena.type_member("t", ty);
    let x = arena.name("x");
    let scrut = arena.scrutinize(x);
    let pat = arena.int(0);
    let zero = arena.str_lit("zero");
    let body = arena.expr_stmt(zero);
    let rule = arena.rule(pat, vec![body]);
    let f = Formatter::new(&arena);
    expect(
        f.source(&[asc, member, scrut, rule]),
        "
        x[:num] = 42
        t[type] = boolean
        [x].match
        with 0:
            'zero'
        ",
    );
}

#[test]
fn elif_chains() {
    let mut arena = HostArena::new();
    let (x1, x2) = (arena.name("x"), arena.name("x"));
    let (one, two) = (arena.int(1), arena.int(2));
    let t1 = arena.compare(x1, CmpOp::Eq, one);
    let t2 = arena.compare(x2, CmpOp::Eq, two);
    let (a, b) = (arena.str_lit("a"), arena.str_lit("b"));
    let (ra, rb) = (arena.ret(Some(a)), arena.ret(Some(b)));
    let msg = arena.str_lit("no");
    let exc = arena.call_name("Exception", vec![msg]);
    let raise = arena.raise(exc);
    let inner = arena.if_stmt(t2, vec![rb], vec![raise]);
    let outer = arena.if_stmt(t1, vec![ra], vec![inner]);
    let num = arena.name("num");
    let def = arena.def("f", vec![("x", Some(num))], None, vec![], vec![outer]);
    let f = Formatter::new(&arena);
    expect(
        def.ugly(&f),
        "
        def f(x: num):
            if (x == 1):
                return 'a'
            elif (x == 2):
                return 'b'
            else:
                raise Exception('no')
        ",
    );
}

#[test]
fn constructors_are_capitalized() {
    assert!(Name::from("Inf").is_constructor());
    assert!(!Name::from("x").is_constructor());
    assert!(!Name::from("_").is_constructor());
}
