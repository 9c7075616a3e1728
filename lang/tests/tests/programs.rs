use pretty_assertions::assert_eq;
use typy_dynamics::Value;
use typy_statics::syntax::*;
use typy_tests::{accepts, utils::*};

accepts!(
    successor,
    |a| {
        let x = a.name("x");
        let one = a.int(1);
        let sum = a.bin(x, Operator::Add, one);
        let body = a.expr_stmt(sum);
        let succ = fn_def(a, "succ", &[("x", "num")], "num", vec![body]);
        component(a, "arith", vec![succ])
    },
    |c| {
        assert!(matches!(c.call("succ", vec![Value::Int(41)]).unwrap(), Value::Int(42)));
        assert!(c.source(100).contains("def succ(x):"));
    }
);

accepts!(
    peano_naturals_fold_to_integers,
    |a| {
        // nat [type] = variant[Z, S(nat)]
        let variant = a.name("variant");
        let z = a.name("Z");
        let s = a.name("S");
        let nat = a.name("nat");
        let succ = a.call(s, vec![nat]);
        let cases = a.subscript(variant, Slice::Ext(vec![Slice::Index(z), Slice::Index(succ)]));
        let nat_ty = a.type_member("nat", cases);

        let n = a.name("n");
        let pat_z = a.name("Z");
        let zero = a.int(0);
        let s = a.name("S");
        let m = a.name("m");
        let pat_s = a.call(s, vec![m]);
        let m = a.name("m");
        let rec = a.call_name("to_int", vec![m]);
        let one = a.int(1);
        let plus_one = a.bin(rec, Operator::Add, one);
        let body = match_stmts(a, n, vec![(pat_z, zero), (pat_s, plus_one)]);
        let to_int = fn_def(a, "to_int", &[("n", "nat")], "num", body);

        let nat = a.name("nat");
        let z = a.name("Z");
        let one = a.call_name("S", vec![z]);
        let two = a.call_name("S", vec![one]);
        let three = a.call_name("S", vec![two]);
        let three = a.assign_asc("three", nat, three);
        let num = a.name("num");
        let arg = a.name("three");
        let k = a.call_name("to_int", vec![arg]);
        let k = a.assign_asc("k", num, k);
        component(a, "peano", vec![nat_ty, to_int, three, k])
    },
    |c| {
        assert!(c.interface.kinds.contains_key("nat"));
        assert!(matches!(c.member("k"), Some(Value::Int(3))));
        let Some(Value::Tuple(three)) = c.member("three") else { panic!("not a tuple") };
        assert!(matches!(&three[0], Value::Str(tag) if &**tag == "S"));
    }
);

accepts!(
    optional_values_default_when_missing,
    |a| {
        // maybe [type] = variant[Nothing, Just(num)]
        let variant = a.name("variant");
        let nothing = a.name("Nothing");
        let just = a.name("Just");
        let num = a.name("num");
        let just = a.call(just, vec![num]);
        let cases =
            a.subscript(variant, Slice::Ext(vec![Slice::Index(nothing), Slice::Index(just)]));
        let maybe = a.type_member("maybe", cases);

        let m = a.name("m");
        let pat_nothing = a.name("Nothing");
        let zero = a.int(0);
        let just = a.name("Just");
        let n = a.name("n");
        let pat_just = a.call(just, vec![n]);
        let n = a.name("n");
        let body = match_stmts(a, m, vec![(pat_nothing, zero), (pat_just, n)]);
        let get = fn_def(a, "get", &[("m", "maybe")], "num", body);

        let maybe_ty = a.name("maybe");
        let five = a.int(5);
        let some = a.call_name("Just", vec![five]);
        let some = a.assign_asc("some", maybe_ty, some);
        let maybe_ty = a.name("maybe");
        let none = a.name("Nothing");
        let none = a.assign_asc("none", maybe_ty, none);
        let num = a.name("num");
        let arg = a.name("some");
        let got = a.call_name("get", vec![arg]);
        let got = a.assign_asc("got", num, got);
        let num = a.name("num");
        let arg = a.name("none");
        let fallback = a.call_name("get", vec![arg]);
        let fallback = a.assign_asc("fallback", num, fallback);
        component(a, "options", vec![maybe, get, some, none, got, fallback])
    },
    |c| {
        assert!(matches!(c.member("got"), Some(Value::Int(5))));
        assert!(matches!(c.member("fallback"), Some(Value::Int(0))));
    }
);

accepts!(
    record_fields_project_by_label,
    |a| {
        // point [type] = record[x : num, y : num]
        let record = a.name("record");
        let (x, y) = (a.name("x"), a.name("y"));
        let (num1, num2) = (a.name("num"), a.name("num"));
        let fields = Slice::Ext(vec![
            HostArena::range(Some(x), Some(num1), None),
            HostArena::range(Some(y), Some(num2), None),
        ]);
        let point_ty = a.subscript(record, fields);
        let point_ty = a.type_member("point", point_ty);

        let point = a.name("point");
        let (x, y) = (a.name("x"), a.name("y"));
        let (one, two) = (a.int(1), a.int(2));
        let lit = a.dict(vec![(y, two), (x, one)]);
        let p = a.assign_asc("p", point, lit);
        let num = a.name("num");
        let p_ref = a.name("p");
        let p_y = a.attr(p_ref, "y");
        let height = a.assign_asc("height", num, p_y);
        component(a, "geometry", vec![point_ty, p, height])
    },
    |c| {
        assert!(matches!(c.member("height"), Some(Value::Int(2))));
        let Some(Value::Tuple(p)) = c.member("p") else { panic!("not a tuple") };
        assert!(matches!(p.as_slice(), [Value::Int(1), Value::Int(2)]));
    }
);

accepts!(
    strings_concatenate,
    |a| {
        let string = a.name("string");
        let (ab, cd) = (a.str_lit("ab"), a.str_lit("cd"));
        let s = a.bin(ab, Operator::Add, cd);
        let s = a.assign_asc("s", string, s);
        component(a, "text", vec![s])
    },
    |c| {
        let Some(Value::Str(s)) = c.member("s") else { panic!("not a string") };
        assert_eq!(&*s, "abcd");
    }
);

accepts!(
    lambdas_inhabit_arrow_types,
    |a| {
        // double [: fn[num > num]] = lambda y: y * 2
        let head = a.name("fn");
        let (arg, ret) = (a.name("num"), a.name("num"));
        let arrow = a.compare(arg, CmpOp::Gt, ret);
        let fn_ty = a.index(head, arrow);
        let y = a.name("y");
        let two = a.int(2);
        let double = a.bin(y, Operator::Mult, two);
        let lambda = a.lambda(&["y"], double);
        let double = a.assign_asc("double", fn_ty, lambda);
        let num = a.name("num");
        let four = a.int(4);
        let d = a.call_name("double", vec![four]);
        let d = a.assign_asc("d", num, d);
        component(a, "lambdas", vec![double, d])
    },
    |c| {
        assert!(matches!(c.member("d"), Some(Value::Int(8))));
    }
);

#[test]
fn components_chain_through_type_members() {
    let mut build_sys = build_system();

    let mut a = HostArena::new();
    let ieee = a.name("ieee");
    let scalar = a.type_member("scalar", ieee);
    let ieee = a.name("ieee");
    let half = a.float(0.5);
    let half = a.assign_asc("half", ieee, half);
    let def = component(&mut a, "units", vec![scalar, half]);
    build_in(&mut build_sys, a, def);

    let mut b = HostArena::new();
    let units = b.name("units");
    let scalar = b.attr(units, "scalar");
    let units = b.name("units");
    let half = b.attr(units, "half");
    let three = b.int(3);
    let product = b.bin(half, Operator::Mult, three);
    let x = b.assign_asc("x", scalar, product);
    let def = component(&mut b, "scaled", vec![x]);
    let scaled = build_in(&mut build_sys, b, def);

    assert!(scaled.source(100).contains("x = (units.half * 3.0)"), "{}", scaled.source(100));
    let Some(Value::Float(x)) = scaled.member("x") else { panic!("not a float") };
    assert_eq!(x, 1.5);
}
