use typy_statics::syntax::*;
use typy_tests::{rejects, utils::*};

rejects!(
    unannotated_parameters,
    |a| {
        let decorator = a.name("fn");
        let x = a.name("x");
        let body = a.expr_stmt(x);
        let num = a.name("num");
        let f = a.def("f", vec![("x", None)], Some(num), vec![decorator], vec![body]);
        component(a, "c", vec![f])
    },
    "Missing argument type on x"
);

rejects!(
    undefined_names,
    |a| {
        let nowhere = a.name("nowhere");
        let x = a.assign_name("x", nowhere);
        component(a, "c", vec![x])
    },
    "Invalid name: nowhere"
);

rejects!(
    record_literals_missing_a_field,
    |a| {
        let record = a.name("record");
        let (x, y) = (a.name("x"), a.name("y"));
        let (num1, num2) = (a.name("num"), a.name("num"));
        let fields = Slice::Ext(vec![
            HostArena::range(Some(x), Some(num1), None),
            HostArena::range(Some(y), Some(num2), None),
        ]);
        let point = a.subscript(record, fields);
        let x = a.name("x");
        let one = a.int(1);
        let lit = a.dict(vec![(x, one)]);
        let p = a.assign_asc("p", point, lit);
        component(a, "c", vec![p])
    },
    "Labels do not match those in type."
);

rejects!(
    unknown_constructors,
    |a| {
        let variant = a.name("variant");
        let nothing = a.name("Nothing");
        let cases = a.subscript(variant, Slice::Index(nothing));
        let one = a.int(1);
        let some = a.call_name("Some", vec![one]);
        let x = a.assign_asc("x", cases, some);
        component(a, "c", vec![x])
    },
    "Invalid tag: Some"
);

rejects!(
    literals_need_a_type,
    |a| {
        let one = a.int(1);
        let x = a.assign_name("x", one);
        component(a, "c", vec![x])
    },
    "Cannot synthesize a type for a literal form; ascribe a type to it."
);

rejects!(
    components_cannot_refer_to_themselves,
    |a| {
        let this = a.name("c");
        let y = a.attr(this, "y");
        let y = a.assign_name("y", y);
        component(a, "c", vec![y])
    },
    "Invalid name: c"
);
