use crate::syntax::*;
use std::fmt;

fn float_repr(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        typy_syntax::float_repr(x)
    }
}

fn complex_repr(Complex { re, im }: &Complex) -> String {
    let part = |x: f64| {
        let s = float_repr(x);
        s.strip_suffix(".0").map(str::to_string).unwrap_or(s)
    };
    if *re == 0.0 && re.is_sign_positive() {
        format!("{}j", part(*im))
    } else {
        let sign = if *im < 0.0 || (*im == 0.0 && im.is_sign_negative()) { "-" } else { "+" };
        format!("({}{}{}j)", part(*re), sign, part(im.abs()))
    }
}

/// The host `repr` of a value.
pub fn repr(v: &Value) -> String {
    match v {
        | Value::Str(s) => typy_syntax::str_repr(s),
        | other => other.to_string(),
    }
}

fn join(elts: &[Value]) -> String {
    elts.iter().map(repr).collect::<Vec<_>>().join(", ")
}

/// The host `str` of a value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Value::None => write!(f, "None"),
            | Value::Bool(true) => write!(f, "True"),
            | Value::Bool(false) => write!(f, "False"),
            | Value::Int(n) => write!(f, "{}", n),
            | Value::Float(x) => write!(f, "{}", float_repr(*x)),
            | Value::Complex(c) => write!(f, "{}", complex_repr(c)),
            | Value::Str(s) => write!(f, "{}", s),
            | Value::Tuple(elts) if elts.len() == 1 => write!(f, "({},)", repr(&elts[0])),
            | Value::Tuple(elts) => write!(f, "({})", join(elts)),
            | Value::List(elts) => write!(f, "[{}]", join(&elts.borrow())),
            | Value::Dict(entries) => {
                let entries: Vec<_> = entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", repr(k), repr(v)))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            | Value::Func(closure) => write!(f, "<function {}>", closure.name),
            | Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name),
            | Value::Method(method) => write!(
                f,
                "<built-in method {} of {} object>",
                method.name,
                method.receiver.type_name()
            ),
            | Value::Module(module) => write!(f, "<module '{}'>", module.name),
            | Value::Exception(exc) => write!(f, "{}", exc.message),
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Closure({}/{})", self.name, self.params.len())
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
