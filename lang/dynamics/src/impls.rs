use crate::{err::*, syntax::*};
use std::{cell::RefCell, rc::Rc};

/* ------------------------------- Conversions ------------------------------ */

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}
impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}
impl From<Complex> for Value {
    fn from(c: Complex) -> Self {
        Value::Complex(c)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s.as_str()))
    }
}
impl From<Vec<Value>> for Value {
    fn from(elts: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(elts))
    }
}

impl Value {
    pub fn list(elts: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(elts)))
    }
    pub fn dict(entries: Vec<(Value, Value)>) -> Self {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }
    pub fn type_name(&self) -> &'static str {
        match self {
            | Value::None => "NoneType",
            | Value::Bool(_) => "bool",
            | Value::Int(_) => "int",
            | Value::Float(_) => "float",
            | Value::Complex(_) => "complex",
            | Value::Str(_) => "str",
            | Value::Tuple(_) => "tuple",
            | Value::List(_) => "list",
            | Value::Dict(_) => "dict",
            | Value::Func(_) => "function",
            | Value::Builtin(_) | Value::Method(_) => "builtin_function_or_method",
            | Value::Module(_) => "module",
            | Value::Exception(_) => "Exception",
        }
    }
    pub fn truthy(&self) -> bool {
        match self {
            | Value::None => false,
            | Value::Bool(b) => *b,
            | Value::Int(n) => *n != 0,
            | Value::Float(x) => *x != 0.0,
            | Value::Complex(Complex { re, im }) => *re != 0.0 || *im != 0.0,
            | Value::Str(s) => !s.is_empty(),
            | Value::Tuple(elts) => !elts.is_empty(),
            | Value::List(elts) => !elts.borrow().is_empty(),
            | Value::Dict(entries) => !entries.borrow().is_empty(),
            | _ => true,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self {
            | Value::Int(n) => Some(*n),
            | Value::Bool(b) => Some(*b as i64),
            | _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            | Value::Float(x) => Some(*x),
            | other => other.as_int().map(|n| n as f64),
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            | Value::Str(s) => Some(s),
            | _ => None,
        }
    }
    fn method(&self, name: &'static str) -> Self {
        Value::Method(Rc::new(BoundMethod { receiver: self.clone(), name }))
    }
    /// Elements of a tuple or list.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            | Value::Tuple(elts) => Some(elts.as_ref().clone()),
            | Value::List(elts) => Some(elts.borrow().clone()),
            | _ => None,
        }
    }
}

/* --------------------------------- Numbers -------------------------------- */

#[derive(Clone, Copy, Debug)]
enum Numeric {
    Int(i64),
    Float(f64),
    Complex(Complex),
}

impl Numeric {
    fn of(v: &Value) -> Option<Self> {
        match v {
            | Value::Bool(b) => Some(Numeric::Int(*b as i64)),
            | Value::Int(n) => Some(Numeric::Int(*n)),
            | Value::Float(x) => Some(Numeric::Float(*x)),
            | Value::Complex(c) => Some(Numeric::Complex(*c)),
            | _ => None,
        }
    }
    fn rank(&self) -> u8 {
        match self {
            | Numeric::Int(_) => 0,
            | Numeric::Float(_) => 1,
            | Numeric::Complex(_) => 2,
        }
    }
    fn to_float(self) -> f64 {
        match self {
            | Numeric::Int(n) => n as f64,
            | Numeric::Float(x) => x,
            | Numeric::Complex(Complex { re, .. }) => re,
        }
    }
    fn to_complex(self) -> Complex {
        match self {
            | Numeric::Complex(c) => c,
            | other => Complex { re: other.to_float(), im: 0.0 },
        }
    }
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }
    fn add(self, o: Self) -> Self {
        Complex::new(self.re + o.re, self.im + o.im)
    }
    fn sub(self, o: Self) -> Self {
        Complex::new(self.re - o.re, self.im - o.im)
    }
    fn mul(self, o: Self) -> Self {
        Complex::new(self.re * o.re - self.im * o.im, self.re * o.im + self.im * o.re)
    }
    fn div(self, o: Self) -> Result<Self> {
        let d = o.re * o.re + o.im * o.im;
        if d == 0.0 {
            return Err(RuntimeError::ZeroDivision(format!("complex division by zero")));
        }
        Ok(Complex::new(
            (self.re * o.re + self.im * o.im) / d,
            (self.im * o.re - self.re * o.im) / d,
        ))
    }
    fn pow(self, o: Self) -> Result<Self> {
        if o.re == 0.0 && o.im == 0.0 {
            return Ok(Complex::new(1.0, 0.0));
        }
        if self.re == 0.0 && self.im == 0.0 {
            if o.im != 0.0 || o.re < 0.0 {
                return Err(RuntimeError::ZeroDivision(format!(
                    "0.0 to a negative or complex power"
                )));
            }
            return Ok(Complex::new(0.0, 0.0));
        }
        let (r, theta) = (self.re.hypot(self.im), self.im.atan2(self.re));
        let ln_r = r.ln();
        let mag = (o.re * ln_r - o.im * theta).exp();
        let arg = o.im * ln_r + o.re * theta;
        Ok(Complex::new(mag * arg.cos(), mag * arg.sin()))
    }
}

fn unsupported_operands(op: &Operator, l: &Value, r: &Value) -> RuntimeError {
    RuntimeError::Type(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op,
        l.type_name(),
        r.type_name()
    ))
}

fn int_op(op: &Operator, a: i64, b: i64) -> Result<Value> {
    let overflow = || RuntimeError::Overflow(format!("integer overflow in {}", op));
    let zero = || RuntimeError::ZeroDivision(format!("integer division or modulo by zero"));
    Ok(match op {
        | Operator::Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
        | Operator::Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
        | Operator::Mult => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
        | Operator::Div => {
            if b == 0 {
                return Err(RuntimeError::ZeroDivision(format!("division by zero")));
            }
            Value::Float(a as f64 / b as f64)
        }
        | Operator::FloorDiv => {
            if b == 0 {
                return Err(zero());
            }
            let q = a.checked_div(b).ok_or_else(overflow)?;
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            Value::Int(if r != 0 && ((r < 0) != (b < 0)) { q - 1 } else { q })
        }
        | Operator::Mod => {
            if b == 0 {
                return Err(zero());
            }
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            Value::Int(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
        }
        | Operator::Pow => {
            if b < 0 {
                Value::Float((a as f64).powf(b as f64))
            } else {
                let exp = u32::try_from(b).map_err(|_| overflow())?;
                Value::Int(a.checked_pow(exp).ok_or_else(overflow)?)
            }
        }
        | Operator::LShift => {
            let shift = u32::try_from(b)
                .map_err(|_| RuntimeError::Value(format!("negative shift count")))?;
            Value::Int(a.checked_shl(shift).ok_or_else(overflow)?)
        }
        | Operator::RShift => {
            let shift = u32::try_from(b)
                .map_err(|_| RuntimeError::Value(format!("negative shift count")))?;
            Value::Int(a >> shift.min(63))
        }
        | Operator::BitOr => Value::Int(a | b),
        | Operator::BitXor => Value::Int(a ^ b),
        | Operator::BitAnd => Value::Int(a & b),
        | Operator::MatMult => {
            return Err(RuntimeError::Type(format!("unsupported operand type(s) for @")));
        }
    })
}

fn float_op(op: &Operator, a: f64, b: f64) -> Result<Value> {
    let zero = |what: &str| RuntimeError::ZeroDivision(format!("float {} by zero", what));
    Ok(Value::Float(match op {
        | Operator::Add => a + b,
        | Operator::Sub => a - b,
        | Operator::Mult => a * b,
        | Operator::Div => {
            if b == 0.0 {
                return Err(zero("division"));
            }
            a / b
        }
        | Operator::FloorDiv => {
            if b == 0.0 {
                return Err(zero("divmod()"));
            }
            (a / b).floor()
        }
        | Operator::Mod => {
            if b == 0.0 {
                return Err(zero("modulo"));
            }
            a - b * (a / b).floor()
        }
        | Operator::Pow => a.powf(b),
        | _ => return Err(RuntimeError::Type(format!("unsupported operand type(s) for {}: 'float'", op))),
    }))
}

fn complex_op(op: &Operator, a: Complex, b: Complex) -> Result<Value> {
    Ok(Value::Complex(match op {
        | Operator::Add => a.add(b),
        | Operator::Sub => a.sub(b),
        | Operator::Mult => a.mul(b),
        | Operator::Div => a.div(b)?,
        | Operator::Pow => a.pow(b)?,
        | Operator::FloorDiv | Operator::Mod => {
            return Err(RuntimeError::Type(format!("can't take floor or mod of complex number.")));
        }
        | _ => {
            return Err(RuntimeError::Type(format!(
                "unsupported operand type(s) for {}: 'complex'",
                op
            )));
        }
    }))
}

pub(crate) fn binary(op: &Operator, l: &Value, r: &Value) -> Result<Value> {
    if let (Some(a), Some(b)) = (Numeric::of(l), Numeric::of(r)) {
        return match a.rank().max(b.rank()) {
            | 0 => match (a, b) {
                | (Numeric::Int(a), Numeric::Int(b)) => int_op(op, a, b),
                | _ => Err(unsupported_operands(op, l, r)),
            },
            | 1 => float_op(op, a.to_float(), b.to_float()),
            | _ => complex_op(op, a.to_complex(), b.to_complex()),
        };
    }
    match (op, l, r) {
        | (Operator::Add, Value::Str(a), Value::Str(b)) => Ok(Value::from(format!("{}{}", a, b))),
        | (Operator::Mult, Value::Str(s), n) | (Operator::Mult, n, Value::Str(s))
            if n.as_int().is_some() =>
        {
            let times = n.as_int().unwrap_or_default().max(0) as usize;
            Ok(Value::from(s.repeat(times)))
        }
        | (Operator::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::from(a.iter().chain(b.iter()).cloned().collect::<Vec<_>>()))
        }
        | (Operator::Add, Value::List(a), Value::List(b)) => {
            let elts = a.borrow().iter().chain(b.borrow().iter()).cloned().collect();
            Ok(Value::list(elts))
        }
        | _ => Err(unsupported_operands(op, l, r)),
    }
}

pub(crate) fn unary(op: &UnaryOperator, v: &Value) -> Result<Value> {
    let bad = || {
        RuntimeError::Type(format!("bad operand type for unary {}: '{}'", op, v.type_name()))
    };
    match op {
        | UnaryOperator::Not => Ok(Value::Bool(!v.truthy())),
        | UnaryOperator::UAdd => match Numeric::of(v).ok_or_else(bad)? {
            | Numeric::Int(n) => Ok(Value::Int(n)),
            | Numeric::Float(x) => Ok(Value::Float(x)),
            | Numeric::Complex(c) => Ok(Value::Complex(c)),
        },
        | UnaryOperator::USub => match Numeric::of(v).ok_or_else(bad)? {
            | Numeric::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::Overflow(format!("integer overflow in negation"))),
            | Numeric::Float(x) => Ok(Value::Float(-x)),
            | Numeric::Complex(Complex { re, im }) => Ok(Value::Complex(Complex::new(-re, -im))),
        },
        | UnaryOperator::Invert => match v.as_int() {
            | Some(n) => Ok(Value::Int(!n)),
            | None => Err(bad()),
        },
    }
}

/* -------------------------------- Equality -------------------------------- */

pub fn py_eq(l: &Value, r: &Value) -> bool {
    if let (Some(a), Some(b)) = (Numeric::of(l), Numeric::of(r)) {
        let (a, b) = (a.to_complex(), b.to_complex());
        return a.re == b.re && a.im == b.im;
    }
    match (l, r) {
        | (Value::None, Value::None) => true,
        | (Value::Str(a), Value::Str(b)) => a == b,
        | (Value::Tuple(a), Value::Tuple(b)) => seq_eq(a, b),
        | (Value::List(a), Value::List(b)) => seq_eq(&a.borrow(), &b.borrow()),
        | (Value::Dict(a), Value::Dict(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            a.len() == b.len()
                && a.iter().all(|(k, v)| {
                    b.iter().any(|(k2, v2)| py_eq(k, k2) && py_eq(v, v2))
                })
        }
        | (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
        | (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
        | (Value::Method(a), Value::Method(b)) => a.name == b.name && py_eq(&a.receiver, &b.receiver),
        | (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
        | (Value::Exception(a), Value::Exception(b)) => Rc::ptr_eq(a, b),
        | _ => false,
    }
}

fn seq_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| py_eq(x, y))
}

/// Identity as far as it is observable: singletons, small immutable values
/// and shared references.
pub fn py_is(l: &Value, r: &Value) -> bool {
    match (l, r) {
        | (Value::None, Value::None) => true,
        | (Value::Bool(a), Value::Bool(b)) => a == b,
        | (Value::Int(a), Value::Int(b)) => a == b,
        | (Value::Tuple(a), Value::Tuple(b)) => {
            Rc::ptr_eq(a, b) || (a.is_empty() && b.is_empty())
        }
        | (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b) || a == b,
        | (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
        | (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
        | (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
        | (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
        | (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
        | (Value::Exception(a), Value::Exception(b)) => Rc::ptr_eq(a, b),
        | _ => false,
    }
}

fn py_order(op: &CmpOp, l: &Value, r: &Value) -> Result<bool> {
    use std::cmp::Ordering;
    let ord = match (l, r) {
        | (Value::Str(a), Value::Str(b)) => a.cmp(b),
        | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if !py_eq(x, y) {
                    return py_order(op, x, y);
                }
            }
            a.len().cmp(&b.len())
        }
        | _ => match (Numeric::of(l), Numeric::of(r)) {
            | (Some(Numeric::Int(a)), Some(Numeric::Int(b))) => a.cmp(&b),
            | (Some(a), Some(b)) if a.rank() < 2 && b.rank() < 2 => {
                match a.to_float().partial_cmp(&b.to_float()) {
                    | Some(ord) => ord,
                    | None => return Ok(false),
                }
            }
            | _ => {
                return Err(RuntimeError::Type(format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    op,
                    l.type_name(),
                    r.type_name()
                )));
            }
        },
    };
    Ok(match op {
        | CmpOp::Lt => ord == Ordering::Less,
        | CmpOp::LtE => ord != Ordering::Greater,
        | CmpOp::Gt => ord == Ordering::Greater,
        | CmpOp::GtE => ord != Ordering::Less,
        | _ => false,
    })
}

fn contains(container: &Value, item: &Value) -> Result<bool> {
    match container {
        | Value::Str(s) => match item {
            | Value::Str(sub) => Ok(s.contains(sub.as_ref())),
            | _ => Err(RuntimeError::Type(format!(
                "'in <string>' requires string as left operand, not {}",
                item.type_name()
            ))),
        },
        | Value::Tuple(elts) => Ok(elts.iter().any(|e| py_eq(e, item))),
        | Value::List(elts) => Ok(elts.borrow().iter().any(|e| py_eq(e, item))),
        | Value::Dict(entries) => Ok(entries.borrow().iter().any(|(k, _)| py_eq(k, item))),
        | _ => Err(RuntimeError::Type(format!(
            "argument of type '{}' is not iterable",
            container.type_name()
        ))),
    }
}

pub(crate) fn compare(op: &CmpOp, l: &Value, r: &Value) -> Result<bool> {
    match op {
        | CmpOp::Eq => Ok(py_eq(l, r)),
        | CmpOp::NotEq => Ok(!py_eq(l, r)),
        | CmpOp::Is => Ok(py_is(l, r)),
        | CmpOp::IsNot => Ok(!py_is(l, r)),
        | CmpOp::In => contains(r, l),
        | CmpOp::NotIn => contains(r, l).map(|b| !b),
        | CmpOp::Lt | CmpOp::LtE | CmpOp::Gt | CmpOp::GtE => py_order(op, l, r),
    }
}

/* ------------------------------- Subscripts ------------------------------- */

fn normalize(idx: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if idx < 0 { idx + len } else { idx };
    if (0..len).contains(&idx) { Some(idx as usize) } else { None }
}

pub(crate) fn index(v: &Value, idx: &Value) -> Result<Value> {
    let out_of_range =
        |what: &str| RuntimeError::Index(format!("{} index out of range", what));
    let position = || {
        idx.as_int().ok_or_else(|| {
            RuntimeError::Type(format!("indices must be integers, not {}", idx.type_name()))
        })
    };
    match v {
        | Value::Tuple(elts) => {
            let i = normalize(position()?, elts.len()).ok_or_else(|| out_of_range("tuple"))?;
            Ok(elts[i].clone())
        }
        | Value::List(elts) => {
            let elts = elts.borrow();
            let i = normalize(position()?, elts.len()).ok_or_else(|| out_of_range("list"))?;
            Ok(elts[i].clone())
        }
        | Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = normalize(position()?, chars.len()).ok_or_else(|| out_of_range("string"))?;
            Ok(Value::from(chars[i].to_string()))
        }
        | Value::Dict(entries) => entries
            .borrow()
            .iter()
            .find(|(k, _)| py_eq(k, idx))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| RuntimeError::Key(crate::fmt::repr(idx))),
        | _ => Err(RuntimeError::Type(format!(
            "'{}' object is not subscriptable",
            v.type_name()
        ))),
    }
}

/// Positions selected by `lower:upper:step` over a sequence of `len` items.
fn slice_positions(
    len: usize, lower: Option<i64>, upper: Option<i64>, step: Option<i64>,
) -> Result<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(RuntimeError::Value(format!("slice step cannot be zero")));
    }
    let len = len as i64;
    let clamp = |i: i64, lo: i64, hi: i64| {
        let i = if i < 0 { i + len } else { i };
        i.clamp(lo, hi)
    };
    let mut positions = Vec::new();
    if step > 0 {
        let start = lower.map_or(0, |i| clamp(i, 0, len));
        let stop = upper.map_or(len, |i| clamp(i, 0, len));
        let mut i = start;
        while i < stop {
            positions.push(i as usize);
            i += step;
        }
    } else {
        let start = lower.map_or(len - 1, |i| clamp(i, -1, len - 1));
        let stop = upper.map_or(-1, |i| clamp(i, -1, len - 1));
        let mut i = start;
        while i > stop {
            positions.push(i as usize);
            i += step;
        }
    }
    Ok(positions)
}

pub(crate) fn slice(
    v: &Value, lower: Option<Value>, upper: Option<Value>, step: Option<Value>,
) -> Result<Value> {
    let bound = |b: Option<Value>| -> Result<Option<i64>> {
        match b {
            | None | Some(Value::None) => Ok(None),
            | Some(b) => b.as_int().map(Some).ok_or_else(|| {
                RuntimeError::Type(format!("slice indices must be integers or None"))
            }),
        }
    };
    let (lower, upper, step) = (bound(lower)?, bound(upper)?, bound(step)?);
    match v {
        | Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let picked = slice_positions(chars.len(), lower, upper, step)?;
            Ok(Value::from(picked.into_iter().map(|i| chars[i]).collect::<String>()))
        }
        | Value::Tuple(elts) => {
            let picked = slice_positions(elts.len(), lower, upper, step)?;
            Ok(Value::from(picked.into_iter().map(|i| elts[i].clone()).collect::<Vec<_>>()))
        }
        | Value::List(elts) => {
            let elts = elts.borrow();
            let picked = slice_positions(elts.len(), lower, upper, step)?;
            Ok(Value::list(picked.into_iter().map(|i| elts[i].clone()).collect()))
        }
        | _ => Err(RuntimeError::Type(format!(
            "'{}' object is not subscriptable",
            v.type_name()
        ))),
    }
}

pub(crate) fn attribute(v: &Value, attr: &str) -> Result<Value> {
    let missing = || {
        RuntimeError::Attribute(format!("'{}' object has no attribute '{}'", v.type_name(), attr))
    };
    match (v, attr) {
        | (Value::Complex(Complex { re, .. }), "real") => Ok(Value::Float(*re)),
        | (Value::Complex(Complex { im, .. }), "imag") => Ok(Value::Float(*im)),
        | (Value::Int(_) | Value::Bool(_), "real") => Ok(Value::Int(v.as_int().unwrap_or_default())),
        | (Value::Int(_) | Value::Bool(_), "imag") => Ok(Value::Int(0)),
        | (Value::Float(x), "real") => Ok(Value::Float(*x)),
        | (Value::Float(_), "imag") => Ok(Value::Float(0.0)),
        | (Value::Module(module), _) => match module.members.get(attr) {
            | Some(member) => Ok(member.clone()),
            | None => Err(RuntimeError::Attribute(format!(
                "module '{}' has no attribute '{}'",
                module.name, attr
            ))),
        },
        | (Value::Exception(exc), "args") => {
            Ok(Value::from(vec![Value::from(exc.message.as_str())]))
        }
        | (Value::Str(_), "startswith") => Ok(v.method("startswith")),
        | (Value::Str(_), "endswith") => Ok(v.method("endswith")),
        | (Value::Dict(_), "keys") => Ok(v.method("keys")),
        | _ => Err(missing()),
    }
}

pub(crate) fn call_method(method: &BoundMethod, args: Vec<Value>) -> Result<Value> {
    let BoundMethod { receiver, name } = method;
    match (receiver, *name, args.as_slice()) {
        | (Value::Str(s), "startswith", [Value::Str(prefix)]) => {
            Ok(Value::Bool(s.starts_with(prefix.as_ref())))
        }
        | (Value::Str(s), "endswith", [Value::Str(suffix)]) => {
            Ok(Value::Bool(s.ends_with(suffix.as_ref())))
        }
        | (Value::Dict(entries), "keys", []) => {
            Ok(Value::list(entries.borrow().iter().map(|(k, _)| k.clone()).collect()))
        }
        | (_, name, args) => Err(RuntimeError::Type(format!(
            "{}() got invalid arguments ({} given)",
            name,
            args.len()
        ))),
    }
}

/// The items a `for` loop or a comprehension walks over.
pub(crate) fn iterate(v: &Value) -> Result<Vec<Value>> {
    match v {
        | Value::Str(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
        | Value::Dict(entries) => Ok(entries.borrow().iter().map(|(k, _)| k.clone()).collect()),
        | other => other.elements().ok_or_else(|| {
            RuntimeError::Type(format!("'{}' object is not iterable", other.type_name()))
        }),
    }
}
