//! Host builtins and the host modules a translation may import.

use crate::{err::*, syntax::*};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::{collections::HashMap, rc::Rc};

pub static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let table: [(&'static str, BuiltinFn); 15] = [
        ("bool", to_bool),
        ("float", float),
        ("complex", complex),
        ("int", int),
        ("str", to_str),
        ("len", len),
        ("list", list),
        ("tuple", tuple),
        ("dict", dict),
        ("isinstance", isinstance),
        ("abs", abs),
        ("Exception", exception),
        ("ValueError", exception),
        ("TypeError", exception),
        ("AssertionError", exception),
    ];
    table.into_iter().map(|(name, body)| (name, Builtin { name, body })).collect()
});

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(RuntimeError::Type(format!(
            "{}() takes from {} to {} arguments ({} given)",
            name,
            min,
            max,
            args.len()
        )));
    }
    Ok(())
}

fn parse_float(s: &str) -> Option<f64> {
    let t = s.trim();
    let (sign, body) = match t.strip_prefix('-') {
        | Some(rest) => (-1.0, rest),
        | None => (1.0, t.strip_prefix('+').unwrap_or(t)),
    };
    match body.to_ascii_lowercase().as_str() {
        | "nan" => Some(f64::NAN),
        | "inf" | "infinity" => Some(sign * f64::INFINITY),
        | _ => t.parse().ok(),
    }
}

fn float(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 0, 1)?;
    let Some(arg) = args.first() else { return Ok(Value::Float(0.0)) };
    match arg {
        | Value::Str(s) => parse_float(s).map(Value::Float).ok_or_else(|| {
            RuntimeError::Value(format!("could not convert string to float: {}", crate::fmt::repr(arg)))
        }),
        | other => other.as_float().map(Value::Float).ok_or_else(|| {
            RuntimeError::Type(format!(
                "float() argument must be a string or a number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

fn complex(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 0, 2)?;
    let part = |v: Option<&Value>| -> Result<Complex> {
        match v {
            | None => Ok(Complex::new(0.0, 0.0)),
            | Some(Value::Complex(c)) => Ok(*c),
            | Some(other) => other.as_float().map(|re| Complex::new(re, 0.0)).ok_or_else(|| {
                RuntimeError::Type(format!(
                    "complex() argument must be a number, not '{}'",
                    other.type_name()
                ))
            }),
        }
    };
    let (re, im) = (part(args.first())?, part(args.get(1))?);
    // re + im * 1j
    Ok(Value::Complex(Complex::new(re.re - im.im, re.im + im.re)))
}

fn int(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 0, 1)?;
    let Some(arg) = args.first() else { return Ok(Value::Int(0)) };
    match arg {
        | Value::Float(x) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
        | Value::Float(_) => Err(RuntimeError::Overflow(format!(
            "cannot convert float infinity or NaN to integer"
        ))),
        | Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| {
            RuntimeError::Value(format!("invalid literal for int(): {}", crate::fmt::repr(arg)))
        }),
        | other => other.as_int().map(Value::Int).ok_or_else(|| {
            RuntimeError::Type(format!(
                "int() argument must be a string or a number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

fn to_str(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 0, 1)?;
    Ok(Value::from(args.first().map(|v| v.to_string()).unwrap_or_default()))
}

fn len(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 1, 1)?;
    let n = match &args[0] {
        | Value::Str(s) => s.chars().count(),
        | Value::Tuple(elts) => elts.len(),
        | Value::List(elts) => elts.borrow().len(),
        | Value::Dict(entries) => entries.borrow().len(),
        | other => {
            return Err(RuntimeError::Type(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )));
        }
    };
    Ok(Value::Int(n as i64))
}

fn abs(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 1, 1)?;
    match &args[0] {
        | Value::Float(x) => Ok(Value::Float(x.abs())),
        | Value::Complex(Complex { re, im }) => Ok(Value::Float(re.hypot(*im))),
        | other => match other.as_int() {
            | Some(n) => n.checked_abs().map(Value::Int).ok_or_else(|| {
                RuntimeError::Overflow(format!("integer overflow in abs()"))
            }),
            | None => Err(RuntimeError::Type(format!(
                "bad operand type for abs(): '{}'",
                other.type_name()
            ))),
        },
    }
}

fn to_bool(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 0, 1)?;
    Ok(Value::Bool(args.first().is_some_and(Value::truthy)))
}

fn list(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 0, 1)?;
    let items = args.first().map(crate::impls::iterate).transpose()?;
    Ok(Value::list(items.unwrap_or_default()))
}

fn tuple(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 0, 1)?;
    let items = args.first().map(crate::impls::iterate).transpose()?;
    Ok(Value::from(items.unwrap_or_default()))
}

fn dict(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 0, 1)?;
    let Some(arg) = args.first() else { return Ok(Value::dict(Vec::new())) };
    if let Value::Dict(entries) = arg {
        return Ok(Value::dict(entries.borrow().clone()));
    }
    let mut entries: Vec<(Value, Value)> = Vec::new();
    for (i, item) in crate::impls::iterate(arg)?.into_iter().enumerate() {
        let pair = item.elements().filter(|pair| pair.len() == 2).ok_or_else(|| {
            RuntimeError::Value(format!(
                "dictionary update sequence element #{} has the wrong length",
                i
            ))
        })?;
        let [k, v]: [Value; 2] = pair.try_into().map_err(|_| {
            RuntimeError::Value(format!("dictionary update sequence element #{} is malformed", i))
        })?;
        match entries.iter_mut().find(|(k2, _)| crate::impls::py_eq(k2, &k)) {
            | Some((_, slot)) => *slot = v,
            | None => entries.push((k, v)),
        }
    }
    Ok(Value::dict(entries))
}

/// Whether `v` is an instance of the class `class` names.
fn instance_of(v: &Value, class: &Value) -> Result<bool> {
    match class {
        | Value::Builtin(Builtin { name: "int", .. }) => {
            Ok(matches!(v, Value::Int(_) | Value::Bool(_)))
        }
        | Value::Builtin(Builtin {
            name: name @ ("bool" | "float" | "complex" | "str" | "tuple" | "list" | "dict"),
            ..
        }) => Ok(v.type_name() == *name),
        | Value::Tuple(classes) => {
            for class in classes.iter() {
                if instance_of(v, class)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        | _ => Err(RuntimeError::Type(format!(
            "isinstance() arg 2 must be a type or tuple of types"
        ))),
    }
}

fn isinstance(name: &str, args: Vec<Value>) -> Result<Value> {
    arity(name, &args, 2, 2)?;
    Ok(Value::Bool(instance_of(&args[0], &args[1])?))
}

fn exception(name: &str, args: Vec<Value>) -> Result<Value> {
    let message = args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
    Ok(Value::Exception(Rc::new(Exception { kind: name.to_string(), message })))
}

/* ---------------------------------- math ---------------------------------- */

fn float_arg(name: &str, args: &[Value]) -> Result<f64> {
    arity(name, args, 1, 1)?;
    args[0].as_float().ok_or_else(|| {
        RuntimeError::Type(format!("must be real number, not {}", args[0].type_name()))
    })
}

fn isnan(name: &str, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Bool(float_arg(name, &args)?.is_nan()))
}

fn isinf(name: &str, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Bool(float_arg(name, &args)?.is_infinite()))
}

fn sqrt(name: &str, args: Vec<Value>) -> Result<Value> {
    let x = float_arg(name, &args)?;
    if x < 0.0 {
        return Err(RuntimeError::Value(format!("math domain error")));
    }
    Ok(Value::Float(x.sqrt()))
}

fn floor(name: &str, args: Vec<Value>) -> Result<Value> {
    let x = float_arg(name, &args)?;
    if !x.is_finite() {
        return Err(RuntimeError::Overflow(format!("cannot convert float infinity or NaN to integer")));
    }
    Ok(Value::Int(x.floor() as i64))
}

fn builtin_value(name: &'static str, body: BuiltinFn) -> Value {
    Value::Builtin(Builtin { name, body })
}

/// A fresh instance of a host module, if the runtime provides it.
pub fn module(name: &str) -> Option<Value> {
    let members: IndexMap<String, Value> = match name {
        | "math" => [
            ("isnan", builtin_value("isnan", isnan)),
            ("isinf", builtin_value("isinf", isinf)),
            ("sqrt", builtin_value("sqrt", sqrt)),
            ("floor", builtin_value("floor", floor)),
            ("pi", Value::Float(std::f64::consts::PI)),
            ("inf", Value::Float(f64::INFINITY)),
            ("nan", Value::Float(f64::NAN)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        | "builtins" => {
            let mut members: Vec<_> = BUILTINS.iter().collect();
            members.sort_by_key(|(name, _)| **name);
            members
                .into_iter()
                .map(|(name, builtin)| (name.to_string(), Value::Builtin(*builtin)))
                .collect()
        }
        | _ => return None,
    };
    Some(Value::Module(Rc::new(Module { name: name.to_string(), members })))
}
