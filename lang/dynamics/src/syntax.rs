pub use typy_syntax::*;

use indexmap::IndexMap;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/* ---------------------------------- Frame --------------------------------- */

pub type RcFrame = Rc<RefCell<Frame>>;

/// A variable scope; function calls open a new one whose parent is the
/// frame the function was defined in.
#[derive(Default)]
pub struct Frame {
    pub vars: HashMap<String, Value>,
    pub parent: Option<RcFrame>,
}

/* ---------------------------------- Value --------------------------------- */

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

#[derive(Clone, Debug)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
    Str(Rc<str>),
    Tuple(Rc<Vec<Value>>),
    List(Rc<RefCell<Vec<Value>>>),
    /// insertion-ordered entries
    Dict(Rc<RefCell<Vec<(Value, Value)>>>),
    Func(Rc<Closure>),
    Builtin(Builtin),
    Method(Rc<BoundMethod>),
    Module(Rc<Module>),
    Exception(Rc<Exception>),
}

pub enum Body {
    Block(BlockId),
    Expr(ExprId),
}

/// A user function; it carries the arena its body lives in, so modules can
/// call into each other.
pub struct Closure {
    pub name: String,
    pub params: Vec<String>,
    pub body: Body,
    pub env: RcFrame,
    pub arena: Rc<HostArena>,
}

pub type BuiltinFn = fn(&str, Vec<Value>) -> crate::Result<Value>;

#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub body: BuiltinFn,
}

/// `receiver.name` for a method of a builtin type, not yet called.
#[derive(Debug)]
pub struct BoundMethod {
    pub receiver: Value,
    pub name: &'static str,
}

#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub members: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    pub kind: String,
    pub message: String,
}

/* --------------------------------- Runtime -------------------------------- */

/// Control flow out of a statement.
#[derive(Debug)]
pub enum Flow {
    Next,
    Return(Value),
    Break,
    Continue,
}

pub struct Runtime {
    pub(crate) arena: Rc<HostArena>,
    pub(crate) depth: usize,
}
