use crate::syntax::Exception;
use thiserror::Error;

/// Host exceptions, raised by the program or by the runtime itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{kind}: {message}")]
    Raised { kind: String, message: String },
    #[error("NameError: name '{0}' is not defined")]
    Unbound(String),
    #[error("TypeError: {0}")]
    Type(String),
    #[error("ValueError: {0}")]
    Value(String),
    #[error("ZeroDivisionError: {0}")]
    ZeroDivision(String),
    #[error("IndexError: {0}")]
    Index(String),
    #[error("KeyError: {0}")]
    Key(String),
    #[error("AttributeError: {0}")]
    Attribute(String),
    #[error("AssertionError: {0}")]
    Assertion(String),
    #[error("OverflowError: {0}")]
    Overflow(String),
    #[error("ImportError: No module named '{0}'")]
    Import(String),
    #[error("RecursionError: maximum recursion depth exceeded")]
    Recursion,
    #[error("SyntaxError: '{0}' outside of its enclosing construct")]
    Misplaced(&'static str),
    #[error("NotImplementedError: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

impl RuntimeError {
    /// The host exception class name.
    pub fn kind(&self) -> &str {
        match self {
            | RuntimeError::Raised { kind, .. } => kind,
            | RuntimeError::Unbound(_) => "NameError",
            | RuntimeError::Type(_) => "TypeError",
            | RuntimeError::Value(_) => "ValueError",
            | RuntimeError::ZeroDivision(_) => "ZeroDivisionError",
            | RuntimeError::Index(_) => "IndexError",
            | RuntimeError::Key(_) => "KeyError",
            | RuntimeError::Attribute(_) => "AttributeError",
            | RuntimeError::Assertion(_) => "AssertionError",
            | RuntimeError::Overflow(_) => "OverflowError",
            | RuntimeError::Import(_) => "ImportError",
            | RuntimeError::Recursion => "RecursionError",
            | RuntimeError::Misplaced(_) => "SyntaxError",
            | RuntimeError::Unsupported(_) => "NotImplementedError",
        }
    }
    pub fn message(&self) -> String {
        match self {
            | RuntimeError::Raised { message, .. } => message.clone(),
            | other => {
                let shown = other.to_string();
                match shown.split_once(": ") {
                    | Some((_, message)) => message.to_string(),
                    | None => shown,
                }
            }
        }
    }
    /// The exception object a handler binds.
    pub fn to_exception(&self) -> Exception {
        Exception { kind: self.kind().to_string(), message: self.message() }
    }
}

impl From<Exception> for RuntimeError {
    fn from(Exception { kind, message }: Exception) -> Self {
        RuntimeError::Raised { kind, message }
    }
}
