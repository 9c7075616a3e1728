use crate::*;
use std::fmt;

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            | Operator::Add => "+",
            | Operator::Sub => "-",
            | Operator::Mult => "*",
            | Operator::MatMult => "@",
            | Operator::Div => "/",
            | Operator::Mod => "%",
            | Operator::Pow => "**",
            | Operator::LShift => "<<",
            | Operator::RShift => ">>",
            | Operator::BitOr => "|",
            | Operator::BitXor => "^",
            | Operator::BitAnd => "&",
            | Operator::FloorDiv => "//",
        }
    }
    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            Operator::LShift
                | Operator::RShift
                | Operator::BitOr
                | Operator::BitXor
                | Operator::BitAnd
        )
    }
}

impl BoolOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            | BoolOperator::And => "and",
            | BoolOperator::Or => "or",
        }
    }
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            | UnaryOperator::Invert => "~",
            | UnaryOperator::Not => "not ",
            | UnaryOperator::UAdd => "+",
            | UnaryOperator::USub => "-",
        }
    }
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            | CmpOp::Eq => "==",
            | CmpOp::NotEq => "!=",
            | CmpOp::Lt => "<",
            | CmpOp::LtE => "<=",
            | CmpOp::Gt => ">",
            | CmpOp::GtE => ">=",
            | CmpOp::Is => "is",
            | CmpOp::IsNot => "is not",
            | CmpOp::In => "in",
            | CmpOp::NotIn => "not in",
        }
    }
    /// `<`, `<=`, `>` and `>=`.
    pub fn is_ordering(&self) -> bool {
        matches!(self, CmpOp::Lt | CmpOp::LtE | CmpOp::Gt | CmpOp::GtE)
    }
    pub fn is_membership(&self) -> bool {
        matches!(self, CmpOp::In | CmpOp::NotIn)
    }
}

macro_rules! impl_display_symbol {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.symbol().trim())
                }
            }
        )*
    };
}
impl_display_symbol!(Operator, BoolOperator, UnaryOperator, CmpOp);

impl Name {
    /// Capitalized names are constructors, not variables.
    pub fn is_constructor(&self) -> bool {
        let Name(id) = self;
        id.chars().next().is_some_and(char::is_uppercase)
    }
}

impl<T: AsRef<str>> From<T> for Name {
    fn from(name: T) -> Self {
        Name(name.as_ref().to_string())
    }
}

impl Expr {
    /// The host name of the node's shape, used in diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            | Expr::BoolOp(_) => "BoolOp",
            | Expr::BinOp(_) => "BinOp",
            | Expr::UnaryOp(_) => "UnaryOp",
            | Expr::Lambda(_) => "Lambda",
            | Expr::IfExp(_) => "IfExp",
            | Expr::Dict(_) => "Dict",
            | Expr::Set(_) => "Set",
            | Expr::Compare(_) => "Compare",
            | Expr::Call(_) => "Call",
            | Expr::Num(_) => "Num",
            | Expr::Str(_) => "Str",
            | Expr::NameConstant(_) => "NameConstant",
            | Expr::Attribute(_) => "Attribute",
            | Expr::Subscript(_) => "Subscript",
            | Expr::Name(_) => "Name",
            | Expr::List(_) => "List",
            | Expr::Tuple(_) => "Tuple",
            | Expr::JoinedStr(_) => "JoinedStr",
            | Expr::FormattedValue(_) => "FormattedValue",
            | Expr::ListComp(_) => "ListComp",
            | Expr::SetComp(_) => "SetComp",
            | Expr::DictComp(_) => "DictComp",
            | Expr::GeneratorExp(_) => "GeneratorExp",
            | Expr::Await(_) => "Await",
            | Expr::Yield(_) => "Yield",
            | Expr::Starred(_) => "Starred",
        }
    }
}

impl Stmt {
    pub fn shape_name(&self) -> &'static str {
        match self {
            | Stmt::FunctionDef(_) => "FunctionDef",
            | Stmt::AsyncFunctionDef(_) => "AsyncFunctionDef",
            | Stmt::ClassDef(_) => "ClassDef",
            | Stmt::Return(_) => "Return",
            | Stmt::Delete(_) => "Delete",
            | Stmt::Assign(_) => "Assign",
            | Stmt::AugAssign(_) => "AugAssign",
            | Stmt::For(_) => "For",
            | Stmt::AsyncFor(_) => "AsyncFor",
            | Stmt::While(_) => "While",
            | Stmt::If(_) => "If",
            | Stmt::With(_) => "With",
            | Stmt::AsyncWith(_) => "AsyncWith",
            | Stmt::Raise(_) => "Raise",
            | Stmt::Try(_) => "Try",
            | Stmt::Assert(_) => "Assert",
            | Stmt::Import(_) => "Import",
            | Stmt::ImportFrom(_) => "ImportFrom",
            | Stmt::Global(_) => "Global",
            | Stmt::Nonlocal(_) => "Nonlocal",
            | Stmt::Expr(_) => "Expr",
            | Stmt::Pass => "Pass",
            | Stmt::Break => "Break",
            | Stmt::Continue => "Continue",
        }
    }
}

impl Arguments {
    /// Positional parameters only, nothing else.
    pub fn is_simple(&self) -> bool {
        let Arguments { args: _, vararg, kwonlyargs, kwarg, defaults } = self;
        vararg.is_none() && kwonlyargs.is_empty() && kwarg.is_none() && defaults.is_empty()
    }
    pub fn positional<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Arguments {
            args: names.into_iter().map(|arg| Arg { arg: arg.to_string(), annotation: None }).collect(),
            ..Default::default()
        }
    }
}
