//! Error messages in the type checker.
//! Shows the error message, where to look at in the source code, and the stack trace.

use crate::{syntax::*, *};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TyckError {
    /// a type's index syntax is malformed
    #[error("Type formation error: {0}")]
    TypeFormation(String),
    #[error("Kind error: {0}")]
    Kind(String),
    #[error("Type error: {0}")]
    Type(String),
    #[error("Type error: Type inconsistency. Expected: {expected}. Got: {found}.")]
    TypeMismatch { expected: String, found: String },
    /// a fragment does not honor the protocol
    #[error("Usage error: {0}")]
    Usage(String),
    /// unreachable on well-formed input
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Component formation error: {0}")]
    ComponentFormation(String),
}

impl TyckError {
    /// Errors an attempt may swallow; the rest are bugs in a fragment or in the
    /// checker and always propagate.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, TyckError::Usage(_) | TyckError::Internal(_))
    }
    pub fn message(&self) -> String {
        match self {
            | TyckError::TypeFormation(msg)
            | TyckError::Kind(msg)
            | TyckError::Type(msg)
            | TyckError::Usage(msg)
            | TyckError::Internal(msg)
            | TyckError::ComponentFormation(msg) => msg.clone(),
            | TyckError::TypeMismatch { expected, found } => {
                format!("Type inconsistency. Expected: {}. Got: {}.", expected, found)
            }
        }
    }
}

#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct TyckErrorEntry {
    pub error: TyckError,
    pub blame: &'static std::panic::Location<'static>,
    /// the offending node, if any
    pub site: Option<Tree>,
    pub stack: im::Vector<TyckTask>,
}

pub type Result<T> = std::result::Result<T, TyckErrorEntry>;

/// What the checker was doing; pushed on entry to every judgment.
#[derive(Clone, Debug)]
pub enum TyckTask {
    Syn(Tree),
    Ana(Tree, TyExpr),
    Check(StmtId),
    Pat(ExprId, TyExpr),
    TyExpr(ExprId),
    Trans(Tree),
}

impl Context {
    pub(crate) fn site_output(&self, tree: &Tree) -> String {
        let fmt = Formatter::new(&self.arena);
        match tree {
            | Tree::Expr(e) => e.ugly(&fmt),
            | Tree::Stmt(s) => s.ugly(&fmt),
            | Tree::Match(m) => self.matches[m].scrutinizer.ugly(&fmt),
        }
    }
    pub fn error_entry_output(
        &self, TyckErrorEntry { error, blame, site, stack }: &TyckErrorEntry,
    ) -> String {
        use colored::Colorize;
        let budget = 80;
        let truncated = |mut s: String| {
            if s.len() > budget {
                let mut end = budget - 3;
                while !s.is_char_boundary(end) {
                    end -= 1;
                }
                s.truncate(end);
                s.push_str("...");
            }
            s
        };

        let mut s = String::new();
        s += &format!("{}\n", error.to_string().red());
        if let Some(site) = site {
            s += &format!("\t@ {}\n", truncated(self.site_output(site)));
        }
        s += &format!("Blame: {}\n", blame);
        for task in stack.iter() {
            match task {
                | TyckTask::Syn(tree) => {
                    s += "\t- when synthesizing:\n";
                    s += &format!("\t\t>> {}\n", truncated(self.site_output(tree)));
                }
                | TyckTask::Ana(tree, ty) => {
                    s += "\t- when analyzing:\n";
                    s += &format!("\t\t>> {}\n", truncated(self.site_output(tree)));
                    s += &format!("\t\t<< {}\n", truncated(ty.to_string()));
                }
                | TyckTask::Check(stmt) => {
                    s += "\t- when checking statement:\n";
                    s += &format!("\t\t>> {}\n", truncated(self.site_output(&(*stmt).into())));
                }
                | TyckTask::Pat(pat, ty) => {
                    s += "\t- when analyzing pattern:\n";
                    s += &format!("\t\t>> {}\n", truncated(self.site_output(&(*pat).into())));
                    s += &format!("\t\t<< {}\n", truncated(ty.to_string()));
                }
                | TyckTask::TyExpr(e) => {
                    s += "\t- when elaborating type expression:\n";
                    s += &format!("\t\t>> {}\n", truncated(self.site_output(&(*e).into())));
                }
                | TyckTask::Trans(tree) => {
                    s += "\t- when translating:\n";
                    s += &format!("\t\t>> {}\n", truncated(self.site_output(tree)));
                }
            }
        }
        s
    }
}
