use thiserror::Error;
use typy_dynamics::RuntimeError;
use typy_statics::{Context, TyckError, TyckErrorEntry};

#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("Tyck error in component `{name}`:\n{report}")]
    Tyck { name: String, error: TyckError, report: String },
    #[error("Runtime error in component `{name}`: {error}")]
    Runtime { name: String, error: RuntimeError },
}

impl ComponentError {
    /// Renders `entry` while the context that raised it is still around.
    pub fn tyck(ctx: &Context, name: &str, entry: TyckErrorEntry) -> Self {
        let report = ctx.error_entry_output(&entry);
        ComponentError::Tyck { name: name.to_string(), error: entry.error, report }
    }
    /// The checker error, if checking failed.
    pub fn tyck_error(&self) -> Option<&TyckError> {
        match self {
            | ComponentError::Tyck { error, .. } => Some(error),
            | ComponentError::Runtime { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ComponentError>;
