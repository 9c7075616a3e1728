#![allow(clippy::style)]
#![allow(clippy::useless_format)]

/// Host syntax, and what the checker says about it.
pub mod syntax;
/// Sorting host nodes into dispatch strategies.
pub mod classify;
/// The static environment.
pub mod env;
pub use env::{ComponentRef, Exports, StaticEnv, StaticValue};
/// The fragment protocol.
pub mod fragment;
pub use fragment::{Fragment, FragmentRef};
/// The bidirectional engine.
pub mod tyck;
pub use tyck::{Assumptions, Context, VarBindings};
/// The type of component references.
pub mod singleton;
pub use singleton::component_singleton;

/// Error definitions and reporting.
pub mod err;
pub use err::*;
/// Rendering kinds and types.
pub mod fmt;
pub(crate) use fmt::{Formatter, Ugly};
mod log;
