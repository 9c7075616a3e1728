#![allow(clippy::style)]
#![allow(clippy::useless_format)]

/// The host syntax tree.
pub mod syntax;
pub use syntax::*;
/// Arena holding every node of a program.
pub mod arena;
pub use arena::*;
/// Node builders.
pub mod construct;
/// Rendering host syntax as source text.
pub mod fmt;
pub use fmt::*;

mod impls;

#[cfg(test)]
mod tests;
