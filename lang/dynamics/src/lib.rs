#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod syntax;
pub use syntax::{Flow, Runtime, Value};
pub mod err;
pub use err::*;
pub mod builtin;
mod impls;
pub mod eval;
pub use eval::*;
pub mod fmt;

#[cfg(test)]
mod tests;
