#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub(crate) use indexmap::IndexMap;
pub(crate) use typy_statics::{syntax::*, *};

mod util;

/// Opaque host values.
pub mod py;
pub use py::{py, py_ty};
pub mod unit;
pub use unit::{unit, unit_ty};
pub mod boolean;
pub use boolean::{boolean, boolean_ty};
/// Integers.
pub mod num;
pub use num::{num, num_ty};
/// Floating point numbers.
pub mod ieee;
pub use ieee::{ieee, ieee_ty};
/// Complex numbers.
pub mod cplx;
pub use cplx::{cplx, cplx_ty};
pub mod string;
pub use string::{string, string_ty};
/// Labelled tuples.
pub mod tpl;
pub use tpl::{tpl, tpl_ty};
/// Records.
pub mod record;
pub use record::{record, record_ty};
/// Finite tagged sums.
pub mod variant;
pub use variant::{variant, variant_ty};
/// Functions.
pub mod function;
pub use function::{function, function_ty};

/// Every standard fragment.
pub fn fragments() -> Vec<FragmentRef> {
    vec![
        py(),
        unit(),
        boolean(),
        num(),
        ieee(),
        cplx(),
        string(),
        tpl(),
        record(),
        variant(),
        function(),
    ]
}

/// The static environment every component starts from: each standard
/// fragment under its own name, and all of them again under `std`.
pub fn prelude() -> StaticEnv {
    let mut std = StaticEnv::new();
    let mut env = StaticEnv::new();
    for fragment in fragments() {
        std.insert(fragment.name(), fragment);
        env.insert(fragment.name(), fragment);
    }
    env.with("std", std)
}

#[cfg(test)]
mod tests;
