use crate::{syntax::*, *};
use std::fmt::Display;

impl Context {
    pub fn log_tree<S>(&self, msg: S, tree: impl Into<Tree>)
    where
        S: Display,
    {
        if ::log::log_enabled!(::log::Level::Trace) {
            let res = self.site_output(&tree.into());
            ::log::trace!("[{}] {}", msg, res);
        }
    }
}
