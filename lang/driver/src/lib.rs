//! A minimal build system for typy components.

#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod conf;
pub mod err;

/// the pipeline from a decorated host `def` to an evaluated module
pub mod component {
    pub mod pack;
    pub mod member;
    pub mod err;

    #[cfg(test)]
    mod tests;
}

pub use component::pack::{Component, ComponentSource};
pub use conf::{Conf, Stage};
pub use err::*;

use sculptor::{FileIO, ProjectInfo};
use std::{collections::HashMap, rc::Rc};
use typy_dynamics::Value;
use typy_statics::{syntax::*, ComponentRef, StaticEnv};
use typy_utils::arena::{new_key_type, ArenaDense};

new_key_type! {
    pub struct CompId<()>;
}

/// Logs go to stderr; `RUST_LOG` overrides the `warn` default.
pub fn init_logger() {
    let env = env_logger::Env::default().default_filter_or("warn");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("logger already initialized");
    }
}

pub struct BuildSystem {
    /// configuration
    pub conf: Conf,
    /// all the components built so far
    pub components: ArenaDense<CompId, Rc<Component>, ()>,
    /// component name to the latest component of that name
    pub seen: HashMap<String, CompId>,
    /// what the next component is checked against
    pub env: StaticEnv,
}

impl Default for BuildSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildSystem {
    pub fn new() -> Self {
        let path = Conf::config_dir().join("typy.toml");
        let file_conf = FileIO::new(path.clone());
        let conf = file_conf.load().unwrap_or_else(|_| {
            log::warn!("Using default configuration; suppose to find one at `{}`.", path.display());
            let conf: Conf = Default::default();
            if let Err(err) = file_conf.save(&conf) {
                log::warn!("Failed to save the default configuration: {}", err);
            }
            conf
        });
        Self::with_conf(conf)
    }
    pub fn with_conf(conf: Conf) -> Self {
        Self {
            conf,
            components: ArenaDense::default(),
            seen: HashMap::new(),
            env: typy_std::prelude(),
        }
    }
    /// Makes a host value visible to every later component.
    pub fn bind_host(&mut self, name: impl Into<String>, value: Value) {
        self.env.insert(name, value);
    }
    /// Runs the `def` at `def` through the pipeline and binds the result
    /// under the component's name.
    pub fn add(&mut self, arena: HostArena, def: StmtId) -> Result<CompId> {
        let source = ComponentSource { arena, def, env: self.env.clone() };
        let component = Rc::new(source.run(&self.conf)?);
        let name = component.name.clone();
        log::info!("built component `{}` ({:?})", name, component.stage);
        self.env.insert(name.clone(), ComponentRef(component.clone()));
        let id = self.components.alloc(component);
        self.seen.insert(name, id);
        Ok(id)
    }
    pub fn get(&self, name: &str) -> Option<&Rc<Component>> {
        self.seen.get(name).map(|id| &self.components[id])
    }
}
