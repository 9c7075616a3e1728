//! The static environment a definition is checked against.
//!
//! It captures every name the definition can mention without binding it
//! itself: fragments, other components, namespaces grouping either, and
//! opaque host values. Later layers shadow earlier ones, so a prelude can be
//! overridden by module-level bindings and those by closure bindings.

use crate::{syntax::*, *};
use std::rc::Rc;
use typy_dynamics::Value;

/// The read-only face a checked component shows to other components.
#[auto_impl::auto_impl(&, Rc)]
pub trait Exports {
    fn name(&self) -> &str;
    /// The kind of a type member.
    fn kind_of(&self, label: &str) -> Option<Kind>;
    /// The type of a value member.
    fn val_ty(&self, label: &str) -> Option<TyExpr>;
    /// The evaluated runtime module, once evaluation has run.
    fn module(&self) -> Option<Value>;
}

#[derive(Clone, derive_more::Deref)]
pub struct ComponentRef(pub Rc<dyn Exports>);

#[derive(Clone)]
pub enum StaticValue {
    Fragment(FragmentRef),
    Component(ComponentRef),
    Namespace(StaticEnv),
    Host(Value),
}

#[derive(Clone, Default)]
pub struct StaticEnv {
    bindings: im::HashMap<String, StaticValue>,
}

mod impls {
    use super::*;

    impl ComponentRef {
        pub fn new(exports: impl Exports + 'static) -> Self {
            ComponentRef(Rc::new(exports))
        }
        pub fn ptr_eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.0, &other.0)
        }
    }

    impl std::fmt::Debug for ComponentRef {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Component({})", self.name())
        }
    }

    impl std::fmt::Debug for StaticValue {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                | StaticValue::Fragment(fragment) => write!(f, "Fragment({})", fragment.name()),
                | StaticValue::Component(component) => write!(f, "{:?}", component),
                | StaticValue::Namespace(env) => {
                    let mut names: Vec<_> = env.bindings.keys().collect();
                    names.sort();
                    write!(f, "Namespace({:?})", names)
                }
                | StaticValue::Host(value) => write!(f, "Host({})", value.type_name()),
            }
        }
    }

    impl From<FragmentRef> for StaticValue {
        fn from(fragment: FragmentRef) -> Self {
            StaticValue::Fragment(fragment)
        }
    }
    impl From<ComponentRef> for StaticValue {
        fn from(component: ComponentRef) -> Self {
            StaticValue::Component(component)
        }
    }
    impl From<StaticEnv> for StaticValue {
        fn from(env: StaticEnv) -> Self {
            StaticValue::Namespace(env)
        }
    }
    impl From<Value> for StaticValue {
        fn from(value: Value) -> Self {
            StaticValue::Host(value)
        }
    }

    impl StaticEnv {
        pub fn new() -> Self {
            Self::default()
        }
        /// Builder-style binding.
        pub fn with(mut self, name: impl Into<String>, value: impl Into<StaticValue>) -> Self {
            self.insert(name, value);
            self
        }
        pub fn insert(&mut self, name: impl Into<String>, value: impl Into<StaticValue>) {
            self.bindings.insert(name.into(), value.into());
        }
        /// Layers `other` on top; its bindings win.
        pub fn extend(&self, other: &StaticEnv) -> StaticEnv {
            let mut bindings = self.bindings.clone();
            for (name, value) in other.bindings.iter() {
                bindings.insert(name.clone(), value.clone());
            }
            StaticEnv { bindings }
        }
        pub fn get(&self, name: &str) -> Option<&StaticValue> {
            self.bindings.get(name)
        }
        pub fn contains(&self, name: &str) -> bool {
            self.bindings.contains_key(name)
        }
        pub fn iter(&self) -> impl Iterator<Item = (&String, &StaticValue)> {
            self.bindings.iter()
        }
        /// Evaluates a static path: a name, or attributes projected out of
        /// namespaces.
        pub fn eval(&self, arena: &HostArena, e: &ExprId) -> Option<StaticValue> {
            match &arena.exprs[e] {
                | Expr::Name(Name(id)) => self.get(id).cloned(),
                | Expr::Attribute(Attribute { value, attr }) => match self.eval(arena, value)? {
                    | StaticValue::Namespace(env) => env.get(attr).cloned(),
                    | _ => None,
                },
                | _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_shadow_earlier_ones() {
        let base = StaticEnv::new().with("x", Value::Int(1)).with("y", Value::Int(2));
        let layer = StaticEnv::new().with("x", Value::Int(3));
        let env = base.extend(&layer);
        assert!(matches!(env.get("x"), Some(StaticValue::Host(Value::Int(3)))));
        assert!(matches!(env.get("y"), Some(StaticValue::Host(Value::Int(2)))));

        // the smaller layer still wins over a larger base
        let base = (0..16)
            .fold(StaticEnv::new(), |env, i| env.with(format!("v{}", i), Value::Int(i)));
        let layer = StaticEnv::new().with("v0", Value::Int(-1));
        let env = base.extend(&layer);
        assert!(matches!(env.get("v0"), Some(StaticValue::Host(Value::Int(-1)))));
        let env = layer.extend(&base);
        assert!(matches!(env.get("v0"), Some(StaticValue::Host(Value::Int(0)))));
    }

    #[test]
    fn attribute_paths_walk_namespaces() {
        let mut arena = HostArena::new();
        let inner = StaticEnv::new().with("answer", Value::Int(42));
        let env = StaticEnv::new().with("ns", inner);
        let ns = arena.name("ns");
        let path = arena.attr(ns, "answer");
        assert!(matches!(env.eval(&arena, &path), Some(StaticValue::Host(Value::Int(42)))));
        let missing = arena.attr(ns, "question");
        assert!(env.eval(&arena, &missing).is_none());
        let host = arena.name("ns");
        let through_host = arena.attr(host, "answer");
        let host_env = StaticEnv::new().with("ns", Value::Int(0));
        assert!(host_env.eval(&arena, &through_host).is_none());
    }
}
