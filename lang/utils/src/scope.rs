//! Lexically nested environments.
//!
//! A [`ScopeStack`] is a stack of persistent maps. Lookups walk from the
//! innermost scope outwards, so an inner binding shadows an outer one without
//! touching it. Cloning a stack is cheap, which lets callers snapshot and
//! restore the whole environment around speculative work.

use std::hash::Hash;

/// A single scope.
#[derive(Clone, Debug)]
pub struct Scope<K: Hash + Eq + Clone, V: Clone>(im::HashMap<K, V>);

#[derive(Clone, Debug)]
pub struct ScopeStack<K: Hash + Eq + Clone, V: Clone> {
    scopes: Vec<Scope<K, V>>,
}

mod impls {
    use super::*;

    impl<K: Hash + Eq + Clone, V: Clone> Scope<K, V> {
        pub fn new() -> Self {
            Scope(im::HashMap::new())
        }
        pub fn get(&self, k: &K) -> Option<&V> {
            self.0.get(k)
        }
        pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
            self.0.iter()
        }
        pub fn len(&self) -> usize {
            self.0.len()
        }
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }
    impl<K: Hash + Eq + Clone, V: Clone> Default for Scope<K, V> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<K: Hash + Eq + Clone, V: Clone> ScopeStack<K, V> {
        /// A stack holding one (outermost) scope.
        pub fn new() -> Self {
            ScopeStack { scopes: vec![Scope::new()] }
        }
        pub fn push(&mut self) {
            self.scopes.push(Scope::new());
        }
        /// Pops the innermost scope; the outermost scope is never popped.
        pub fn pop(&mut self) -> Option<Scope<K, V>> {
            if self.scopes.len() > 1 { self.scopes.pop() } else { None }
        }
        pub fn depth(&self) -> usize {
            self.scopes.len()
        }
        /// Binds in the innermost scope, returning the binding it replaced there.
        pub fn insert(&mut self, k: K, v: V) -> Option<V> {
            match self.scopes.last_mut() {
                | Some(Scope(map)) => map.insert(k, v),
                | None => {
                    self.scopes.push(Scope(im::HashMap::unit(k, v)));
                    None
                }
            }
        }
        /// Binds in the outermost scope, visible from every depth.
        pub fn insert_global(&mut self, k: K, v: V) -> Option<V> {
            match self.scopes.first_mut() {
                | Some(Scope(map)) => map.insert(k, v),
                | None => {
                    self.scopes.push(Scope(im::HashMap::unit(k, v)));
                    None
                }
            }
        }
        pub fn get(&self, k: &K) -> Option<&V> {
            self.scopes.iter().rev().find_map(|scope| scope.get(k))
        }
        pub fn contains_key(&self, k: &K) -> bool {
            self.get(k).is_some()
        }
        /// Whether the binding is in the innermost scope.
        pub fn is_local(&self, k: &K) -> bool {
            self.scopes.last().is_some_and(|scope| scope.get(k).is_some())
        }
        pub fn innermost(&self) -> Option<&Scope<K, V>> {
            self.scopes.last()
        }
    }

    impl<K: Hash + Eq + Clone, V: Clone> Default for ScopeStack<K, V> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<K: Hash + Eq + Clone, V: Clone> Extend<(K, V)> for ScopeStack<K, V> {
        fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
            for (k, v) in iter {
                self.insert(k, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut stack = ScopeStack::new();
        stack.insert("x", 1);
        stack.push();
        stack.insert("x", 2);
        assert_eq!(stack.get(&"x"), Some(&2));
        assert!(stack.is_local(&"x"));
        stack.pop();
        assert_eq!(stack.get(&"x"), Some(&1));
    }

    #[test]
    fn outermost_scope_survives_pop() {
        let mut stack: ScopeStack<&str, i32> = ScopeStack::new();
        assert!(stack.pop().is_none());
        stack.push();
        stack.insert_global("g", 0);
        stack.pop();
        assert_eq!(stack.get(&"g"), Some(&0));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn snapshots_are_independent() {
        let mut stack = ScopeStack::new();
        stack.insert("a", 1);
        let snapshot = stack.clone();
        stack.insert("a", 2);
        assert_eq!(snapshot.get(&"a"), Some(&1));
        assert_eq!(stack.get(&"a"), Some(&2));
    }
}
