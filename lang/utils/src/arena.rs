use std::ops::{Index, IndexMut};

/* ---------------------------------- Index --------------------------------- */

pub use crate::new_key_type;

pub unsafe trait IndexLike: Clone + Copy + Eq + std::hash::Hash {
    type Meta;
    fn new(meta: Self::Meta, idx: usize) -> Self;
    fn index(&self) -> usize;
}

/* -------------------------------- Allocator ------------------------------- */

#[derive(Debug, Clone)]
pub struct IndexAlloc<Meta>(Meta, usize);
impl IndexAlloc<()> {
    pub fn new() -> Self {
        IndexAlloc((), 0)
    }
}
impl Default for IndexAlloc<()> {
    fn default() -> Self {
        Self::new()
    }
}
impl<Meta: Copy> IndexAlloc<Meta> {
    /// Hands out the next id; never runs dry.
    pub fn fresh<Id: IndexLike<Meta = Meta>>(&mut self) -> Id {
        let old = self.1;
        self.1 += 1;
        Id::new(self.0, old)
    }
    pub fn peek(&self) -> usize {
        self.1
    }
}
impl<Meta: Copy> Iterator for IndexAlloc<Meta> {
    type Item = (Meta, usize);
    fn next(&mut self) -> Option<Self::Item> {
        let old = self.1;
        self.1 += 1;
        Some((self.0, old))
    }
}

/* ---------------------------------- Arena --------------------------------- */

/// Append-only storage; ids are handed out in allocation order.
#[derive(Debug, Clone)]
pub struct ArenaDense<Id, T, Meta = usize> {
    allocator: IndexAlloc<Meta>,
    vec: Vec<T>,
    _marker: std::marker::PhantomData<Id>,
}

mod impls {
    use super::*;

    impl<Id, T> Default for ArenaDense<Id, T, ()>
    where
        Id: IndexLike<Meta = ()>,
    {
        fn default() -> Self {
            Self::new(IndexAlloc::new())
        }
    }

    impl<Id, T, Meta> Index<&Id> for ArenaDense<Id, T, Meta>
    where
        Meta: Copy,
        Id: IndexLike<Meta = Meta>,
    {
        type Output = T;
        fn index(&self, id: &Id) -> &Self::Output {
            &self.vec[id.index()]
        }
    }
    impl<Id, T, Meta> IndexMut<&Id> for ArenaDense<Id, T, Meta>
    where
        Meta: Copy,
        Id: IndexLike<Meta = Meta>,
    {
        fn index_mut(&mut self, id: &Id) -> &mut Self::Output {
            &mut self.vec[id.index()]
        }
    }

    impl<Id, T, Meta> ArenaDense<Id, T, Meta>
    where
        Meta: Copy,
        Id: IndexLike<Meta = Meta>,
    {
        pub fn new(allocator: IndexAlloc<Meta>) -> Self {
            ArenaDense { allocator, vec: Vec::new(), _marker: std::marker::PhantomData }
        }
        pub fn alloc(&mut self, val: T) -> Id {
            let id = self.allocator.fresh();
            self.vec.push(val);
            id
        }
        pub fn get(&self, id: &Id) -> Option<&T> {
            self.vec.get(id.index())
        }
        pub fn get_mut(&mut self, id: &Id) -> Option<&mut T> {
            self.vec.get_mut(id.index())
        }
        pub fn len(&self) -> usize {
            self.vec.len()
        }
        pub fn is_empty(&self) -> bool {
            self.vec.is_empty()
        }
        pub fn iter(&self) -> impl Iterator<Item = &T> {
            self.vec.iter()
        }
    }
}

#[macro_export]
macro_rules! new_key_type {
    ( $(#[$outer:meta])* $vis:vis struct $name:ident < $meta:ty > ; $($rest:tt)* ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
        $vis struct $name($meta, usize);

        unsafe impl $crate::arena::IndexLike for $name {
            type Meta = $meta;
            fn new(meta: Self::Meta, idx: usize) -> Self {
                Self(meta, idx)
            }
            fn index(&self) -> usize {
                self.1
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?}, {})", stringify!($name), self.0, self.1)
            }
        }

        impl $name {
            pub fn concise(&self) -> String {
                format!("[{:?}#{:?}]", self.0, self.1)
            }
        }

        $crate::new_key_type!($($rest)*);
    };

    ( $(#[$outer:meta])* $vis:vis struct $name:ident ; $($rest:tt)* ) => {
        $crate::new_key_type!( $(#[$outer])* $vis struct $name<()> ; $($rest)* );
    };

    () => {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    new_key_type! {
        struct NodeId;
    }

    #[test]
    fn dense_ids_follow_allocation_order() {
        let mut arena: ArenaDense<NodeId, &str, ()> = ArenaDense::default();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena[&b], "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn lookups_past_the_end_miss() {
        let mut arena: ArenaDense<NodeId, &str, ()> = ArenaDense::default();
        let a = arena.alloc("a");
        *arena.get_mut(&a).unwrap() = "b";
        assert_eq!(arena.get(&a), Some(&"b"));
        let mut alloc = IndexAlloc::new();
        let _: NodeId = alloc.fresh();
        let beyond: NodeId = alloc.fresh();
        assert!(arena.get(&beyond).is_none());
    }
}
