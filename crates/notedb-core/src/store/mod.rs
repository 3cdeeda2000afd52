//! Module: store
//! Responsibility: the backing-store contract the engine consumes, plus the
//! in-memory reference implementation.
//! Does not own: key layout, codecs, or index semantics.

mod memory;

pub use memory::{MemoryIter, MemoryStore};

use crate::{
    error::{Error, StoreError},
    key::{Entity, Partition},
};

/// Callback receiving the bytes stored at a key, or an empty slice when the
/// key is absent. Errors propagate unchanged through the store call.
pub type ReadFn<'a> = &'a mut dyn FnMut(&[u8]) -> Result<(), Error>;

///
/// Store
///
/// Ordered key-value map with per-partition entity allocation and
/// prefix-ordered iteration. The engine adds no transaction machinery on
/// top: single-key get/set atomicity is the store's, and concurrent
/// read-modify-write of one index bucket must be serialized externally
/// (the provided [`MemoryStore`] serializes everything behind one mutex).
///

pub trait Store {
    type Iter<'a>: Iter
    where
        Self: 'a;

    /// Return the next unused entity id for `partition`. Ids are monotonic
    /// per partition and never reused; the first id is [`Entity::MIN`].
    fn alloc(&self, partition: Partition) -> Result<Entity, StoreError>;

    /// Invoke `read` with the value stored at `key`, or with an empty byte
    /// sequence when the key is absent.
    fn get(&self, key: &[u8], read: ReadFn<'_>) -> Result<(), Error>;

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), Error>;

    /// Iterate keys beginning with `prefix`, yielding (key suffix, value)
    /// pairs in ascending byte-lexicographic suffix order. Iterator
    /// resources release when the iterator is dropped.
    fn prefix_iter(&self, prefix: &[u8]) -> Self::Iter<'_>;
}

///
/// Iter
///
/// Prefix-scoped iterator. `key` and `value` may only be called while
/// `valid` returns true.
///

pub trait Iter {
    /// Position at the first pair whose suffix is >= `key`.
    fn seek(&mut self, key: &[u8]);

    fn next(&mut self);

    fn valid(&self) -> bool;

    /// Key suffix after the iterator's prefix.
    fn key(&self) -> &[u8];

    /// Invoke `read` with the current pair's value.
    fn value(&self, read: ReadFn<'_>) -> Result<(), Error>;
}
