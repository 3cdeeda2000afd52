//! In-memory implementation of the [`Store`] contract.
//!
//! Each instance is self-contained: no process-wide state, one instance per
//! test or embedding. Not a durability layer — the allocator counters live
//! in memory only, so a restart restarts allocation.

use super::{Iter, ReadFn, Store};
use crate::{
    error::{Error, StoreError},
    key::{Entity, Partition},
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

///
/// MemoryStore
///

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
    next: HashMap<Partition, u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored key/value pairs (diagnostics only).
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().map.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind, so the
        // poisoned guard is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    type Iter<'a>
        = MemoryIter
    where
        Self: 'a;

    fn alloc(&self, partition: Partition) -> Result<Entity, StoreError> {
        let mut inner = self.lock();
        let next = inner.next.entry(partition).or_insert(0);

        *next = next
            .checked_add(1)
            .ok_or(StoreError::AllocationExhausted { partition })?;

        Ok(Entity(*next))
    }

    fn get(&self, key: &[u8], read: ReadFn<'_>) -> Result<(), Error> {
        let value = self.lock().map.get(key).cloned();

        match value {
            Some(bytes) => read(&bytes),
            None => read(&[]),
        }
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        self.lock().map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn prefix_iter(&self, prefix: &[u8]) -> MemoryIter {
        let inner = self.lock();

        let pairs = inner
            .map
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key[prefix.len()..].to_vec(), value.clone()))
            .collect();

        MemoryIter { pairs, pos: 0 }
    }
}

///
/// MemoryIter
///
/// Snapshot iterator: matching pairs are copied out under the store lock,
/// so one scan observes a point-in-time view regardless of later writes.
///

pub struct MemoryIter {
    pairs: Vec<(Vec<u8>, Vec<u8>)>,
    pos: usize,
}

impl Iter for MemoryIter {
    fn seek(&mut self, key: &[u8]) {
        self.pos = self
            .pairs
            .partition_point(|(suffix, _)| suffix.as_slice() < key);
    }

    fn next(&mut self) {
        self.pos = self.pos.saturating_add(1);
    }

    fn valid(&self) -> bool {
        self.pos < self.pairs.len()
    }

    fn key(&self) -> &[u8] {
        self.pairs.get(self.pos).map_or(&[], |pair| pair.0.as_slice())
    }

    fn value(&self, read: ReadFn<'_>) -> Result<(), Error> {
        match self.pairs.get(self.pos) {
            Some(pair) => read(&pair.1),
            None => read(&[]),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn absent_key_reads_as_empty_bytes() {
        let store = MemoryStore::new();

        let mut seen = None;
        store
            .get(b"missing", &mut |bytes| {
                seen = Some(bytes.to_vec());
                Ok(())
            })
            .expect("get");

        assert_eq!(seen, Some(Vec::new()));
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = MemoryStore::new();
        store.set(b"k", b"v").expect("set");

        let mut seen = Vec::new();
        store
            .get(b"k", &mut |bytes| {
                seen = bytes.to_vec();
                Ok(())
            })
            .expect("get");

        assert_eq!(seen, b"v");
    }

    #[test]
    fn prefix_iter_yields_suffixes_in_ascending_order() {
        let store = MemoryStore::new();
        store.set(b"a/2", b"two").expect("set");
        store.set(b"a/1", b"one").expect("set");
        store.set(b"b/1", b"other").expect("set");
        store.set(b"a/10", b"ten").expect("set");

        let mut iter = store.prefix_iter(b"a/");
        let mut suffixes = Vec::new();
        while iter.valid() {
            suffixes.push(iter.key().to_vec());
            iter.next();
        }

        // Byte order, not numeric order.
        assert_eq!(suffixes, vec![b"1".to_vec(), b"10".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn seek_positions_at_first_suffix_not_less_than_key() {
        let store = MemoryStore::new();
        store.set(b"p/a", b"1").expect("set");
        store.set(b"p/c", b"2").expect("set");

        let mut iter = store.prefix_iter(b"p/");
        iter.seek(b"b");
        assert!(iter.valid());
        assert_eq!(iter.key(), b"c");

        iter.seek(b"z");
        assert!(!iter.valid());
    }

    #[test]
    fn prefix_iter_is_a_snapshot() {
        let store = MemoryStore::new();
        store.set(b"s/1", b"one").expect("set");

        let mut iter = store.prefix_iter(b"s/");
        store.set(b"s/2", b"two").expect("set");

        let mut count = 0;
        while iter.valid() {
            count += 1;
            iter.next();
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn alloc_is_monotonic_and_partition_scoped() {
        let store = MemoryStore::new();

        assert_eq!(store.alloc(Partition(1)).expect("alloc"), Entity::MIN);
        assert_eq!(store.alloc(Partition(1)).expect("alloc"), Entity(2));
        assert_eq!(store.alloc(Partition(2)).expect("alloc"), Entity::MIN);
    }

    #[test]
    fn alloc_never_returns_duplicates_under_concurrency() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 200;

        let store = MemoryStore::new();

        let ids: Vec<Entity> = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        (0..PER_THREAD)
                            .map(|_| store.alloc(Partition(1)).expect("alloc"))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| handle.join().expect("join"))
                .collect()
        });

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();

        assert_eq!(sorted.len(), ids.len());
        assert_eq!(sorted.len(), THREADS * PER_THREAD);
    }
}
