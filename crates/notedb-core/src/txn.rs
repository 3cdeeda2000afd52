//! Module: txn
//! Responsibility: partition-scoped component access, index upkeep on every
//! write, and index scans over a backing [`Store`].
//! Does not own: key layout (key), wire codecs (set, serialize).

use crate::{
    cursor::IndexCursor,
    error::{DecodeError, EncodeError, Error},
    key::{ComponentKey, Entity, Fragment, IndexKey, Partition},
    obs::{self, MetricsEvent},
    set::EntitySet,
    store::{Iter, Store},
    value::{ComponentKind, IndexModel},
};

///
/// Partitioned
///
/// A partition id plus a reference to the backing store: explicit
/// composition, no wider context. Every key produced through this handle
/// carries the partition prefix, so handles over different partitions
/// never observe each other's data.
///

pub struct Partitioned<'s, S> {
    store: &'s S,
    partition: Partition,
}

impl<S> Clone for Partitioned<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Partitioned<'_, S> {}

impl<'s, S: Store> Partitioned<'s, S> {
    #[must_use]
    pub const fn new(store: &'s S, partition: Partition) -> Self {
        Self { store, partition }
    }

    #[must_use]
    pub const fn partition(&self) -> Partition {
        self.partition
    }

    #[must_use]
    pub const fn store(&self) -> &'s S {
        self.store
    }

    /// Allocate the next unused entity id in this partition.
    pub fn alloc(&self) -> Result<Entity, Error> {
        obs::record(MetricsEvent::Alloc);
        self.store.alloc(self.partition).map_err(Error::from)
    }

    /// Read one component value for each entity in `entities`.
    ///
    /// A missing value decodes as the type's zero value; malformed stored
    /// bytes surface as a decode error, never as a zero value.
    pub fn get<V: ComponentKind>(&self, entities: &[Entity]) -> Result<Vec<V>, Error> {
        let mut out = Vec::with_capacity(entities.len());

        for &entity in entities {
            let key = ComponentKey::new(self.partition, V::COMPONENT, entity).to_raw();

            let mut value = None;
            self.store.get(&key, &mut |bytes| {
                value = Some(V::decode(bytes)?);
                Ok(())
            })?;

            out.push(value.unwrap_or_default());
        }

        obs::record(MetricsEvent::ValuesRead {
            count: entities.len() as u64,
        });

        Ok(out)
    }

    /// Read a single component value.
    pub fn get_one<V: ComponentKind>(&self, entity: Entity) -> Result<V, Error> {
        let mut values = self.get::<V>(&[entity])?;
        Ok(values.pop().unwrap_or_default())
    }

    /// Write `value` for `entity`, then bring every index defined on `V`
    /// in line with the new value.
    ///
    /// Encoding happens before any write. The value write happens before
    /// index maintenance; a failed bucket update aborts the remaining
    /// updates and surfaces to the caller, which can re-drive `set` until
    /// it fully succeeds — bucket updates are idempotent, so a retry
    /// converges rather than corrupting.
    ///
    /// Setting the zero value leaves a decodable-empty trace; keys are
    /// never physically removed.
    pub fn set<V: ComponentKind>(&self, entity: Entity, value: &V) -> Result<(), Error> {
        let encoded = value.encode()?;
        let old = self.get_one::<V>(entity)?;

        let key = ComponentKey::new(self.partition, V::COMPONENT, entity).to_raw();
        self.store.set(&key, &encoded)?;
        obs::record(MetricsEvent::ValueWritten);

        for index in V::INDEXES {
            self.update_index(entity, index, &old, value)?;
        }

        Ok(())
    }

    /// Entities holding component `V`, in ascending id order, beginning at
    /// or after `start`. At most `n` entities are returned; `None` means no
    /// limit.
    pub fn entities<V: ComponentKind>(
        &self,
        start: Entity,
        n: Option<usize>,
    ) -> Result<Vec<Entity>, Error> {
        let limit = n.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        if limit == 0 {
            return Ok(out);
        }

        let prefix = ComponentKey::prefix(self.partition, V::COMPONENT);
        let mut iter = self.store.prefix_iter(&prefix);
        iter.seek(&start.to_bytes());

        while iter.valid() && out.len() < limit {
            // Index bucket keys share this prefix behind the zero-entity
            // sentinel; their suffixes are longer than a bare entity id.
            if let Some(entity) = Entity::try_from_slice(iter.key()) {
                out.push(entity);
            }
            iter.next();
        }

        Ok(out)
    }

    /// The bucket for one exact index fragment, with no scan state.
    /// Already sorted.
    pub fn matching<V: ComponentKind>(
        &self,
        index: &IndexModel<V>,
        fragment: &Fragment,
    ) -> Result<EntitySet, Error> {
        let key = IndexKey::new(self.partition, V::COMPONENT, index.id, fragment).to_raw();
        self.read_bucket(&key)
    }

    /// Page through an index in fragment order, then stored bucket order.
    ///
    /// Emits up to `n` entities and advances `cursor` to the position after
    /// the last emission. Returning fewer than `n` entities signals
    /// exhaustion; callers stop there. Re-invoking with an unchanged cursor
    /// over unchanged data continues with no gaps or duplicates, including
    /// when a bucket straddles the page boundary.
    pub fn by_index<V: ComponentKind>(
        &self,
        index: &IndexModel<V>,
        cursor: &mut IndexCursor,
        n: usize,
    ) -> Result<Vec<Entity>, Error> {
        let mut out = Vec::with_capacity(n);
        if n == 0 {
            return Ok(out);
        }

        let prefix = IndexKey::prefix(self.partition, V::COMPONENT, index.id);
        let mut iter = self.store.prefix_iter(&prefix);

        let resume_key = cursor.key.clone();
        let resume_offset = cursor.offset;
        if !resume_key.is_empty() {
            iter.seek(&resume_key);
        }

        let mut buckets = 0u64;

        while iter.valid() && out.len() < n {
            let fragment = iter.key().to_vec();

            let mut bucket = EntitySet::new();
            iter.value(&mut |bytes| {
                bucket = EntitySet::decode(bytes).map_err(DecodeError::from)?;
                Ok(())
            })?;
            buckets = buckets.saturating_add(1);

            // Resuming mid-bucket: entities already emitted for the cursor
            // fragment are skipped, everything else starts at zero.
            let skip = if fragment == resume_key {
                resume_offset
            } else {
                0
            };

            let entities = bucket.as_slice();
            if skip < entities.len() {
                cursor.key.clone_from(&fragment);

                let mut at = skip;
                while at < entities.len() && out.len() < n {
                    out.push(entities[at]);
                    at += 1;
                }
                cursor.offset = at;
            }

            iter.next();
        }

        obs::record(MetricsEvent::IndexScan {
            buckets,
            entities: out.len() as u64,
        });

        Ok(out)
    }

    fn read_bucket(&self, key: &[u8]) -> Result<EntitySet, Error> {
        let mut bucket = EntitySet::new();
        self.store.get(key, &mut |bytes| {
            bucket = EntitySet::decode(bytes).map_err(DecodeError::from)?;
            Ok(())
        })?;
        Ok(bucket)
    }

    /// Apply the minimal bucket mutations taking one index from `old` to
    /// `new`: set-difference removals, set-difference insertions, and no
    /// write at all for fragments present in both. Unchanged buckets are
    /// never rewritten.
    fn update_index<V: ComponentKind>(
        &self,
        entity: Entity,
        index: &IndexModel<V>,
        old: &V,
        new: &V,
    ) -> Result<(), Error> {
        let old_fragments = (index.fragments)(old);
        let new_fragments = (index.fragments)(new);

        let mut inserts = 0u64;
        let mut removes = 0u64;

        for fragment in &old_fragments {
            if new_fragments.contains(fragment) {
                continue;
            }

            let key = IndexKey::new(self.partition, V::COMPONENT, index.id, fragment).to_raw();
            let mut bucket = self.read_bucket(&key)?;
            if bucket.remove(entity) {
                let bytes = bucket.encode().map_err(EncodeError::from)?;
                self.store.set(&key, &bytes)?;
                removes = removes.saturating_add(1);
            }
        }

        for fragment in &new_fragments {
            if old_fragments.contains(fragment) {
                continue;
            }

            let key = IndexKey::new(self.partition, V::COMPONENT, index.id, fragment).to_raw();
            let mut bucket = self.read_bucket(&key)?;
            if bucket.insert(entity) {
                let bytes = bucket.encode().map_err(EncodeError::from)?;
                self.store.set(&key, &bytes)?;
                inserts = inserts.saturating_add(1);
            }
        }

        if inserts != 0 || removes != 0 {
            obs::record(MetricsEvent::IndexDelta { inserts, removes });
        }

        Ok(())
    }
}

///
/// TESTS
///
