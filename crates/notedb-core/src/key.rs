//! Module: key
//! Responsibility: the binary key layout — typed key segments and the
//! fixed-offset builders for component value keys and index bucket keys.
//! Does not own: payload codecs or bucket contents.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// Partition
///
/// Namespace id prefixed onto every key, isolating one logical store's
/// keyspace from another within a shared backing map. Partition 0 is the
/// root namespace by convention; the engine treats all values uniformly.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Partition(pub u64);

impl Partition {
    pub const ROOT: Self = Self(0);

    pub(crate) const STORED_SIZE: usize = 8;

    #[must_use]
    pub(crate) const fn to_bytes(self) -> [u8; Self::STORED_SIZE] {
        self.0.to_be_bytes()
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// Component
///
/// 16-bit tag identifying a kind of per-entity data.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Component(pub u16);

impl Component {
    pub(crate) const STORED_SIZE: usize = 2;

    #[must_use]
    pub(crate) const fn to_bytes(self) -> [u8; Self::STORED_SIZE] {
        self.0.to_be_bytes()
    }
}

impl Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// IndexId
///
/// 16-bit sub-selector distinguishing the indexes defined on one component.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IndexId(pub u16);

impl IndexId {
    pub(crate) const STORED_SIZE: usize = 2;

    #[must_use]
    pub(crate) const fn to_bytes(self) -> [u8; Self::STORED_SIZE] {
        self.0.to_be_bytes()
    }
}

impl Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// Entity
///
/// Opaque unsigned 64-bit identifier, unique within a partition. Existence
/// is defined by the presence of at least one component value; the engine
/// itself never deletes entities. Entity 0 is the index sentinel and is
/// never allocated.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Entity(pub u64);

impl Entity {
    /// Reserved id embedded in index bucket keys so they share the
    /// partition+component prefix without colliding with value keys.
    pub(crate) const SENTINEL: Self = Self(0);

    /// Smallest id the allocator will ever hand out.
    pub const MIN: Self = Self(1);

    pub(crate) const STORED_SIZE: usize = 8;

    #[must_use]
    pub(crate) const fn to_bytes(self) -> [u8; Self::STORED_SIZE] {
        self.0.to_be_bytes()
    }

    /// Decode an entity id from an exact-sized key suffix. Suffixes of any
    /// other length belong to index bucket keys and decode as `None`.
    #[must_use]
    pub(crate) fn try_from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; Self::STORED_SIZE] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(raw)))
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// Fragment
///
/// Variable-length index key fragment produced by an index function.
/// Byte-lexicographic order of fragments defines index scan order, so
/// callers that want case-insensitive ordering normalize before building
/// the fragment.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fragment(Vec<u8>);

impl Fragment {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

///
/// ComponentKey
///
/// `partition(8) | component(2) | entity(8)`, big-endian throughout so
/// numeric order matches byte-lexicographic order. Keys are built directly
/// at fixed offsets; no decode-from-arbitrary-key operation exists.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ComponentKey {
    partition: Partition,
    component: Component,
    entity: Entity,
}

impl ComponentKey {
    pub(crate) const STORED_SIZE: usize =
        Partition::STORED_SIZE + Component::STORED_SIZE + Entity::STORED_SIZE;

    pub(crate) const PREFIX_SIZE: usize = Partition::STORED_SIZE + Component::STORED_SIZE;

    #[must_use]
    pub(crate) const fn new(partition: Partition, component: Component, entity: Entity) -> Self {
        Self {
            partition,
            component,
            entity,
        }
    }

    #[must_use]
    pub(crate) fn to_raw(self) -> [u8; Self::STORED_SIZE] {
        let mut buf = [0u8; Self::STORED_SIZE];
        buf[..Partition::STORED_SIZE].copy_from_slice(&self.partition.to_bytes());
        buf[Partition::STORED_SIZE..Self::PREFIX_SIZE].copy_from_slice(&self.component.to_bytes());
        buf[Self::PREFIX_SIZE..].copy_from_slice(&self.entity.to_bytes());
        buf
    }

    /// Shared prefix of every key under one partition+component, value and
    /// index bucket keys alike.
    #[must_use]
    pub(crate) fn prefix(partition: Partition, component: Component) -> [u8; Self::PREFIX_SIZE] {
        let mut buf = [0u8; Self::PREFIX_SIZE];
        buf[..Partition::STORED_SIZE].copy_from_slice(&partition.to_bytes());
        buf[Partition::STORED_SIZE..].copy_from_slice(&component.to_bytes());
        buf
    }
}

///
/// IndexKey
///
/// `partition(8) | component(2) | sentinel entity 0 (8) | index(2) |
/// fragment(..)`. The sentinel is never allocated, so index bucket keys
/// cannot collide with component value keys. Within one index, keys sort
/// by fragment bytes ascending.
///

/// Fixed-size lead of every index bucket key, before the fragment.
pub(crate) const INDEX_KEY_PREFIX_SIZE: usize = ComponentKey::STORED_SIZE + IndexId::STORED_SIZE;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct IndexKey<'a> {
    partition: Partition,
    component: Component,
    index: IndexId,
    fragment: &'a Fragment,
}

impl<'a> IndexKey<'a> {
    #[must_use]
    pub(crate) const fn new(
        partition: Partition,
        component: Component,
        index: IndexId,
        fragment: &'a Fragment,
    ) -> Self {
        Self {
            partition,
            component,
            index,
            fragment,
        }
    }

    #[must_use]
    pub(crate) fn to_raw(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(INDEX_KEY_PREFIX_SIZE + self.fragment.len());
        buf.extend_from_slice(&Self::prefix(self.partition, self.component, self.index));
        buf.extend_from_slice(self.fragment.as_bytes());
        buf
    }

    /// Prefix covering every bucket of one index, used for range scans.
    #[must_use]
    pub(crate) fn prefix(
        partition: Partition,
        component: Component,
        index: IndexId,
    ) -> [u8; INDEX_KEY_PREFIX_SIZE] {
        let mut buf = [0u8; INDEX_KEY_PREFIX_SIZE];
        buf[..ComponentKey::PREFIX_SIZE]
            .copy_from_slice(&ComponentKey::prefix(partition, component));
        buf[ComponentKey::PREFIX_SIZE..ComponentKey::STORED_SIZE]
            .copy_from_slice(&Entity::SENTINEL.to_bytes());
        buf[ComponentKey::STORED_SIZE..].copy_from_slice(&index.to_bytes());
        buf
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ordering_matches_bytes() {
        let ids = [
            Entity(0),
            Entity(1),
            Entity(255),
            Entity(256),
            Entity(u64::MAX),
        ];

        let mut by_ord = ids;
        by_ord.sort();

        let mut by_bytes = ids;
        by_bytes.sort_by(|a, b| a.to_bytes().cmp(&b.to_bytes()));

        assert_eq!(by_ord, by_bytes);
    }

    #[test]
    fn component_key_is_exactly_fixed_size() {
        let key = ComponentKey::new(Partition(7), Component(3), Entity(42));
        assert_eq!(key.to_raw().len(), ComponentKey::STORED_SIZE);
    }

    #[test]
    fn component_key_ordering_matches_bytes() {
        let keys = [
            ComponentKey::new(Partition(0), Component(1), Entity(2)),
            ComponentKey::new(Partition(0), Component(1), Entity(300)),
            ComponentKey::new(Partition(0), Component(2), Entity(1)),
            ComponentKey::new(Partition(1), Component(0), Entity(0)),
        ];

        for pair in keys.windows(2) {
            assert!(
                pair[0].to_raw() < pair[1].to_raw(),
                "want {:?} before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn index_key_extends_component_prefix() {
        let fragment = Fragment::from("test title");
        let key = IndexKey::new(Partition(9), Component(6), IndexId(1), &fragment).to_raw();

        assert!(key.starts_with(&ComponentKey::prefix(Partition(9), Component(6))));
        assert_eq!(key.len(), INDEX_KEY_PREFIX_SIZE + fragment.len());
        assert!(key.ends_with(fragment.as_bytes()));
    }

    #[test]
    fn index_key_cannot_collide_with_component_key() {
        // An index key always carries the sentinel entity plus at least the
        // index tag, so it is strictly longer than any value key with the
        // same partition+component prefix.
        let fragment = Fragment::default();
        let index = IndexKey::new(Partition(1), Component(2), IndexId(0), &fragment).to_raw();
        let value = ComponentKey::new(Partition(1), Component(2), Entity::SENTINEL).to_raw();

        assert!(index.len() > value.len());
        assert!(index.starts_with(&value));
    }

    #[test]
    fn index_keys_sort_by_fragment() {
        let a = Fragment::from("alpha");
        let b = Fragment::from("beta");
        let ka = IndexKey::new(Partition(1), Component(1), IndexId(1), &a).to_raw();
        let kb = IndexKey::new(Partition(1), Component(1), IndexId(1), &b).to_raw();

        assert!(ka < kb);
    }

    #[test]
    fn entity_try_from_slice_rejects_other_lengths() {
        assert_eq!(Entity::try_from_slice(&[0u8; 8]), Some(Entity(0)));
        assert_eq!(Entity::try_from_slice(&[0u8; 7]), None);
        assert_eq!(Entity::try_from_slice(&[0u8; 9]), None);
        assert_eq!(Entity::try_from_slice(&[]), None);
    }
}
