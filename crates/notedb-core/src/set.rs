//! Module: set
//! Responsibility: the entity-sequence wire codec and the two shapes built
//! on it — order-preserving lists and sorted, change-reporting sets.
//! Does not own: key layout or bucket persistence.

use crate::key::Entity;
use derive_more::{Deref, DerefMut};
use thiserror::Error as ThisError;

///
/// Constants
///

/// Wire format tag. A single leading byte so the sequence encoding can
/// evolve without rekeying stored data.
const FORMAT_ENTITY_SEQ: u8 = 0;

const SEQ_LEN_BYTES: usize = 4;

/// Upper bound on entries in one encoded sequence, keeping payloads within
/// bounded, storable sizes.
pub const MAX_ENTITY_SEQ_LEN: usize = 65_535;

///
/// EntitySetCorruption
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum EntitySetCorruption {
    #[error("unsupported entity sequence format code 0x{found:02x}")]
    UnsupportedFormat { found: u8 },

    #[error("entity sequence missing entry count")]
    MissingLength,

    #[error("entity sequence entry count exceeds limit: {count}")]
    TooManyEntries { count: usize },

    #[error("entity sequence length does not match entry count")]
    LengthMismatch,

    #[error("entity set entries are not strictly ascending")]
    Unsorted,
}

///
/// EntitySetEncodeError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum EntitySetEncodeError {
    #[error("entity sequence exceeds max entries: {count} (limit {MAX_ENTITY_SEQ_LEN})")]
    TooManyEntries { count: usize },
}

/// Encode entities as `format(1) | count(4, u32 BE) | count * id(8, u64 BE)`.
fn encode_entities(entities: &[Entity]) -> Result<Vec<u8>, EntitySetEncodeError> {
    let count = entities.len();
    if count > MAX_ENTITY_SEQ_LEN {
        return Err(EntitySetEncodeError::TooManyEntries { count });
    }

    let mut out = Vec::with_capacity(1 + SEQ_LEN_BYTES + count * Entity::STORED_SIZE);
    out.push(FORMAT_ENTITY_SEQ);

    let count_u32 =
        u32::try_from(count).map_err(|_| EntitySetEncodeError::TooManyEntries { count })?;
    out.extend_from_slice(&count_u32.to_be_bytes());

    for entity in entities {
        out.extend_from_slice(&entity.to_bytes());
    }

    Ok(out)
}

/// Decode an encoded sequence. Empty input is the empty sequence; anything
/// else must frame-validate exactly.
fn decode_entities(bytes: &[u8]) -> Result<Vec<Entity>, EntitySetCorruption> {
    let Some((&format, rest)) = bytes.split_first() else {
        return Ok(Vec::new());
    };

    if format != FORMAT_ENTITY_SEQ {
        return Err(EntitySetCorruption::UnsupportedFormat { found: format });
    }
    if rest.len() < SEQ_LEN_BYTES {
        return Err(EntitySetCorruption::MissingLength);
    }

    let mut len_buf = [0u8; SEQ_LEN_BYTES];
    len_buf.copy_from_slice(&rest[..SEQ_LEN_BYTES]);
    let count = u32::from_be_bytes(len_buf) as usize;

    if count > MAX_ENTITY_SEQ_LEN {
        return Err(EntitySetCorruption::TooManyEntries { count });
    }

    let body = &rest[SEQ_LEN_BYTES..];
    let expected = count
        .checked_mul(Entity::STORED_SIZE)
        .ok_or(EntitySetCorruption::LengthMismatch)?;
    if body.len() != expected {
        return Err(EntitySetCorruption::LengthMismatch);
    }

    let mut out = Vec::with_capacity(count);
    for chunk in body.chunks_exact(Entity::STORED_SIZE) {
        let mut id = [0u8; Entity::STORED_SIZE];
        id.copy_from_slice(chunk);
        out.push(Entity(u64::from_be_bytes(id)));
    }

    Ok(out)
}

///
/// EntityList
///
/// Order-preserving entity sequence used as an ordinary component value,
/// e.g. a topic's names in user-preferred order. Duplicates are allowed;
/// the stored order is exactly the caller's order.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq)]
pub struct EntityList(Vec<Entity>);

impl EntityList {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn encode(&self) -> Result<Vec<u8>, EntitySetEncodeError> {
        encode_entities(&self.0)
    }

    /// Decoding an empty byte sequence yields an empty list, never an error.
    pub fn decode(bytes: &[u8]) -> Result<Self, EntitySetCorruption> {
        decode_entities(bytes).map(Self)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Entity] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Entity> {
        self.0
    }
}

impl From<Vec<Entity>> for EntityList {
    fn from(entities: Vec<Entity>) -> Self {
        Self(entities)
    }
}

impl FromIterator<Entity> for EntityList {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// EntitySet
///
/// Sorted, duplicate-free entity sequence used exclusively for index
/// buckets. Mutations report whether the set changed so callers can skip
/// rewriting unchanged buckets.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EntitySet(Vec<Entity>);

impl EntitySet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert preserving sort order. Returns false without touching the set
    /// if the entity is already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        match self.0.binary_search(&entity) {
            Ok(_) => false,
            Err(at) => {
                self.0.insert(at, entity);
                true
            }
        }
    }

    /// Remove if present. Returns false if the entity was absent.
    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.0.binary_search(&entity) {
            Ok(at) => {
                self.0.remove(at);
                true
            }
            Err(_) => false,
        }
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.0.binary_search(&entity).is_ok()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Entity] {
        &self.0
    }

    pub fn encode(&self) -> Result<Vec<u8>, EntitySetEncodeError> {
        encode_entities(&self.0)
    }

    /// Decoding an empty byte sequence yields an empty set. A stored bucket
    /// that is not strictly ascending is corruption, not a value.
    pub fn decode(bytes: &[u8]) -> Result<Self, EntitySetCorruption> {
        let entities = decode_entities(bytes)?;

        if entities.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(EntitySetCorruption::Unsorted);
        }

        Ok(Self(entities))
    }
}

impl From<Vec<Entity>> for EntitySet {
    fn from(mut entities: Vec<Entity>) -> Self {
        entities.sort_unstable();
        entities.dedup();
        Self(entities)
    }
}

///
/// TESTS
///
