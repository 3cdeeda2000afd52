//! Persisted component definitions for the topic-map schema.
//!
//! Component tags are part of the stored key layout and must never be
//! renumbered once data exists.

use notedb::core::serialize;
use notedb::prelude::*;

///
/// TopicMapInfo
///
/// Metadata describing one topic map, stored in the root partition under
/// the topic map's own entity. That entity id doubles as the partition id
/// for the map's contents.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TopicMapInfo {
    pub topic_map: Entity,
}

impl ComponentKind for TopicMapInfo {
    const COMPONENT: Component = Component(1);

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serialize::serialize(self).map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serialize::deserialize(bytes).map_err(DecodeError::from)
    }
}

///
/// TopicRefs
///
/// A topic's item identifiers, subject identifiers, and subject locators.
/// Each ref list is indexed under its own tag so lookups by any ref kind
/// stay exact-match.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TopicRefs {
    pub item_identifiers: Vec<String>,
    pub subject_identifiers: Vec<String>,
    pub subject_locators: Vec<String>,
}

pub const TOPIC_REFS_II: IndexModel<TopicRefs> =
    IndexModel::new(IndexId(3), "item_identifiers", |refs| {
        normalize_iris(&refs.item_identifiers)
    });

pub const TOPIC_REFS_SI: IndexModel<TopicRefs> =
    IndexModel::new(IndexId(4), "subject_identifiers", |refs| {
        normalize_iris(&refs.subject_identifiers)
    });

pub const TOPIC_REFS_SL: IndexModel<TopicRefs> =
    IndexModel::new(IndexId(5), "subject_locators", |refs| {
        normalize_iris(&refs.subject_locators)
    });

impl ComponentKind for TopicRefs {
    const COMPONENT: Component = Component(2);
    const INDEXES: &'static [IndexModel<Self>] = &[TOPIC_REFS_II, TOPIC_REFS_SI, TOPIC_REFS_SL];

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serialize::serialize(self).map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serialize::deserialize(bytes).map_err(DecodeError::from)
    }
}

/// IRIs index case-insensitively; empty refs occupy no bucket.
fn normalize_iris(iris: &[String]) -> Vec<Fragment> {
    iris.iter()
        .filter(|iri| !iri.is_empty())
        .map(|iri| Fragment::from(iri.to_lowercase()))
        .collect()
}

///
/// TopicNames
///
/// All of a topic's names. Not sorted: names are ordered according to user
/// preference, and this is how that ordering is represented in storage.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TopicNames(pub EntityList);

impl ComponentKind for TopicNames {
    const COMPONENT: Component = Component(6);

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.0.encode().map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        EntityList::decode(bytes).map(Self).map_err(DecodeError::from)
    }
}

///
/// TopicOccurrences
///
/// All of a topic's occurrences, in user-preference order like
/// [`TopicNames`].
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TopicOccurrences(pub EntityList);

impl ComponentKind for TopicOccurrences {
    const COMPONENT: Component = Component(7);

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.0.encode().map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        EntityList::decode(bytes).map(Self).map_err(DecodeError::from)
    }
}

///
/// Name
///
/// One name value, owned by a topic. Indexed by the lowercase value so
/// topics can be listed in name order.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Name {
    pub topic: Entity,
    pub value: String,
}

pub const NAME_VALUE: IndexModel<Name> = IndexModel::new(IndexId(1), "value", |name| {
    normalize_value(&name.value)
});

impl ComponentKind for Name {
    const COMPONENT: Component = Component(8);
    const INDEXES: &'static [IndexModel<Self>] = &[NAME_VALUE];

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serialize::serialize(self).map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serialize::deserialize(bytes).map_err(DecodeError::from)
    }
}

///
/// Occurrence
///
/// One occurrence value, owned by a topic.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Occurrence {
    pub topic: Entity,
    pub value: String,
}

pub const OCCURRENCE_VALUE: IndexModel<Occurrence> =
    IndexModel::new(IndexId(1), "value", |occurrence| {
        normalize_value(&occurrence.value)
    });

impl ComponentKind for Occurrence {
    const COMPONENT: Component = Component(9);
    const INDEXES: &'static [IndexModel<Self>] = &[OCCURRENCE_VALUE];

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serialize::serialize(self).map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serialize::deserialize(bytes).map_err(DecodeError::from)
    }
}

fn normalize_value(value: &str) -> Vec<Fragment> {
    if value.is_empty() {
        return Vec::new();
    }
    vec![Fragment::from(value.to_lowercase())]
}

///
/// TESTS
///
