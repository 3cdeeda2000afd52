//! Topic-map vocabulary and its storage schema over the NoteDB engine.
//!
//! The vocabulary types here are the loaded, application-facing shapes;
//! their persisted counterparts live in [`components`], the creation flows
//! in [`logic`], and the read surface in [`query`].

pub mod components;
pub mod logic;
pub mod query;

pub use logic::{TopicMapError, TopicStore};
pub use query::Mask;

///
/// RefKind
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RefKind {
    #[default]
    ItemIdentifier,
    SubjectIdentifier,
    SubjectLocator,
}

///
/// TopicRef
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TopicRef {
    pub kind: RefKind,
    pub iri: String,
}

///
/// Name
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Name {
    pub value: String,
}

///
/// Occurrence
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Occurrence {
    pub value: String,
}

///
/// Topic
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Topic {
    pub self_refs: Vec<TopicRef>,
    pub names: Vec<Name>,
    pub occurrences: Vec<Occurrence>,
}

///
/// TopicMap
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TopicMap {
    pub item_identifiers: Vec<String>,
    pub topics: Vec<Topic>,
}

///
/// Merger
///
/// Anything that can absorb loaded topics, one at a time.
///

pub trait Merger {
    fn merge_topic(&mut self, topic: Topic) -> Result<(), TopicMapError>;
}

impl Merger for TopicMap {
    fn merge_topic(&mut self, topic: Topic) -> Result<(), TopicMapError> {
        self.topics.push(topic);
        Ok(())
    }
}
