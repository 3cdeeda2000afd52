//! Creation flows for topic maps and their contents.

use crate::components::{self, TopicMapInfo, TopicNames, TopicOccurrences};
use notedb::prelude::*;
use thiserror::Error as ThisError;

///
/// TopicMapError
///

#[derive(Debug, ThisError)]
pub enum TopicMapError {
    #[error("topic maps can only be created in the root partition")]
    NotRoot,

    #[error("topic items can only be created in a non-root partition")]
    Root,

    #[error("topic items require an existing topic entity")]
    MissingTopic,

    #[error(transparent)]
    Engine(#[from] Error),
}

///
/// TopicStore
///
/// Topic-map application logic over a partitioned engine handle. Topic-map
/// metadata lives in the root partition; a map's own contents live in the
/// partition named by the map's entity id.
///

pub struct TopicStore<'s, S> {
    txn: Partitioned<'s, S>,
}

impl<'s, S: Store> TopicStore<'s, S> {
    #[must_use]
    pub const fn new(store: &'s S, partition: Partition) -> Self {
        Self {
            txn: Partitioned::new(store, partition),
        }
    }

    #[must_use]
    pub const fn txn(&self) -> Partitioned<'s, S> {
        self.txn
    }

    /// Create a new topic map and describe it with its metadata component.
    pub fn create_topic_map(&self) -> Result<Entity, TopicMapError> {
        if self.txn.partition() != Partition::ROOT {
            return Err(TopicMapError::NotRoot);
        }

        // Allocate an entity to identify the new topic map.
        let topic_map = self.txn.alloc()?;

        let info = TopicMapInfo { topic_map };
        self.txn.set(topic_map, &info)?;

        Ok(topic_map)
    }

    /// Create a new topic carrying a single name.
    pub fn create_topic_with_name(&self, name: &str) -> Result<Entity, TopicMapError> {
        if self.txn.partition() == Partition::ROOT {
            return Err(TopicMapError::Root);
        }

        // Allocate an entity to identify the new topic.
        let topic = self.txn.alloc()?;

        // If the name is later deleted and no other data references this
        // topic, the topic also ceases to exist. That is fine: with nothing
        // to say about a topic, it is not a topic anymore.
        self.create_topic_name(topic, name)?;

        Ok(topic)
    }

    /// Create a name for `topic` and append it to the topic's name list.
    pub fn create_topic_name(&self, topic: Entity, value: &str) -> Result<Entity, TopicMapError> {
        if self.txn.partition() == Partition::ROOT {
            return Err(TopicMapError::Root);
        }
        if topic < Entity::MIN {
            return Err(TopicMapError::MissingTopic);
        }

        let name = self.txn.alloc()?;
        self.txn.set(
            name,
            &components::Name {
                topic,
                value: value.to_string(),
            },
        )?;

        // Append at the end: the list keeps user-preference order.
        let mut names = self.txn.get_one::<TopicNames>(topic)?;
        names.0.push(name);
        self.txn.set(topic, &names)?;

        Ok(name)
    }

    /// Create an occurrence for `topic` and append it to the topic's
    /// occurrence list.
    pub fn create_topic_occurrence(
        &self,
        topic: Entity,
        value: &str,
    ) -> Result<Entity, TopicMapError> {
        if self.txn.partition() == Partition::ROOT {
            return Err(TopicMapError::Root);
        }
        if topic < Entity::MIN {
            return Err(TopicMapError::MissingTopic);
        }

        let occurrence = self.txn.alloc()?;
        self.txn.set(
            occurrence,
            &components::Occurrence {
                topic,
                value: value.to_string(),
            },
        )?;

        let mut occurrences = self.txn.get_one::<TopicOccurrences>(topic)?;
        occurrences.0.push(occurrence);
        self.txn.set(topic, &occurrences)?;

        Ok(occurrence)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_maps_are_created_in_the_root_partition_only() {
        let store = MemoryStore::new();

        let wrong = TopicStore::new(&store, Partition(3));
        assert!(matches!(
            wrong.create_topic_map(),
            Err(TopicMapError::NotRoot)
        ));

        let root = TopicStore::new(&store, Partition::ROOT);
        let topic_map = root.create_topic_map().expect("create topic map");

        let info = root
            .txn()
            .get_one::<TopicMapInfo>(topic_map)
            .expect("get info");
        assert_eq!(info.topic_map, topic_map);
    }

    #[test]
    fn topic_contents_require_a_non_root_partition() {
        let store = MemoryStore::new();
        let root = TopicStore::new(&store, Partition::ROOT);

        assert!(matches!(
            root.create_topic_with_name("x"),
            Err(TopicMapError::Root)
        ));
        assert!(matches!(
            root.create_topic_name(Entity(1), "x"),
            Err(TopicMapError::Root)
        ));
        assert!(matches!(
            root.create_topic_occurrence(Entity(1), "x"),
            Err(TopicMapError::Root)
        ));
    }

    #[test]
    fn topic_items_require_an_existing_topic() {
        let store = MemoryStore::new();
        let maps = TopicStore::new(&store, Partition(1));

        assert!(matches!(
            maps.create_topic_name(Entity(0), "x"),
            Err(TopicMapError::MissingTopic)
        ));
        assert!(matches!(
            maps.create_topic_occurrence(Entity(0), "x"),
            Err(TopicMapError::MissingTopic)
        ));
    }

    #[test]
    fn create_topic_with_name_links_topic_and_name() {
        let store = MemoryStore::new();
        let maps = TopicStore::new(&store, Partition(1));

        let topic = maps
            .create_topic_with_name("Test Topic")
            .expect("create topic");

        let names = maps.txn().get_one::<TopicNames>(topic).expect("get names");
        assert_eq!(names.0.len(), 1);

        let stored = maps
            .txn()
            .get_one::<components::Name>(names.0[0])
            .expect("get name");
        assert_eq!(stored.topic, topic);
        assert_eq!(stored.value, "Test Topic");
    }

    #[test]
    fn occurrences_append_in_user_order() {
        let store = MemoryStore::new();
        let maps = TopicStore::new(&store, Partition(1));

        let topic = maps.create_topic_with_name("Topic").expect("create topic");
        let first = maps
            .create_topic_occurrence(topic, "zulu")
            .expect("create occurrence");
        let second = maps
            .create_topic_occurrence(topic, "alpha")
            .expect("create occurrence");

        let occurrences = maps
            .txn()
            .get_one::<TopicOccurrences>(topic)
            .expect("get occurrences");

        // Appended order, not value order.
        assert_eq!(occurrences.0.as_slice(), &[first, second]);
    }
}
