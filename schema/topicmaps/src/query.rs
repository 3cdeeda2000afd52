//! Read surface: topics ordered by name and mask-selected topic loading.

use crate::{
    Name, Occurrence, Topic, TopicMapError, TopicStore,
    components::{self, NAME_VALUE, TopicNames, TopicOccurrences},
};
use notedb::prelude::*;
use std::ops::BitOr;

///
/// Mask
///
/// Selects which fields [`TopicStore::load_topic`] includes in a response.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Mask(u32);

impl Mask {
    /// IIs, SIs, and SLs.
    pub const REFS: Self = Self(1);
    pub const TOPIC_MAPS: Self = Self(1 << 1);
    pub const TOPICS: Self = Self(1 << 2);
    pub const NAMES: Self = Self(1 << 3);
    pub const OCCURRENCES: Self = Self(1 << 4);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Mask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl<S: Store> TopicStore<'_, S> {
    /// A page of topics ordered by name value.
    ///
    /// Reading begins at `cursor` and is exhausted when fewer than `n`
    /// entities come back. A topic appears once per matching name.
    pub fn topics_by_name(
        &self,
        cursor: &mut IndexCursor,
        n: usize,
    ) -> Result<Vec<Entity>, TopicMapError> {
        let names = self.txn().by_index(&NAME_VALUE, cursor, n)?;
        let records = self.txn().get::<components::Name>(&names)?;

        Ok(records.into_iter().map(|record| record.topic).collect())
    }

    /// Load the `mask`-selected fields of `topic`.
    pub fn load_topic(&self, topic: Entity, mask: Mask) -> Result<Topic, TopicMapError> {
        let mut loaded = Topic::default();

        if mask.contains(Mask::REFS) {
            return Err(TopicMapError::Engine(Error::unsupported(
                "loading topic refs",
            )));
        }

        if mask.contains(Mask::NAMES) {
            let names = self.txn().get_one::<TopicNames>(topic)?;
            let records = self.txn().get::<components::Name>(names.0.as_slice())?;

            loaded.names = records
                .into_iter()
                .map(|record| Name {
                    value: record.value,
                })
                .collect();
        }

        if mask.contains(Mask::OCCURRENCES) {
            let occurrences = self.txn().get_one::<TopicOccurrences>(topic)?;
            let records = self
                .txn()
                .get::<components::Occurrence>(occurrences.0.as_slice())?;

            loaded.occurrences = records
                .into_iter()
                .map(|record| Occurrence {
                    value: record.value,
                })
                .collect();
        }

        Ok(loaded)
    }
}

///
/// TESTS
///
