use crate::{
    error::{DecodeError, EncodeError},
    key::{Component, Fragment, IndexId},
};
use std::fmt::{self, Display};

///
/// ComponentKind
///
/// A schema component definition: a 16-bit tag, a value codec, and zero or
/// more index functions. This is the runtime form of what schema code
/// generation would otherwise produce, one definition per component type.
///
/// Contract: `decode(&[])` must yield the type's zero value, never an
/// error — a missing key and an explicitly zeroed value are
/// indistinguishable by design.
///

pub trait ComponentKind: Default + Sized + 'static {
    /// Tag identifying this component in every key that stores it.
    const COMPONENT: Component;

    /// Indexes maintained over this component's values on every write.
    const INDEXES: &'static [IndexModel<Self>] = &[];

    fn encode(&self) -> Result<Vec<u8>, EncodeError>;

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;
}

///
/// IndexModel
///
/// Runtime descriptor for one index over a component: the 16-bit sub-tag
/// and the function mapping a decoded value to its index key fragments.
/// A value that produces zero fragments occupies no bucket.
///

pub struct IndexModel<V> {
    pub id: IndexId,
    pub name: &'static str,
    pub fragments: fn(&V) -> Vec<Fragment>,
}

impl<V> IndexModel<V> {
    #[must_use]
    pub const fn new(id: IndexId, name: &'static str, fragments: fn(&V) -> Vec<Fragment>) -> Self {
        Self {
            id,
            name,
            fragments,
        }
    }
}

// Manual Copy + Clone implementations: a derive would require V to be
// Clone, but the descriptor only holds a tag and a fn pointer.
impl<V> Copy for IndexModel<V> {}

impl<V> Clone for IndexModel<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Display for IndexModel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tagged {
        label: String,
    }

    fn label_fragments(value: &Tagged) -> Vec<Fragment> {
        if value.label.is_empty() {
            return Vec::new();
        }
        vec![Fragment::from(value.label.to_lowercase())]
    }

    #[test]
    fn index_model_display_names_the_index() {
        let model = IndexModel::new(IndexId(2), "label", label_fragments);
        assert_eq!(model.to_string(), "label(2)");
    }

    #[test]
    fn empty_values_produce_no_fragments() {
        let model = IndexModel::new(IndexId(2), "label", label_fragments);
        assert!((model.fragments)(&Tagged::default()).is_empty());

        let tagged = Tagged {
            label: "Mixed Case".to_string(),
        };
        assert_eq!(
            (model.fragments)(&tagged),
            vec![Fragment::from("mixed case")]
        );
    }
}
