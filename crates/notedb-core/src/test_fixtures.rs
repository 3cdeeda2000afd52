use crate::{
    error::{DecodeError, EncodeError},
    key::{Component, Fragment, IndexId},
    serialize,
    value::{ComponentKind, IndexModel},
};
use serde::{Deserialize, Serialize};

///
/// Document
///
/// Test-only component: a titled document indexed by its lowercase title.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Document {
    pub(crate) title: String,
    pub(crate) content: String,
}

pub(crate) const DOCUMENT_TITLE: IndexModel<Document> =
    IndexModel::new(IndexId(1), "title", document_title_fragments);

fn document_title_fragments(doc: &Document) -> Vec<Fragment> {
    if doc.title.is_empty() {
        return Vec::new();
    }
    vec![Fragment::from(doc.title.to_lowercase())]
}

impl ComponentKind for Document {
    const COMPONENT: Component = Component(1);
    const INDEXES: &'static [IndexModel<Self>] = &[DOCUMENT_TITLE];

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serialize::serialize(self).map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serialize::deserialize(bytes).map_err(DecodeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_round_trips_and_zero_decodes() {
        let doc = Document {
            title: "Test Title".to_string(),
            content: "Ipsum dolor etcetera".to_string(),
        };

        let encoded = doc.encode().expect("encode");
        assert_eq!(Document::decode(&encoded).expect("decode"), doc);
        assert_eq!(Document::decode(&[]).expect("decode"), Document::default());
    }
}
