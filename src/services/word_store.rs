//! Read-only vocabulary store backed by a JSON file.
//!
//! The file holds an array of collections, each with its word records:
//! ```json
//! [{ "id": "fruit", "name": "Fruit", "visibility": "public",
//!    "words": [{ "id": "w1", "word": "apple", "meaning": "alma" }] }]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::{Collection, Visibility};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read collections file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed collections file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Listing entry for a collection, without its words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub word_count: usize,
    pub visibility: Visibility,
}

impl From<&Collection> for CollectionSummary {
    fn from(collection: &Collection) -> Self {
        Self {
            id: collection.id.clone(),
            name: collection.name.clone(),
            description: collection.description.clone(),
            word_count: collection.items().count(),
            visibility: collection.visibility,
        }
    }
}

/// Source of word collections.
pub trait WordStore: Send + Sync {
    /// The collections with the given ids, in store order. Unknown ids are skipped.
    fn collections(&self, ids: &[String]) -> Vec<Collection>;

    fn summaries(&self) -> Vec<CollectionSummary>;
}

/// Collections loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct JsonWordStore {
    collections: Vec<Collection>,
}

impl JsonWordStore {
    pub fn new(collections: Vec<Collection>) -> Self {
        Self { collections }
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let collections: Vec<Collection> = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded {} collections from {}",
            collections.len(),
            path.display()
        );
        Ok(Self::new(collections))
    }

    /// Like [`load`](Self::load), but a missing or unreadable file gives an
    /// empty store.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("No collections available ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }
}

impl WordStore for JsonWordStore {
    fn collections(&self, ids: &[String]) -> Vec<Collection> {
        self.collections
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect()
    }

    fn summaries(&self) -> Vec<CollectionSummary> {
        self.collections.iter().map(CollectionSummary::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::collection_of;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_collections_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "id": "fruit",
                "name": "Fruit",
                "visibility": "public",
                "words": [
                    {{ "id": "w1", "word": "apple", "meaning": "alma", "type": "noun" }},
                    {{ "english": "pear", "meaning": "armud", "exampleSentence": "Armud yedim." }},
                    {{ "id": "w3", "meaning": "orphan" }}
                ]
            }}]"#
        )
        .unwrap();

        let store = JsonWordStore::load(file.path()).unwrap();
        let summaries = store.summaries();
        assert_eq!(summaries.len(), 1);
        // the record without a term is not a usable word
        assert_eq!(summaries[0].word_count, 2);
        assert_eq!(summaries[0].visibility, Visibility::Public);

        let collections = store.collections(&["fruit".to_string()]);
        let items: Vec<_> = collections[0].items().collect();
        assert_eq!(items.len(), summaries[0].word_count);
        assert_eq!(items[1].term, "pear");
        assert_eq!(items[1].example_sentence.as_deref(), Some("Armud yedim."));
    }

    #[test]
    fn test_missing_file_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonWordStore::load_or_empty(&dir.path().join("nope.json"));
        assert!(store.summaries().is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            JsonWordStore::load(file.path()),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_unknown_ids_are_skipped() {
        let store = JsonWordStore::new(vec![collection_of("a", 3), collection_of("b", 2)]);
        let found = store.collections(&["b".to_string(), "zzz".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b");
    }
}
