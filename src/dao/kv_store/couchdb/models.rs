use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::kv_store::StorePath;

/// Separator replacing `/` in store paths, since CouchDB ids cannot nest.
pub const PATH_SEPARATOR: &str = "::";

/// One store path persisted as a single CouchDB document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchValueDocument {
    /// Document id derived from the store path.
    #[serde(rename = "_id")]
    pub id: String,
    /// Current revision; absent when creating the document.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Stored value.
    pub value: Value,
}

impl CouchValueDocument {
    /// Document for `path`, updating revision `rev` when it exists.
    pub fn new(path: &StorePath, value: Value, rev: Option<String>) -> Self {
        Self {
            id: doc_id(path),
            rev,
            value,
        }
    }
}

/// CouchDB document id of a store path.
pub fn doc_id(path: &StorePath) -> String {
    path.to_string().replace('/', PATH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn doc_ids_flatten_paths() {
        let path = StorePath::scores("AB12CD", Uuid::nil());
        assert_eq!(
            doc_id(&path),
            "scores::AB12CD::00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn new_documents_omit_revision() {
        let doc = CouchValueDocument::new(&StorePath::tournament("AB12CD"), json!({"a": 1}), None);
        let encoded = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            encoded,
            json!({"_id": "tournaments::AB12CD", "value": {"a": 1}})
        );
    }
}
