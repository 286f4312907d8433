/// CouchDB backend, one document per store path.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process backend used without CouchDB and in tests.
pub mod memory;

use std::fmt;

use futures::future::BoxFuture;
use serde_json::Value;
use uuid::Uuid;

use crate::dao::storage::StorageResult;

/// Location of a record in the key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorePath {
    /// Whole tournament record at `tournaments/{id}`.
    Tournament(String),
    /// Score card of one match at `scores/{tournament_id}/{match_id}`.
    Scores {
        /// Owning tournament.
        tournament_id: String,
        /// Match the card belongs to.
        match_id: Uuid,
    },
}

impl StorePath {
    /// Path of a tournament record.
    pub fn tournament(id: impl Into<String>) -> Self {
        StorePath::Tournament(id.into())
    }

    /// Path of the score card of `match_id`.
    pub fn scores(tournament_id: impl Into<String>, match_id: Uuid) -> Self {
        StorePath::Scores {
            tournament_id: tournament_id.into(),
            match_id,
        }
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorePath::Tournament(id) => write!(f, "tournaments/{id}"),
            StorePath::Scores {
                tournament_id,
                match_id,
            } => write!(f, "scores/{tournament_id}/{match_id}"),
        }
    }
}

/// Abstraction over the remote key-value store holding tournaments and scores.
///
/// `set` replaces the whole value at a path; there is no partial update.
pub trait KvStore: Send + Sync {
    /// Short name of the backend, reported by the health check.
    fn backend(&self) -> &'static str;
    /// Value stored at `path`, `None` when nothing was written there.
    fn get(&self, path: StorePath) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    /// Replace the value at `path`.
    fn set(&self, path: StorePath, value: Value) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap round trip proving the backend still answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish whatever the backend needs after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
