//! Failures of the CouchDB key-value backend.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for CouchDB operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// What the store was doing when a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouchOperation {
    /// Probing the database, also used as the health check.
    CheckDatabase,
    /// Creating the database on first connect.
    CreateDatabase,
    /// Fetching a document, including the revision lookup before a write.
    ReadDocument,
    /// Putting a document.
    WriteDocument,
}

impl std::fmt::Display for CouchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CouchOperation::CheckDatabase => "check database",
            CouchOperation::CreateDatabase => "create database",
            CouchOperation::ReadDocument => "read document",
            CouchOperation::WriteDocument => "write document",
        })
    }
}

/// Failures that can occur while talking to CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Credentials must come in pairs.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar {
        /// Variable that was expected alongside its partner.
        var: &'static str,
    },
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an answer.
    #[error("CouchDB unreachable while trying to {operation} `{target}`")]
    Transport {
        /// What the store was doing.
        operation: CouchOperation,
        /// Database or document id, never the credentials.
        target: String,
        /// Transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with an unexpected status.
    #[error("CouchDB answered {status} while trying to {operation} `{target}`")]
    Status {
        /// What the store was doing.
        operation: CouchOperation,
        /// Database or document id.
        target: String,
        /// Status CouchDB returned.
        status: StatusCode,
    },
    /// Another writer updated the document between our read and write.
    #[error("CouchDB document `{doc_id}` changed concurrently")]
    Conflict {
        /// Document that moved on.
        doc_id: String,
    },
    /// A document body is not a store value.
    #[error("CouchDB document `{doc_id}` is not a store value")]
    Decode {
        /// Offending document.
        doc_id: String,
        /// Body decoding failure.
        #[source]
        source: reqwest::Error,
    },
}
