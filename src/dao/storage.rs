use std::error::Error;
use thiserror::Error;

use crate::dao::kv_store::StorePath;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Backend-specific description, kept out of client responses.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The stored value at `path` does not match the expected shape.
    #[error("stored value at `{path}` could not be decoded")]
    Decode {
        /// Store path that was read.
        path: String,
        /// Shape mismatch reported by serde.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// The value read at `path` does not have the expected shape.
    pub fn decode(path: &StorePath, source: serde_json::Error) -> Self {
        StorageError::Decode {
            path: path.to_string(),
            source,
        }
    }
}
