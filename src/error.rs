use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError, services::oracle::OracleError, state::tournament::TournamentError,
};

/// Failures of tournament, score and course-search operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store rejected or could not serve a request.
    #[error("tournament store unavailable")]
    Unavailable(#[source] StorageError),
    /// No store is installed or the installed one failed its health check.
    #[error("tournament store offline (degraded mode)")]
    Degraded,
    /// Wrong passcode, or a scorer attempting an admin edit.
    #[error("access denied: {0}")]
    Unauthorized(String),
    #[error("rejected input: {0}")]
    InvalidInput(String),
    /// Stored data cannot serve the request, e.g. a match pointing at a missing tee.
    #[error("inconsistent tournament: {0}")]
    InvalidState(String),
    #[error("missing: {0}")]
    NotFound(String),
    /// Server-side setup is missing something, e.g. an API credential.
    #[error("server misconfigured: {0}")]
    Configuration(String),
    /// The course-data provider answered with an error.
    #[error("course provider error: {0}")]
    Upstream(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<TournamentError> for ServiceError {
    fn from(err: TournamentError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<OracleError> for ServiceError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::MissingCredential => ServiceError::Configuration(err.to_string()),
            OracleError::Upstream { message, .. } => ServiceError::Upstream(message),
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("invalid request body: {err}"))
    }
}

/// HTTP-facing error; the payload is the message shown to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("400: {0}")]
    BadRequest(String),
    #[error("401: {0}")]
    Unauthorized(String),
    #[error("404: {0}")]
    NotFound(String),
    #[error("409: {0}")]
    Conflict(String),
    #[error("503: {0}")]
    ServiceUnavailable(String),
    #[error("500: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(message)
            | AppError::Unauthorized(message)
            | AppError::NotFound(message)
            | AppError::Conflict(message)
            | AppError::ServiceUnavailable(message)
            | AppError::Internal(message) => message,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => {
                error!(error = %source, "store request failed");
                AppError::ServiceUnavailable("tournament store unavailable".into())
            }
            ServiceError::Degraded => {
                AppError::ServiceUnavailable("tournament store offline, retry shortly".into())
            }
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Configuration(message) | ServiceError::Upstream(message) => {
                AppError::Internal(message)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorBody {
            error: self.message(),
        });
        (self.status(), payload).into_response()
    }
}
