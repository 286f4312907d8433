use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the tournament admin passcode.
pub const PASSCODE_HEADER: &str = "x-tournament-passcode";

/// Passcode presented by the caller, if any. Never rejects: a missing header means "scorer".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passcode(pub Option<String>);

impl Passcode {
    /// Borrowed passcode, `None` when the header was absent or blank.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for Passcode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(PASSCODE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        Ok(Passcode(provided))
    }
}
