//! Role resolution from the tournament passcode.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ServiceError,
    state::tournament::{PASSCODE_LENGTH, normalize_code},
};

/// What a caller may do with a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Holds the passcode: edits the tournament and sees the passcode.
    Admin,
    /// Knows the tournament id only: reads it and enters scores.
    Scorer,
}

/// Resolve the role of a caller presenting `provided` against the `stored` passcode.
///
/// No passcode means [`Role::Scorer`]; a passcode that does not match is rejected.
pub fn authorize(stored: &str, provided: Option<&str>) -> Result<Role, ServiceError> {
    let Some(raw) = provided.filter(|value| !value.trim().is_empty()) else {
        return Ok(Role::Scorer);
    };
    match normalize_code(raw, PASSCODE_LENGTH) {
        Some(code) if code == stored => Ok(Role::Admin),
        _ => Err(ServiceError::Unauthorized("wrong passcode".into())),
    }
}

/// Like [`authorize`] but only admins pass.
pub fn require_admin(stored: &str, provided: Option<&str>) -> Result<(), ServiceError> {
    match authorize(stored, provided)? {
        Role::Admin => Ok(()),
        Role::Scorer => Err(ServiceError::Unauthorized("passcode required".into())),
    }
}
