//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::tournament::TeamNames;

/// Longest display name accepted for a team.
pub const MAX_TEAM_NAME_LENGTH: usize = 40;

/// Validates that both team names are present, distinct and reasonably short.
///
/// # Examples
///
/// ```ignore
/// validate_team_names(&TeamNames { a: "Eagles".into(), b: "Hawks".into() }) // Ok
/// validate_team_names(&TeamNames { a: "Eagles".into(), b: " eagles ".into() }) // Err - same name
/// ```
pub fn validate_team_names(names: &TeamNames) -> Result<(), ValidationError> {
    let a = names.a.trim();
    let b = names.b.trim();

    if a.is_empty() || b.is_empty() {
        let mut err = ValidationError::new("team_name_empty");
        err.message = Some("Team names must not be empty".into());
        return Err(err);
    }

    let longest = a.chars().count().max(b.chars().count());
    if longest > MAX_TEAM_NAME_LENGTH {
        let mut err = ValidationError::new("team_name_length");
        err.message = Some(
            format!("Team names must be at most {MAX_TEAM_NAME_LENGTH} characters (got {longest})")
                .into(),
        );
        return Err(err);
    }

    if a.eq_ignore_ascii_case(b) {
        let mut err = ValidationError::new("team_name_duplicate");
        err.message = Some("Both teams must have different names".into());
        return Err(err);
    }

    Ok(())
}
