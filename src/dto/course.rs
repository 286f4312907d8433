use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::course::Course;

/// Free-text course search.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CourseSearchRequest {
    /// Course name and/or location, e.g. "Bandon Dunes Oregon".
    #[serde(default)]
    pub query: String,
}

/// Courses the oracle found, ready to attach to a tournament.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseSearchResponse {
    pub courses: Vec<Course>,
}
