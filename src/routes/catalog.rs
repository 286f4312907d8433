use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::catalog::{CourseHandicapQuery, CourseHandicapResponse, FormatView},
    scoring::handicap::course_handicap_lenient,
    state::{SharedState, course::Course, format::Format},
};

/// Static reference data: formats, preset courses and the handicap calculator.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/formats", get(list_formats))
        .route("/api/courses", get(list_courses))
        .route("/api/handicap", get(compute_handicap))
}

/// List every match format with its scoring rules.
#[utoipa::path(
    get,
    path = "/api/formats",
    tag = "catalog",
    responses((status = 200, description = "Supported match formats", body = [FormatView]))
)]
pub async fn list_formats() -> Json<Vec<FormatView>> {
    Json(
        Format::ALL
            .iter()
            .map(|format| FormatView::from(format.spec()))
            .collect(),
    )
}

/// Preset courses shipped with the server configuration.
#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "catalog",
    responses((status = 200, description = "Preset courses", body = [Course]))
)]
pub async fn list_courses(State(state): State<SharedState>) -> Json<Vec<Course>> {
    Json(state.config().courses().to_vec())
}

/// Course handicap for free-form inputs. Never fails.
#[utoipa::path(
    get,
    path = "/api/handicap",
    tag = "catalog",
    params(CourseHandicapQuery),
    responses((status = 200, description = "Course handicap", body = CourseHandicapResponse))
)]
pub async fn compute_handicap(Query(query): Query<CourseHandicapQuery>) -> Json<CourseHandicapResponse> {
    Json(CourseHandicapResponse {
        course_handicap: course_handicap_lenient(
            query.handicap_index.as_deref(),
            query.slope.as_deref(),
        ),
    })
}
