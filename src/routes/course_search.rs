use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::course::{CourseSearchRequest, CourseSearchResponse},
    error::AppError,
    services::course_search,
    state::SharedState,
};

/// Router exposing the course search.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/course-search", post(search))
}

/// Look up scorecard data for a course by name or location.
#[utoipa::path(
    post,
    path = "/api/course-search",
    tag = "courses",
    request_body = CourseSearchRequest,
    responses(
        (status = 200, description = "Matching courses", body = CourseSearchResponse),
        (status = 400, description = "Empty query"),
        (status = 404, description = "No course data found"),
        (status = 500, description = "Missing credential or upstream failure")
    )
)]
pub async fn search(
    State(state): State<SharedState>,
    Json(payload): Json<CourseSearchRequest>,
) -> Result<Json<CourseSearchResponse>, AppError> {
    let courses = course_search::search_courses(&state, &payload.query).await?;
    Ok(Json(CourseSearchResponse { courses }))
}
