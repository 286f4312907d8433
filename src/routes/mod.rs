use axum::Router;

use crate::state::SharedState;

/// Format and course catalogs plus the handicap calculator.
pub mod catalog;
/// Course search proxy.
pub mod course_search;
/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Liveness and storage status.
pub mod health;
/// `x-tournament-passcode` request header.
pub mod passcode;
/// Score cards, handicaps and standings.
pub mod scores;
/// Live tournament streams.
pub mod sse;
/// Tournament creation, reads, joins and edits.
pub mod tournaments;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(tournaments::router())
        .merge(scores::router())
        .merge(catalog::router())
        .merge(course_search::router());

    api_router.merge(docs::router()).with_state(state)
}
