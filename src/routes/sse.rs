use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{error::AppError, services::sse_service, state::SharedState};

/// Optional match whose score card should be streamed alongside the tournament.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    /// Match id, sent as `?match=`.
    #[serde(rename = "match")]
    pub match_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/sse/tournaments/{id}",
    tag = "sse",
    params(("id" = String, Path, description = "Tournament id"), StreamQuery),
    responses(
        (status = 200, description = "Live tournament and score updates", content_type = "text/event-stream", body = String),
        (status = 404, description = "Unknown tournament or match")
    )
)]
/// Stream the tournament record and, with `?match=`, one match's score card.
pub async fn tournament_stream(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let stream = sse_service::open_tournament_stream(&state, &id, query.match_id).await?;
    Ok(stream)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/tournaments/{id}", get(tournament_stream))
}
