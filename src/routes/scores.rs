use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::scores::{MatchHandicapsResponse, RecordHoleRequest, StandingsResponse},
    error::AppError,
    services::score_service,
    state::{SharedState, tournament::ScoreCard},
};

/// Score cards, handicaps and standings.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/tournaments/{id}/matches/{match_id}/scores",
            get(get_scores).put(put_scores),
        )
        .route(
            "/api/tournaments/{id}/matches/{match_id}/scores/hole",
            post(record_hole),
        )
        .route(
            "/api/tournaments/{id}/matches/{match_id}/handicaps",
            get(get_handicaps),
        )
        .route("/api/tournaments/{id}/standings", get(get_standings))
}

/// Current score card of a match.
#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/matches/{match_id}/scores",
    tag = "scores",
    params(
        ("id" = String, Path, description = "Tournament id"),
        ("match_id" = Uuid, Path, description = "Match id")
    ),
    responses(
        (status = 200, description = "Score card, empty when nothing was recorded", body = ScoreCard),
        (status = 404, description = "Unknown tournament or match")
    )
)]
pub async fn get_scores(
    State(state): State<SharedState>,
    Path((id, match_id)): Path<(String, Uuid)>,
) -> Result<Json<ScoreCard>, AppError> {
    let card = score_service::load_scores(&state, &id, match_id).await?;
    Ok(Json(card))
}

/// Overwrite the whole score card of a match.
#[utoipa::path(
    put,
    path = "/api/tournaments/{id}/matches/{match_id}/scores",
    tag = "scores",
    request_body = ScoreCard,
    params(
        ("id" = String, Path, description = "Tournament id"),
        ("match_id" = Uuid, Path, description = "Match id")
    ),
    responses(
        (status = 200, description = "Score card stored", body = ScoreCard),
        (status = 400, description = "Hole or participant outside the match"),
        (status = 404, description = "Unknown tournament or match")
    )
)]
pub async fn put_scores(
    State(state): State<SharedState>,
    Path((id, match_id)): Path<(String, Uuid)>,
    Json(card): Json<ScoreCard>,
) -> Result<Json<ScoreCard>, AppError> {
    let card = score_service::save_scores(&state, &id, match_id, card).await?;
    Ok(Json(card))
}

/// Set or clear a single hole score.
#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/matches/{match_id}/scores/hole",
    tag = "scores",
    request_body = RecordHoleRequest,
    params(
        ("id" = String, Path, description = "Tournament id"),
        ("match_id" = Uuid, Path, description = "Match id")
    ),
    responses(
        (status = 200, description = "Updated score card", body = ScoreCard),
        (status = 400, description = "Hole or participant outside the match"),
        (status = 404, description = "Unknown tournament or match")
    )
)]
pub async fn record_hole(
    State(state): State<SharedState>,
    Path((id, match_id)): Path<(String, Uuid)>,
    Json(payload): Json<RecordHoleRequest>,
) -> Result<Json<ScoreCard>, AppError> {
    payload.validate()?;
    let card = score_service::record_hole(&state, &id, match_id, payload).await?;
    Ok(Json(card))
}

/// Playing handicap and stroke allocation of every side of a match.
#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/matches/{match_id}/handicaps",
    tag = "scores",
    params(
        ("id" = String, Path, description = "Tournament id"),
        ("match_id" = Uuid, Path, description = "Match id")
    ),
    responses(
        (status = 200, description = "Playing handicaps and stroke allocation", body = MatchHandicapsResponse),
        (status = 404, description = "Unknown tournament or match"),
        (status = 409, description = "Match refers to a course or tee that does not exist")
    )
)]
pub async fn get_handicaps(
    State(state): State<SharedState>,
    Path((id, match_id)): Path<(String, Uuid)>,
) -> Result<Json<MatchHandicapsResponse>, AppError> {
    let handicaps = score_service::match_handicaps(&state, &id, match_id).await?;
    Ok(Json(handicaps))
}

/// Points per team across all matches.
#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/standings",
    tag = "scores",
    params(("id" = String, Path, description = "Tournament id")),
    responses(
        (status = 200, description = "Team points and matchup status", body = StandingsResponse),
        (status = 404, description = "Unknown tournament")
    )
)]
pub async fn get_standings(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<StandingsResponse>, AppError> {
    let standings = score_service::standings(&state, &id).await?;
    Ok(Json(standings))
}
