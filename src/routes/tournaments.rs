use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::tournament::{
        CreateTournamentRequest, JoinTournamentRequest, JoinTournamentResponse, TournamentView,
        UpdateTournamentRequest,
    },
    error::AppError,
    routes::passcode::Passcode,
    services::tournament_service,
    state::SharedState,
};

/// Routes creating, reading and editing tournaments.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/tournaments", post(create_tournament))
        .route(
            "/api/tournaments/{id}",
            get(get_tournament).put(update_tournament),
        )
        .route("/api/tournaments/{id}/join", post(join_tournament))
}

/// Create a tournament; the response carries the admin passcode.
#[utoipa::path(
    post,
    path = "/api/tournaments",
    tag = "tournaments",
    request_body = CreateTournamentRequest,
    responses(
        (status = 200, description = "Tournament created", body = TournamentView),
        (status = 400, description = "Invalid name or team names"),
        (status = 503, description = "No store available")
    )
)]
pub async fn create_tournament(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTournamentRequest>,
) -> Result<Json<TournamentView>, AppError> {
    payload.validate()?;
    let view = tournament_service::create_tournament(&state, payload).await?;
    Ok(Json(view))
}

/// Read a tournament; the passcode is shown to admins only.
#[utoipa::path(
    get,
    path = "/api/tournaments/{id}",
    tag = "tournaments",
    params(
        ("id" = String, Path, description = "Six-character tournament id"),
        ("x-tournament-passcode" = Option<String>, Header, description = "Admin passcode; reveals the passcode in the response")
    ),
    responses(
        (status = 200, description = "Tournament", body = TournamentView),
        (status = 401, description = "Wrong passcode"),
        (status = 404, description = "Unknown tournament")
    )
)]
pub async fn get_tournament(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    passcode: Passcode,
) -> Result<Json<TournamentView>, AppError> {
    let view = tournament_service::get_tournament(&state, &id, passcode.as_deref()).await?;
    Ok(Json(view))
}

/// Replace players, matches, courses and team names.
#[utoipa::path(
    put,
    path = "/api/tournaments/{id}",
    tag = "tournaments",
    request_body = UpdateTournamentRequest,
    params(
        ("id" = String, Path, description = "Six-character tournament id"),
        ("x-tournament-passcode" = String, Header, description = "Admin passcode")
    ),
    responses(
        (status = 200, description = "Tournament updated", body = TournamentView),
        (status = 400, description = "Inconsistent players, matches or courses"),
        (status = 401, description = "Missing or wrong passcode"),
        (status = 404, description = "Unknown tournament")
    )
)]
pub async fn update_tournament(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    passcode: Passcode,
    Json(payload): Json<UpdateTournamentRequest>,
) -> Result<Json<TournamentView>, AppError> {
    payload.validate()?;
    let view =
        tournament_service::update_tournament(&state, &id, passcode.as_deref(), payload).await?;
    Ok(Json(view))
}

/// Enter a tournament as admin (with passcode) or scorer.
#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/join",
    tag = "tournaments",
    request_body = JoinTournamentRequest,
    params(("id" = String, Path, description = "Six-character tournament id")),
    responses(
        (status = 200, description = "Joined", body = JoinTournamentResponse),
        (status = 401, description = "Wrong passcode"),
        (status = 404, description = "Unknown tournament")
    )
)]
pub async fn join_tournament(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<JoinTournamentRequest>,
) -> Result<Json<JoinTournamentResponse>, AppError> {
    let joined =
        tournament_service::join_tournament(&state, &id, payload.passcode.as_deref()).await?;
    Ok(Json(joined))
}
