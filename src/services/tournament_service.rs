use std::time::SystemTime;

use tracing::{error, info, warn};

use crate::{
    dao::{
        kv_store::StorePath,
        models::TournamentEntity,
        storage::StorageError,
    },
    dto::{
        format_system_time,
        tournament::{
            CreateTournamentRequest, JoinTournamentResponse, TournamentView,
            UpdateTournamentRequest,
        },
    },
    error::ServiceError,
    state::{
        SharedState,
        access::{Role, authorize, require_admin},
        tournament::{TOURNAMENT_ID_LENGTH, Tournament, normalize_code},
    },
};

/// Fresh ids are drawn again when they collide with a stored tournament.
const MAX_ID_ATTEMPTS: usize = 8;

/// Canonical form of a user-supplied tournament id.
pub fn normalize_id(raw: &str) -> Result<String, ServiceError> {
    normalize_code(raw, TOURNAMENT_ID_LENGTH)
        .ok_or_else(|| ServiceError::NotFound(format!("tournament `{}` not found", raw.trim())))
}

/// Create a tournament, persist it and return the admin view.
pub async fn create_tournament(
    state: &SharedState,
    request: CreateTournamentRequest,
) -> Result<TournamentView, ServiceError> {
    let store = state.require_store().await?;
    let created_at = format_system_time(SystemTime::now());
    let team_names = request.team_names.unwrap_or_default();
    let name = request.name.trim().to_string();

    let mut fresh = None;
    for attempt in 1..=MAX_ID_ATTEMPTS {
        let candidate = Tournament::new(name.clone(), team_names.clone(), created_at.clone());
        let path = StorePath::tournament(candidate.id.as_str());
        if store.get(path).await?.is_none() {
            fresh = Some(candidate);
            break;
        }
        warn!(tournament_id = %candidate.id, attempt, "generated tournament id already taken");
    }
    let Some(tournament) = fresh else {
        return Err(ServiceError::InvalidState(format!(
            "no free tournament id after {MAX_ID_ATTEMPTS} attempts"
        )));
    };

    save_tournament(state, &tournament.id, &tournament).await;
    info!(tournament_id = %tournament.id, name = %tournament.name, "tournament created");
    Ok(TournamentView::for_role(&tournament, Role::Admin))
}

/// One-shot read of the stored tournament, `None` when absent.
pub async fn load_tournament(
    state: &SharedState,
    id: &str,
) -> Result<Option<Tournament>, ServiceError> {
    let store = state.require_store().await?;
    let path = StorePath::tournament(id);
    let Some(value) = store.get(path.clone()).await? else {
        return Ok(None);
    };
    let entity = serde_json::from_value::<TournamentEntity>(value)
        .map_err(|source| StorageError::decode(&path, source))?;
    Ok(Some(entity.into()))
}

/// Like [`load_tournament`] but absence is an error.
pub async fn require_tournament(state: &SharedState, id: &str) -> Result<Tournament, ServiceError> {
    load_tournament(state, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("tournament `{id}` not found")))
}

/// Overwrite the tournament stored under `id` and notify subscribers.
///
/// A failed write is logged and otherwise ignored; nothing is retried.
pub async fn save_tournament(state: &SharedState, id: &str, data: &Tournament) {
    let store = match state.require_store().await {
        Ok(store) => store,
        Err(err) => {
            error!(tournament_id = %id, error = %err, "cannot persist tournament");
            return;
        }
    };

    let path = StorePath::tournament(id);
    let value = match serde_json::to_value(TournamentEntity::from(data.clone())) {
        Ok(value) => value,
        Err(err) => {
            error!(tournament_id = %id, error = %err, "failed to encode tournament");
            return;
        }
    };

    if let Err(err) = store.set(path.clone(), value).await {
        error!(tournament_id = %id, error = %err, "failed to persist tournament");
        return;
    }

    publish_tournament(state, &path, data);
}

/// Push the scorer view of `data` to every client following it.
fn publish_tournament(state: &SharedState, path: &StorePath, data: &Tournament) {
    match serde_json::to_value(TournamentView::for_role(data, Role::Scorer)) {
        Ok(view) => {
            state.sync().publish(path, view);
        }
        Err(err) => warn!(tournament_id = %data.id, error = %err, "failed to encode tournament update"),
    }
}

/// Read a tournament; the passcode is included when `passcode` matches.
pub async fn get_tournament(
    state: &SharedState,
    id: &str,
    passcode: Option<&str>,
) -> Result<TournamentView, ServiceError> {
    let id = normalize_id(id)?;
    let tournament = require_tournament(state, &id).await?;
    let role = authorize(&tournament.passcode, passcode)?;
    Ok(TournamentView::for_role(&tournament, role))
}

/// Resolve the caller's role for a tournament.
pub async fn join_tournament(
    state: &SharedState,
    id: &str,
    passcode: Option<&str>,
) -> Result<JoinTournamentResponse, ServiceError> {
    let id = normalize_id(id)?;
    let tournament = require_tournament(state, &id).await?;
    let role = authorize(&tournament.passcode, passcode)?;
    info!(tournament_id = %id, role = ?role, "joined tournament");
    Ok(JoinTournamentResponse {
        role,
        tournament: TournamentView::for_role(&tournament, role),
    })
}

/// Replace the editable parts of a tournament. Admin only.
pub async fn update_tournament(
    state: &SharedState,
    id: &str,
    passcode: Option<&str>,
    request: UpdateTournamentRequest,
) -> Result<TournamentView, ServiceError> {
    let id = normalize_id(id)?;
    let current = require_tournament(state, &id).await?;
    require_admin(&current.passcode, passcode)?;

    let updated = Tournament {
        id: current.id,
        passcode: current.passcode,
        created_at: current.created_at,
        name: request.name.trim().to_string(),
        team_names: request.team_names,
        players: request
            .players
            .into_iter()
            .map(|mut player| {
                player.name = player.name.trim().to_string();
                player
            })
            .collect(),
        matches: request.matches.into_iter().map(Into::into).collect(),
        courses: request.courses,
    };
    updated.validate(state.config().courses())?;

    save_tournament(state, &updated.id, &updated).await;
    info!(
        tournament_id = %updated.id,
        players = updated.players.len(),
        matches = updated.matches.len(),
        "tournament updated"
    );
    Ok(TournamentView::for_role(&updated, Role::Admin))
}
