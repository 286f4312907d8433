//! Score cards, handicaps and standings of a tournament's matches.

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    dao::{kv_store::StorePath, models::ScoreCardEntity, storage::StorageError},
    dto::scores::{
        HoleStrokes, MatchHandicapsResponse, MatchStanding, MatchupStanding, PlayerHandicap,
        RecordHoleRequest, StandingsResponse, TeamPoints, UnitHandicap,
    },
    error::ServiceError,
    scoring::{
        handicap::{course_handicap, playing_handicap, stroke_table},
        match_play::{UnitEntry, score_matchup},
    },
    services::tournament_service::{normalize_id, require_tournament},
    state::{
        SharedState,
        course::{Course, Tee},
        tournament::{Match, ScoreCard, Tournament},
    },
};

fn require_match(tournament: &Tournament, match_id: Uuid) -> Result<&Match, ServiceError> {
    tournament
        .find_match(match_id)
        .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}` not found")))
}

async fn read_card(
    state: &SharedState,
    tournament_id: &str,
    match_id: Uuid,
) -> Result<ScoreCard, ServiceError> {
    let store = state.require_store().await?;
    let path = StorePath::scores(tournament_id, match_id);
    let Some(value) = store.get(path.clone()).await? else {
        return Ok(ScoreCard::default());
    };
    let entity = serde_json::from_value::<ScoreCardEntity>(value)
        .map_err(|source| StorageError::decode(&path, source))?;
    Ok(entity.into())
}

/// Overwrite a score card and notify subscribers. Failed writes are logged only.
async fn persist_card(state: &SharedState, tournament_id: &str, match_id: Uuid, card: &ScoreCard) {
    let store = match state.require_store().await {
        Ok(store) => store,
        Err(err) => {
            error!(tournament_id, %match_id, error = %err, "cannot persist score card");
            return;
        }
    };

    let path = StorePath::scores(tournament_id, match_id);
    let value = match serde_json::to_value(ScoreCardEntity::from(card.clone())) {
        Ok(value) => value,
        Err(err) => {
            error!(tournament_id, %match_id, error = %err, "failed to encode score card");
            return;
        }
    };

    if let Err(err) = store.set(path.clone(), value).await {
        error!(tournament_id, %match_id, error = %err, "failed to persist score card");
        return;
    }

    match serde_json::to_value(card) {
        Ok(value) => {
            let delivered = state.sync().publish(&path, value);
            debug!(tournament_id, %match_id, delivered, "score card published");
        }
        Err(err) => warn!(tournament_id, %match_id, error = %err, "failed to encode score update"),
    }
}

/// Current score card of a match; empty when nothing was recorded yet.
pub async fn load_scores(
    state: &SharedState,
    tournament_id: &str,
    match_id: Uuid,
) -> Result<ScoreCard, ServiceError> {
    let tournament_id = normalize_id(tournament_id)?;
    let tournament = require_tournament(state, &tournament_id).await?;
    require_match(&tournament, match_id)?;
    read_card(state, &tournament_id, match_id).await
}

/// Replace the whole score card of a match.
pub async fn save_scores(
    state: &SharedState,
    tournament_id: &str,
    match_id: Uuid,
    card: ScoreCard,
) -> Result<ScoreCard, ServiceError> {
    let tournament_id = normalize_id(tournament_id)?;
    let tournament = require_tournament(state, &tournament_id).await?;
    let game = require_match(&tournament, match_id)?;
    card.check_against(game)?;

    persist_card(state, &tournament_id, match_id, &card).await;
    Ok(card)
}

/// Set or clear one cell. Concurrent writers on the same card: last one wins.
///
/// Only the written cell is checked, so cells left behind by an earlier schedule
/// (a shortened match, a replaced player) never block scoring. Clearing is always allowed.
pub async fn record_hole(
    state: &SharedState,
    tournament_id: &str,
    match_id: Uuid,
    request: RecordHoleRequest,
) -> Result<ScoreCard, ServiceError> {
    let tournament_id = normalize_id(tournament_id)?;
    let tournament = require_tournament(state, &tournament_id).await?;
    let game = require_match(&tournament, match_id)?;
    let participant = request.participant.trim();
    if let Some(strokes) = request.strokes {
        game.check_entry(request.hole, participant, strokes)?;
    }

    let mut card = read_card(state, &tournament_id, match_id).await?;
    card.set(request.hole, participant, request.strokes);

    persist_card(state, &tournament_id, match_id, &card).await;
    Ok(card)
}

/// Playing handicap and per-hole strokes of every scoring unit of `game`.
pub fn unit_handicaps(tournament: &Tournament, game: &Match, tee: &Tee) -> Vec<UnitHandicap> {
    let spec = game.format.spec();
    let slope = f64::from(tee.slope);
    let holes = tee.holes_for(game.holes).unwrap_or_default();

    game.units()
        .into_iter()
        .map(|unit| {
            let players = unit
                .players
                .iter()
                .map(|name| {
                    let handicap_index = tournament
                        .player(name)
                        .map(|player| player.handicap_index)
                        .unwrap_or(0.0);
                    PlayerHandicap {
                        name: name.clone(),
                        handicap_index,
                        course_handicap: course_handicap(handicap_index, slope),
                    }
                })
                .collect::<Vec<_>>();
            let course_handicaps = players
                .iter()
                .map(|player| player.course_handicap)
                .collect::<Vec<_>>();
            let playing = playing_handicap(spec.hcp_type, &course_handicaps);

            UnitHandicap {
                key: unit.key,
                matchup: unit.matchup,
                side: unit.side,
                players,
                playing_handicap: playing,
                strokes: stroke_table(playing, holes.iter().copied())
                    .into_iter()
                    .map(HoleStrokes::from)
                    .collect(),
            }
        })
        .collect()
}

/// Match-play standing of every matchup of `game`.
pub fn match_standing(tournament: &Tournament, game: &Match, tee: &Tee, card: &ScoreCard) -> MatchStanding {
    let spec = game.format.spec();
    let holes = tee.holes_for(game.holes).unwrap_or_default();
    let units = unit_handicaps(tournament, game, tee);

    let mut points = TeamPoints::default();
    let matchups = (0..game.matchups.len())
        .map(|index| {
            let entries = units
                .iter()
                .filter(|unit| unit.matchup == index)
                .map(|unit| UnitEntry {
                    key: unit.key.clone(),
                    side: unit.side,
                    playing_handicap: unit.playing_handicap,
                })
                .collect::<Vec<_>>();
            let outcome = score_matchup(&holes, &entries, card);
            let standing = MatchupStanding::new(index, &outcome, spec.points_per_matchup);
            points.add((standing.points.a, standing.points.b));
            standing
        })
        .collect();

    MatchStanding {
        match_id: game.id,
        name: game.name.clone(),
        format: game.format,
        points_per_matchup: spec.points_per_matchup,
        matchups,
        points,
    }
}

fn resolve_tee<'a>(
    tournament: &'a Tournament,
    game: &Match,
    presets: &'a [Course],
) -> Result<&'a Tee, ServiceError> {
    tournament
        .tee_for(game, presets)
        .map_err(|err| ServiceError::InvalidState(err.to_string()))
}

/// Handicap breakdown of a match.
pub async fn match_handicaps(
    state: &SharedState,
    tournament_id: &str,
    match_id: Uuid,
) -> Result<MatchHandicapsResponse, ServiceError> {
    let tournament_id = normalize_id(tournament_id)?;
    let tournament = require_tournament(state, &tournament_id).await?;
    let game = require_match(&tournament, match_id)?;
    let tee = resolve_tee(&tournament, game, state.config().courses())?;

    Ok(MatchHandicapsResponse {
        match_id,
        format: game.format,
        hcp_type: game.format.spec().hcp_type,
        course_id: game.course_id.clone(),
        tee: tee.name.clone(),
        slope: tee.slope,
        holes: game.holes,
        units: unit_handicaps(&tournament, game, tee),
    })
}

/// Points per team over every match of the tournament.
pub async fn standings(
    state: &SharedState,
    tournament_id: &str,
) -> Result<StandingsResponse, ServiceError> {
    let tournament_id = normalize_id(tournament_id)?;
    let tournament = require_tournament(state, &tournament_id).await?;

    let mut points = TeamPoints::default();
    let mut matches = Vec::with_capacity(tournament.matches.len());
    for game in &tournament.matches {
        let tee = match resolve_tee(&tournament, game, state.config().courses()) {
            Ok(tee) => tee,
            Err(err) => {
                warn!(tournament_id = %tournament_id, match_id = %game.id, error = %err, "skipping match without a usable tee");
                continue;
            }
        };
        let card = read_card(state, &tournament_id, game.id).await?;
        let standing = match_standing(&tournament, game, tee, &card);
        points.add((standing.points.a, standing.points.b));
        matches.push(standing);
    }

    Ok(StandingsResponse {
        team_names: tournament.team_names.clone(),
        points,
        matches,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use super::*;
    use crate::{
        dao::models::TournamentEntity,
        state::{
            testing::memory_state,
            tournament::{TeamSide, fixtures::tournament},
        },
    };

    async fn seeded() -> (SharedState, Tournament) {
        let state = memory_state().await;
        let tournament = tournament();
        let store = state.require_store().await.unwrap();
        store
            .set(
                StorePath::tournament(tournament.id.as_str()),
                serde_json::to_value(TournamentEntity::from(tournament.clone())).unwrap(),
            )
            .await
            .unwrap();
        (state, tournament)
    }

    fn hole(number: u8, participant: &str, strokes: Option<u8>) -> RecordHoleRequest {
        RecordHoleRequest {
            hole: number,
            participant: participant.to_string(),
            strokes,
        }
    }

    #[tokio::test]
    async fn empty_card_until_scores_are_recorded() {
        let (state, tournament) = seeded().await;
        let singles = tournament.matches[0].id;
        let card = load_scores(&state, &tournament.id, singles).await.unwrap();
        assert_eq!(card, ScoreCard::default());

        record_hole(&state, &tournament.id, singles, hole(1, "Ann", Some(4)))
            .await
            .unwrap();
        record_hole(&state, &tournament.id, singles, hole(1, "Cat", Some(5)))
            .await
            .unwrap();
        let card = load_scores(&state, &tournament.id, singles).await.unwrap();
        assert_eq!(card.strokes(1, "Ann"), Some(4));
        assert_eq!(card.strokes(1, "Cat"), Some(5));

        record_hole(&state, &tournament.id, singles, hole(1, "Ann", None))
            .await
            .unwrap();
        let card = load_scores(&state, &tournament.id, singles).await.unwrap();
        assert_eq!(card.strokes(1, "Ann"), None);
    }

    #[tokio::test]
    async fn cells_outside_the_match_are_rejected() {
        let (state, tournament) = seeded().await;
        let scramble = tournament.matches[1].id;

        // Nine-hole match.
        assert!(matches!(
            record_hole(&state, &tournament.id, scramble, hole(10, "m1-a", Some(4))).await,
            Err(ServiceError::InvalidInput(_))
        ));
        // One-ball format: individual names are not participants.
        assert!(matches!(
            record_hole(&state, &tournament.id, scramble, hole(1, "Ann", Some(4))).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(record_hole(&state, &tournament.id, scramble, hole(1, "m1-a", Some(4)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn leftover_cells_do_not_block_new_entries() {
        let (state, mut tournament) = seeded().await;
        let singles = tournament.matches[0].id;
        record_hole(&state, &tournament.id, singles, hole(15, "Ann", Some(4)))
            .await
            .unwrap();

        // Shortened to nine holes once hole 15 was already on the card.
        tournament.matches[0].holes = 9;
        let store = state.require_store().await.unwrap();
        store
            .set(
                StorePath::tournament(tournament.id.as_str()),
                serde_json::to_value(TournamentEntity::from(tournament.clone())).unwrap(),
            )
            .await
            .unwrap();

        let card = record_hole(&state, &tournament.id, singles, hole(1, "Cat", Some(5)))
            .await
            .unwrap();
        assert_eq!(card.strokes(1, "Cat"), Some(5));
        assert!(matches!(
            record_hole(&state, &tournament.id, singles, hole(12, "Cat", Some(5))).await,
            Err(ServiceError::InvalidInput(_))
        ));

        let card = record_hole(&state, &tournament.id, singles, hole(15, "Ann", None))
            .await
            .unwrap();
        assert_eq!(card.strokes(15, "Ann"), None);
    }

    #[tokio::test]
    async fn unknown_match_is_not_found() {
        let (state, tournament) = seeded().await;
        assert!(matches!(
            load_scores(&state, &tournament.id, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn score_updates_are_published() {
        let (state, tournament) = seeded().await;
        let singles = tournament.matches[0].id;
        let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
        let sink = seen.clone();
        let _subscription = state.sync().subscribe(
            &StorePath::scores(tournament.id.as_str(), singles),
            move |value| sink.lock().unwrap().push(value.clone()),
        );

        record_hole(&state, &tournament.id, singles, hole(3, "Bob", Some(6)))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["holes"]["3"]["Bob"], 6);
    }

    #[tokio::test]
    async fn unwatched_cards_are_not_kept_in_memory() {
        let (state, tournament) = seeded().await;
        let singles = tournament.matches[0].id;
        let path = StorePath::scores(tournament.id.as_str(), singles);
        record_hole(&state, &tournament.id, singles, hole(2, "Dan", Some(7)))
            .await
            .unwrap();
        assert_eq!(state.sync().listener_count(&path), 0);

        let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
        let sink = seen.clone();
        let _subscription = state
            .sync()
            .subscribe(&path, move |value| sink.lock().unwrap().push(value.clone()));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn scramble_handicaps_use_three_quarters_of_the_average() {
        let (state, tournament) = seeded().await;
        let scramble = tournament.matches[1].id;
        let response = match_handicaps(&state, &tournament.id, scramble).await.unwrap();

        // White tee, slope 125: Ann 4.2 -> 5, Bob 18.0 -> 20; avg 12.5 * 0.75 = 9.375 -> 9.
        let side_a = &response.units[0];
        assert_eq!(side_a.key, "m1-a");
        assert_eq!(
            side_a
                .players
                .iter()
                .map(|p| p.course_handicap)
                .collect::<Vec<_>>(),
            vec![5, 20]
        );
        assert_eq!(side_a.playing_handicap, 9);
        assert_eq!(side_a.strokes.len(), 9);
        assert!(side_a.strokes.iter().all(|s| s.strokes == 1));
    }

    #[tokio::test]
    async fn standings_sum_points_across_matches() {
        let (state, tournament) = seeded().await;
        let singles = tournament.matches[0].id;
        let scramble = tournament.matches[1].id;

        // Singles: Ann beats Cat on every hole, Bob and Dan have not started.
        let mut singles_card = ScoreCard::default();
        for number in 1..=18 {
            singles_card.set(number, "Ann", Some(2));
            singles_card.set(number, "Cat", Some(6));
        }
        save_scores(&state, &tournament.id, singles, singles_card)
            .await
            .unwrap();

        // Scramble: both sides get a stroke on every hole of the front nine, B is a shot better.
        let mut scramble_card = ScoreCard::default();
        for number in 1..=9 {
            scramble_card.set(number, "m1-a", Some(5));
            scramble_card.set(number, "m1-b", Some(4));
        }
        save_scores(&state, &tournament.id, scramble, scramble_card)
            .await
            .unwrap();

        let table = standings(&state, &tournament.id).await.unwrap();
        assert_eq!(table.matches.len(), 2);

        let singles_standing = &table.matches[0];
        assert_eq!(singles_standing.matchups[0].winner, Some(TeamSide::A));
        assert_eq!(singles_standing.matchups[1].status, "in_progress");

        let scramble_standing = &table.matches[1];
        assert_eq!(scramble_standing.matchups[0].winner, Some(TeamSide::B));

        assert_eq!(table.points, TeamPoints { a: 1.0, b: 1.0 });
    }
}
