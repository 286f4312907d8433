use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    scoring::match_play::MatchupOutcome,
    state::{
        format::{Format, HandicapType},
        tournament::{TeamNames, TeamSide},
    },
};

/// Set or clear a single cell of a score card.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RecordHoleRequest {
    #[validate(range(min = 1, max = 18))]
    pub hole: u8,
    /// Player name, or `m{matchup}-{side}` for one-ball formats.
    #[validate(length(min = 1))]
    pub participant: String,
    /// Gross strokes; `null` clears the cell.
    #[serde(default)]
    #[validate(range(min = 1, max = 20))]
    pub strokes: Option<u8>,
}

/// Strokes a unit receives on one hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HoleStrokes {
    pub hole: u8,
    pub strokes: u8,
}

impl From<(u8, u8)> for HoleStrokes {
    fn from((hole, strokes): (u8, u8)) -> Self {
        Self { hole, strokes }
    }
}

/// Handicaps of one player on the match tee.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlayerHandicap {
    pub name: String,
    pub handicap_index: f64,
    pub course_handicap: u32,
}

/// Handicap breakdown of one scoring unit of a match.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UnitHandicap {
    /// Participant key used on the score card.
    pub key: String,
    /// Zero-based matchup index.
    pub matchup: usize,
    pub side: TeamSide,
    pub players: Vec<PlayerHandicap>,
    pub playing_handicap: u32,
    pub strokes: Vec<HoleStrokes>,
}

/// Handicap breakdown of a match on its tee.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchHandicapsResponse {
    pub match_id: Uuid,
    pub format: Format,
    pub hcp_type: HandicapType,
    pub course_id: String,
    pub tee: String,
    pub slope: u32,
    pub holes: u8,
    pub units: Vec<UnitHandicap>,
}

/// Points per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct TeamPoints {
    pub a: f64,
    pub b: f64,
}

impl TeamPoints {
    pub fn add(&mut self, (a, b): (f64, f64)) {
        self.a += a;
        self.b += b;
    }
}

/// Running result of one matchup.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MatchupStanding {
    pub matchup: usize,
    /// `in_progress`, `won` or `halved`.
    pub status: String,
    pub winner: Option<TeamSide>,
    /// Holes won by team A minus holes won by team B.
    pub a_up: i32,
    pub holes_played: u8,
    pub holes_remaining: u8,
    pub points: TeamPoints,
}

impl MatchupStanding {
    pub fn new(matchup: usize, outcome: &MatchupOutcome, points_per_matchup: f64) -> Self {
        let (a, b) = outcome.points(points_per_matchup);
        Self {
            matchup,
            status: outcome.status.as_str().to_string(),
            winner: outcome.status.winner(),
            a_up: outcome.a_up,
            holes_played: outcome.holes_played,
            holes_remaining: outcome.holes_remaining,
            points: TeamPoints { a, b },
        }
    }
}

/// Matchup results and points of one match.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MatchStanding {
    pub match_id: Uuid,
    pub name: String,
    pub format: Format,
    pub points_per_matchup: f64,
    pub matchups: Vec<MatchupStanding>,
    pub points: TeamPoints,
}

/// Tournament-wide team points.
#[derive(Debug, Serialize, ToSchema)]
pub struct StandingsResponse {
    pub team_names: TeamNames,
    pub points: TeamPoints,
    pub matches: Vec<MatchStanding>,
}
