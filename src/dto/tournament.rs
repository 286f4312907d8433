use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::validation::validate_team_names,
    state::{
        access::Role,
        course::Course,
        format::Format,
        tournament::{Match, Matchup, Player, TeamNames, Tournament},
    },
};

/// Payload creating a new tournament. The caller becomes its admin.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTournamentRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    /// Defaults to "Team A" and "Team B".
    #[serde(default)]
    #[validate(custom(function = "validate_team_names"))]
    pub team_names: Option<TeamNames>,
}

/// Full replacement of the editable parts of a tournament.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateTournamentRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(custom(function = "validate_team_names"))]
    pub team_names: TeamNames,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<MatchInput>,
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// Match as sent by the admin; new matches omit the id.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MatchInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub format: Format,
    pub course_id: String,
    pub tee: String,
    pub holes: u8,
    #[serde(default)]
    pub matchups: Vec<Matchup>,
}

impl From<MatchInput> for Match {
    fn from(value: MatchInput) -> Self {
        Self {
            id: value.id.unwrap_or_else(Uuid::new_v4),
            name: value.name,
            format: value.format,
            course_id: value.course_id,
            tee: value.tee,
            holes: value.holes,
            matchups: value.matchups,
        }
    }
}

/// Request body of the join endpoint.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct JoinTournamentRequest {
    /// Admin passcode. Omit to join as a scorer.
    #[serde(default)]
    pub passcode: Option<String>,
}

/// Tournament as seen by a caller; the passcode is only present for admins.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TournamentView {
    pub id: String,
    pub name: String,
    pub passcode: Option<String>,
    pub team_names: TeamNames,
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    pub courses: Vec<Course>,
    pub created_at: String,
}

impl TournamentView {
    pub fn for_role(tournament: &Tournament, role: Role) -> Self {
        Self {
            id: tournament.id.clone(),
            name: tournament.name.clone(),
            passcode: match role {
                Role::Admin => Some(tournament.passcode.clone()),
                Role::Scorer => None,
            },
            team_names: tournament.team_names.clone(),
            players: tournament.players.clone(),
            matches: tournament.matches.clone(),
            courses: tournament.courses.clone(),
            created_at: tournament.created_at.clone(),
        }
    }
}

/// Result of joining a tournament.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinTournamentResponse {
    pub role: Role,
    pub tournament: TournamentView,
}
