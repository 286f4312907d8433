use std::{collections::BTreeMap, time::SystemTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::state::{
    course::Course,
    tournament::{Match, Player, ScoreCard, TeamNames, Tournament},
};

/// Tournament record as persisted at `tournaments/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TournamentEntity {
    /// Six-character join code, also the last path segment.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Admin passcode.
    pub passcode: String,
    /// Team display names.
    #[serde(default)]
    pub team_names: TeamNames,
    /// Registered players.
    #[serde(default)]
    pub players: Vec<Player>,
    /// Scheduled matches.
    #[serde(default)]
    pub matches: Vec<Match>,
    /// Courses attached to the tournament.
    #[serde(default)]
    pub courses: Vec<Course>,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Last time the record was written.
    pub updated_at: SystemTime,
}

/// Score card of one match as persisted at `scores/{tournament_id}/{match_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreCardEntity {
    /// Hole number, then participant key, then gross strokes.
    #[serde(default)]
    pub holes: BTreeMap<u8, IndexMap<String, u8>>,
    /// Last time the card was written.
    pub updated_at: SystemTime,
}

impl From<Tournament> for TournamentEntity {
    fn from(value: Tournament) -> Self {
        Self {
            id: value.id,
            name: value.name,
            passcode: value.passcode,
            team_names: value.team_names,
            players: value.players,
            matches: value.matches,
            courses: value.courses,
            created_at: value.created_at,
            updated_at: SystemTime::now(),
        }
    }
}

impl From<TournamentEntity> for Tournament {
    fn from(value: TournamentEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            passcode: value.passcode,
            team_names: value.team_names,
            players: value.players,
            matches: value.matches,
            courses: value.courses,
            created_at: value.created_at,
        }
    }
}

impl From<ScoreCard> for ScoreCardEntity {
    fn from(value: ScoreCard) -> Self {
        Self {
            holes: value.holes,
            updated_at: SystemTime::now(),
        }
    }
}

impl From<ScoreCardEntity> for ScoreCard {
    fn from(value: ScoreCardEntity) -> Self {
        Self { holes: value.holes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tournament::fixtures::tournament;

    #[test]
    fn tournament_survives_the_stored_shape() {
        let original = tournament();
        let entity = TournamentEntity::from(original.clone());
        let encoded = serde_json::to_value(&entity).unwrap();
        let decoded: TournamentEntity = serde_json::from_value(encoded).unwrap();
        assert_eq!(Tournament::from(decoded), original);
    }

    #[test]
    fn score_card_hole_numbers_are_string_keys_on_the_wire() {
        let mut card = ScoreCard::default();
        card.set(3, "Ann", Some(5));
        let encoded = serde_json::to_value(ScoreCardEntity::from(card.clone())).unwrap();
        assert_eq!(encoded["holes"]["3"]["Ann"], 5);
        let decoded: ScoreCardEntity = serde_json::from_value(encoded).unwrap();
        assert_eq!(ScoreCard::from(decoded), card);
    }
}
