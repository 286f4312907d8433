use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    course::{Course, Tee, find_course},
    format::{Format, FormatSpec, ScoringUnit},
};

/// Length of a tournament join code.
pub const TOURNAMENT_ID_LENGTH: usize = 6;
/// Length of the admin passcode.
pub const PASSCODE_LENGTH: usize = 4;
/// Highest stroke count accepted for a single hole.
pub const MAX_HOLE_STROKES: u8 = 20;

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// One of the two competing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    /// First team.
    A,
    /// Second team.
    B,
}

impl TeamSide {
    /// Lowercase letter used in participant keys.
    pub fn letter(self) -> char {
        match self {
            TeamSide::A => 'a',
            TeamSide::B => 'b',
        }
    }
}

/// Display names of both teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamNames {
    /// Name of [`TeamSide::A`].
    pub a: String,
    /// Name of [`TeamSide::B`].
    pub b: String,
}

impl Default for TeamNames {
    fn default() -> Self {
        Self {
            a: "Team A".to_string(),
            b: "Team B".to_string(),
        }
    }
}

impl TeamNames {
    /// Name of `side`.
    pub fn name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::A => &self.a,
            TeamSide::B => &self.b,
        }
    }
}

/// A golfer registered in a tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// Unique within the tournament, ignoring case.
    pub name: String,
    /// World Handicap System index.
    pub handicap_index: f64,
    /// Team the player belongs to.
    pub team: TeamSide,
}

/// Players facing each other in one scored contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Matchup {
    /// Player names for team A.
    pub side_a: Vec<String>,
    /// Player names for team B.
    pub side_b: Vec<String>,
}

impl Matchup {
    /// Players of `side`.
    pub fn side(&self, side: TeamSide) -> &[String] {
        match side {
            TeamSide::A => &self.side_a,
            TeamSide::B => &self.side_b,
        }
    }
}

/// A scheduled contest on a given course and tee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Match {
    /// Stable id; score cards are stored under it.
    pub id: Uuid,
    /// Display name, e.g. "Saturday fourball".
    pub name: String,
    /// Format deciding handicaps and scoring units.
    pub format: Format,
    /// Attached or preset course.
    pub course_id: String,
    /// Tee name on that course.
    pub tee: String,
    /// 9 or 18.
    pub holes: u8,
    /// Contests making up the match.
    pub matchups: Vec<Matchup>,
}

/// A group of players that shares one score line on the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchUnit {
    /// Participant key used in the [`ScoreCard`].
    pub key: String,
    /// Index of the matchup within the match.
    pub matchup: usize,
    /// Team the unit plays for.
    pub side: TeamSide,
    /// Players sharing the score line.
    pub players: Vec<String>,
}

impl Match {
    /// Scoring units of this match: one per side for team formats, one per player otherwise.
    pub fn units(&self) -> Vec<MatchUnit> {
        let spec = self.format.spec();
        let mut units = Vec::new();
        for (index, matchup) in self.matchups.iter().enumerate() {
            for side in [TeamSide::A, TeamSide::B] {
                let players = matchup.side(side);
                match spec.scoring_unit {
                    ScoringUnit::Team => units.push(MatchUnit {
                        key: team_unit_key(index, side),
                        matchup: index,
                        side,
                        players: players.to_vec(),
                    }),
                    ScoringUnit::Individual => {
                        units.extend(players.iter().map(|player| MatchUnit {
                            key: player.clone(),
                            matchup: index,
                            side,
                            players: vec![player.clone()],
                        }))
                    }
                }
            }
        }
        units
    }

    /// Check a single score entry against the holes and participants of this match.
    pub fn check_entry(&self, hole: u8, participant: &str, strokes: u8) -> Result<(), TournamentError> {
        check_cell(self, &participant_keys(self), hole, participant, strokes)
    }
}

/// Participant key of a one-ball side, e.g. `m1-a`.
pub fn team_unit_key(matchup: usize, side: TeamSide) -> String {
    format!("m{}-{}", matchup + 1, side.letter())
}

/// Per-hole strokes of a match: hole number, then participant key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreCard {
    /// Gross strokes keyed by hole number, then participant key.
    #[schema(value_type = Object)]
    pub holes: BTreeMap<u8, IndexMap<String, u8>>,
}

impl ScoreCard {
    /// Gross strokes of `participant` on `hole`, if recorded.
    pub fn strokes(&self, hole: u8, participant: &str) -> Option<u8> {
        self.holes.get(&hole)?.get(participant).copied()
    }

    /// Set or clear one cell, dropping holes that become empty.
    pub fn set(&mut self, hole: u8, participant: &str, strokes: Option<u8>) {
        match strokes {
            Some(value) => {
                self.holes
                    .entry(hole)
                    .or_default()
                    .insert(participant.to_string(), value);
            }
            None => {
                if let Some(entries) = self.holes.get_mut(&hole) {
                    entries.shift_remove(participant);
                    if entries.is_empty() {
                        self.holes.remove(&hole);
                    }
                }
            }
        }
    }

    /// Check every cell against the holes and participants of `game`.
    pub fn check_against(&self, game: &Match) -> Result<(), TournamentError> {
        let keys = participant_keys(game);
        for (&hole, entries) in &self.holes {
            for (participant, &strokes) in entries {
                check_cell(game, &keys, hole, participant, strokes)?;
            }
        }
        Ok(())
    }
}

fn participant_keys(game: &Match) -> HashSet<String> {
    game.units().into_iter().map(|unit| unit.key).collect()
}

fn check_cell(
    game: &Match,
    keys: &HashSet<String>,
    hole: u8,
    participant: &str,
    strokes: u8,
) -> Result<(), TournamentError> {
    if hole == 0 || hole > game.holes {
        return Err(TournamentError::HoleOutOfRange {
            hole,
            holes: game.holes,
        });
    }
    if !keys.contains(participant) {
        return Err(TournamentError::UnknownParticipant(participant.to_string()));
    }
    if strokes == 0 || strokes > MAX_HOLE_STROKES {
        return Err(TournamentError::InvalidStrokes { hole, strokes });
    }
    Ok(())
}

/// Aggregate tournament record persisted at `tournaments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    /// Six-character join code.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Four-character admin passcode.
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
    /// Courses attached by the admin, usually from a course search.
    #[serde(default)]
    pub courses: Vec<Course>,
    /// RFC 3339 creation time.
    pub created_at: String,
}

impl Tournament {
    /// Fresh tournament with generated id and passcode and nothing scheduled.
    pub fn new(name: String, team_names: TeamNames, created_at: String) -> Self {
        Self {
            id: generate_code(TOURNAMENT_ID_LENGTH),
            name,
            passcode: generate_code(PASSCODE_LENGTH),
            team_names,
            players: Vec::new(),
            matches: Vec::new(),
            courses: Vec::new(),
            created_at,
        }
    }

    /// Registered player named exactly `name`.
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name == name)
    }

    /// Scheduled match with id `id`.
    pub fn find_match(&self, id: Uuid) -> Option<&Match> {
        self.matches.iter().find(|game| game.id == id)
    }

    /// Resolve the tee a match is played from, looking at attached courses then `presets`.
    pub fn tee_for<'a>(&'a self, game: &Match, presets: &'a [Course]) -> Result<&'a Tee, TournamentError> {
        let course = find_course(&self.courses, presets, &game.course_id)
            .ok_or_else(|| TournamentError::UnknownCourse(game.course_id.clone()))?;
        course
            .tee(&game.tee)
            .ok_or_else(|| TournamentError::UnknownTee {
                course: game.course_id.clone(),
                tee: game.tee.clone(),
            })
    }

    /// Validate roster, courses and schedule together.
    pub fn validate(&self, presets: &[Course]) -> Result<(), TournamentError> {
        if self.name.trim().is_empty() {
            return Err(TournamentError::EmptyName);
        }

        let mut names = HashSet::new();
        for player in &self.players {
            let key = player.name.trim().to_lowercase();
            if key.is_empty() {
                return Err(TournamentError::EmptyPlayerName);
            }
            if !player.handicap_index.is_finite() {
                return Err(TournamentError::InvalidHandicap(player.name.clone()));
            }
            if !names.insert(key) {
                return Err(TournamentError::DuplicatePlayer(player.name.clone()));
            }
        }

        let mut course_ids = HashSet::new();
        for course in &self.courses {
            if course.id.trim().is_empty() {
                return Err(TournamentError::MissingCourseId(course.name.clone()));
            }
            if !course_ids.insert(course.id.as_str()) {
                return Err(TournamentError::DuplicateCourse(course.id.clone()));
            }
        }

        let mut match_ids = HashSet::new();
        for game in &self.matches {
            if !match_ids.insert(game.id) {
                return Err(TournamentError::DuplicateMatch(game.id));
            }
            self.validate_match(game, presets)?;
        }
        Ok(())
    }

    fn validate_match(&self, game: &Match, presets: &[Course]) -> Result<(), TournamentError> {
        let spec: &FormatSpec = game.format.spec();
        if !spec.allows_holes(game.holes) {
            return Err(TournamentError::InvalidHoleCount(game.holes));
        }

        let tee = self.tee_for(game, presets)?;
        if tee.holes_for(game.holes).is_none() {
            return Err(TournamentError::IncompleteCard {
                tee: tee.name.clone(),
                holes: game.holes,
            });
        }

        if game.matchups.len() != usize::from(spec.num_matchups) {
            return Err(TournamentError::MatchupCount {
                format: spec.label,
                expected: spec.num_matchups,
                actual: game.matchups.len(),
            });
        }

        let mut seen = HashSet::new();
        for matchup in &game.matchups {
            for side in [TeamSide::A, TeamSide::B] {
                let players = matchup.side(side);
                if players.len() != usize::from(spec.players_per_side) {
                    return Err(TournamentError::SideSize {
                        format: spec.label,
                        expected: spec.players_per_side,
                        actual: players.len(),
                    });
                }
                for name in players {
                    let player = self
                        .player(name)
                        .ok_or_else(|| TournamentError::UnknownPlayer(name.clone()))?;
                    if player.team != side {
                        return Err(TournamentError::WrongTeam(name.clone()));
                    }
                    if !seen.insert(name.as_str()) {
                        return Err(TournamentError::PlayerTwiceInMatch(name.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Validation failures of tournament records and score cards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    /// Blank tournament name.
    #[error("tournament name must not be empty")]
    EmptyName,
    /// Blank player name.
    #[error("player name must not be empty")]
    EmptyPlayerName,
    /// Handicap index is NaN or infinite.
    #[error("player `{0}` has an invalid handicap index")]
    InvalidHandicap(String),
    /// Two players share a name, ignoring case.
    #[error("duplicate player `{0}`")]
    DuplicatePlayer(String),
    /// Attached course without an id.
    #[error("course `{0}` has no id")]
    MissingCourseId(String),
    /// Two attached courses share an id.
    #[error("duplicate course id `{0}`")]
    DuplicateCourse(String),
    /// Two matches share an id.
    #[error("duplicate match id `{0}`")]
    DuplicateMatch(Uuid),
    /// Match length other than 9 or 18.
    #[error("matches are played over 9 or 18 holes, got {0}")]
    InvalidHoleCount(u8),
    /// Course id neither attached nor preset.
    #[error("unknown course `{0}`")]
    UnknownCourse(String),
    /// Tee missing from the course.
    #[error("course `{course}` has no tee named `{tee}`")]
    UnknownTee {
        /// Course id.
        course: String,
        /// Requested tee.
        tee: String,
    },
    /// Tee card lacks some of the holes the match is played over.
    #[error("tee `{tee}` does not cover holes 1 to {holes}")]
    IncompleteCard {
        /// Tee name.
        tee: String,
        /// Match length.
        holes: u8,
    },
    /// Wrong number of matchups for the format.
    #[error("{format} needs {expected} matchup(s), got {actual}")]
    MatchupCount {
        /// Format label.
        format: &'static str,
        /// Matchups the format requires.
        expected: u8,
        /// Matchups supplied.
        actual: usize,
    },
    /// Wrong number of players on a side.
    #[error("{format} needs {expected} player(s) per side, got {actual}")]
    SideSize {
        /// Format label.
        format: &'static str,
        /// Players per side the format requires.
        expected: u8,
        /// Players supplied.
        actual: usize,
    },
    /// Matchup names a player not on the roster.
    #[error("unknown player `{0}`")]
    UnknownPlayer(String),
    /// Player placed on the other team's side.
    #[error("player `{0}` is listed on the wrong team's side")]
    WrongTeam(String),
    /// Player listed in two places of one match.
    #[error("player `{0}` appears twice in the same match")]
    PlayerTwiceInMatch(String),
    /// Score for a hole the match does not include.
    #[error("hole {hole} is outside a {holes}-hole match")]
    HoleOutOfRange {
        /// Hole written.
        hole: u8,
        /// Match length.
        holes: u8,
    },
    /// Score for a key that is not a scoring unit of the match.
    #[error("unknown participant `{0}`")]
    UnknownParticipant(String),
    /// Stroke count outside `1..=MAX_HOLE_STROKES`.
    #[error("invalid stroke count {strokes} on hole {hole}")]
    InvalidStrokes {
        /// Hole written.
        hole: u8,
        /// Rejected count.
        strokes: u8,
    },
}

/// Random uppercase base-36 code. Not cryptographically secure.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Normalise user-typed codes (trim, uppercase) and check their shape.
pub fn normalize_code(raw: &str, length: usize) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    let valid = code.len() == length
        && code
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
    valid.then_some(code)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::state::course::fixtures::course;

    pub fn player(name: &str, handicap_index: f64, team: TeamSide) -> Player {
        Player {
            name: name.to_string(),
            handicap_index,
            team,
        }
    }

    pub fn singles_match(a: [&str; 2], b: [&str; 2]) -> Match {
        Match {
            id: Uuid::new_v4(),
            name: "Sunday singles".to_string(),
            format: Format::Singles,
            course_id: "pines".to_string(),
            tee: "Blue".to_string(),
            holes: 18,
            matchups: vec![
                Matchup {
                    side_a: vec![a[0].to_string()],
                    side_b: vec![b[0].to_string()],
                },
                Matchup {
                    side_a: vec![a[1].to_string()],
                    side_b: vec![b[1].to_string()],
                },
            ],
        }
    }

    pub fn scramble_match() -> Match {
        Match {
            id: Uuid::new_v4(),
            name: "Friday scramble".to_string(),
            format: Format::Scramble,
            course_id: "pines".to_string(),
            tee: "White".to_string(),
            holes: 9,
            matchups: vec![Matchup {
                side_a: vec!["Ann".to_string(), "Bob".to_string()],
                side_b: vec!["Cat".to_string(), "Dan".to_string()],
            }],
        }
    }

    pub fn tournament() -> Tournament {
        let mut tournament = Tournament::new(
            "Links Cup".to_string(),
            TeamNames::default(),
            "2026-10-16T09:00:00Z".to_string(),
        );
        tournament.players = vec![
            player("Ann", 4.2, TeamSide::A),
            player("Bob", 18.0, TeamSide::A),
            player("Cat", 9.6, TeamSide::B),
            player("Dan", 25.1, TeamSide::B),
        ];
        tournament.courses = vec![course("pines")];
        tournament.matches = vec![
            singles_match(["Ann", "Bob"], ["Cat", "Dan"]),
            scramble_match(),
        ];
        tournament
    }
}

#[cfg(test)]
mod tests {
    use super::{fixtures::*, *};

    #[test]
    fn generated_codes_have_expected_shape() {
        for _ in 0..200 {
            let id = generate_code(TOURNAMENT_ID_LENGTH);
            let passcode = generate_code(PASSCODE_LENGTH);
            assert_eq!(id.len(), 6);
            assert_eq!(passcode.len(), 4);
            assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
            assert!(passcode.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn normalize_code_uppercases_and_checks_length() {
        assert_eq!(normalize_code(" ab12cd ", 6).as_deref(), Some("AB12CD"));
        assert!(normalize_code("AB12C", 6).is_none());
        assert!(normalize_code("AB-2CD", 6).is_none());
    }

    #[test]
    fn fixture_tournament_is_valid() {
        assert_eq!(tournament().validate(&[]), Ok(()));
    }

    #[test]
    fn units_follow_scoring_unit() {
        let singles = singles_match(["Ann", "Bob"], ["Cat", "Dan"]);
        let keys: Vec<String> = singles.units().into_iter().map(|u| u.key).collect();
        assert_eq!(keys, vec!["Ann", "Cat", "Bob", "Dan"]);

        let scramble = scramble_match();
        let units = scramble.units();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].key, "m1-a");
        assert_eq!(units[0].players, vec!["Ann", "Bob"]);
        assert_eq!(units[1].key, "m1-b");
    }

    #[test]
    fn duplicate_player_names_rejected() {
        let mut t = tournament();
        t.players.push(player(" ann ", 3.0, TeamSide::B));
        assert!(matches!(t.validate(&[]), Err(TournamentError::DuplicatePlayer(_))));
    }

    #[test]
    fn twelve_hole_match_rejected() {
        let mut t = tournament();
        t.matches[1].holes = 12;
        assert_eq!(t.validate(&[]), Err(TournamentError::InvalidHoleCount(12)));
    }

    #[test]
    fn matchup_shape_enforced() {
        let mut t = tournament();
        t.matches[0].matchups.pop();
        assert!(matches!(t.validate(&[]), Err(TournamentError::MatchupCount { .. })));

        let mut t = tournament();
        t.matches[1].matchups[0].side_a.pop();
        assert!(matches!(t.validate(&[]), Err(TournamentError::SideSize { .. })));
    }

    #[test]
    fn players_must_sit_on_their_team_side() {
        let mut t = tournament();
        t.matches[0].matchups[0].side_a = vec!["Cat".to_string()];
        t.matches[0].matchups[0].side_b = vec!["Ann".to_string()];
        assert!(matches!(t.validate(&[]), Err(TournamentError::WrongTeam(_))));
    }

    #[test]
    fn unknown_course_and_tee_rejected() {
        let mut t = tournament();
        t.matches[0].course_id = "dunes".into();
        assert!(matches!(t.validate(&[]), Err(TournamentError::UnknownCourse(_))));

        let mut t = tournament();
        t.matches[0].tee = "Gold".into();
        assert!(matches!(t.validate(&[]), Err(TournamentError::UnknownTee { .. })));
    }

    #[test]
    fn preset_courses_resolve() {
        let mut t = tournament();
        let presets = t.courses.clone();
        t.courses.clear();
        assert!(t.validate(&[]).is_err());
        assert_eq!(t.validate(&presets), Ok(()));
    }

    #[test]
    fn score_card_set_and_clear() {
        let mut card = ScoreCard::default();
        card.set(1, "Ann", Some(4));
        card.set(1, "Cat", Some(5));
        assert_eq!(card.strokes(1, "Ann"), Some(4));
        card.set(1, "Ann", None);
        card.set(1, "Cat", None);
        assert!(card.holes.is_empty());
    }

    #[test]
    fn score_card_checked_against_match() {
        let game = scramble_match();
        let mut card = ScoreCard::default();
        card.set(9, "m1-a", Some(4));
        assert_eq!(card.check_against(&game), Ok(()));

        card.set(10, "m1-a", Some(4));
        assert!(matches!(
            card.check_against(&game),
            Err(TournamentError::HoleOutOfRange { hole: 10, .. })
        ));

        let mut card = ScoreCard::default();
        card.set(2, "Ann", Some(4));
        assert!(matches!(
            card.check_against(&game),
            Err(TournamentError::UnknownParticipant(_))
        ));

        let mut card = ScoreCard::default();
        card.set(2, "m1-b", Some(0));
        assert!(matches!(
            card.check_against(&game),
            Err(TournamentError::InvalidStrokes { .. })
        ));
    }

    #[test]
    fn single_entries_are_checked_on_their_own() {
        let game = scramble_match();
        assert_eq!(game.check_entry(9, "m1-b", 4), Ok(()));
        assert!(matches!(
            game.check_entry(10, "m1-b", 4),
            Err(TournamentError::HoleOutOfRange { hole: 10, holes: 9 })
        ));
        assert!(matches!(
            game.check_entry(1, "Cat", 4),
            Err(TournamentError::UnknownParticipant(_))
        ));
        assert!(matches!(
            game.check_entry(1, "m1-a", MAX_HOLE_STROKES + 1),
            Err(TournamentError::InvalidStrokes { .. })
        ));
    }

    #[test]
    fn tournament_serde_round_trip() {
        let t = tournament();
        let value = serde_json::to_value(&t).unwrap();
        let back: Tournament = serde_json::from_value(value).unwrap();
        assert_eq!(back, t);
    }
}
