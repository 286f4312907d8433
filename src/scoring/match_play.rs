//! Match-play scoring of a single matchup from net hole scores.

use crate::{
    scoring::handicap::strokes_on_hole,
    state::{
        course::Hole,
        tournament::{ScoreCard, TeamSide},
    },
};

/// A scoring unit entering the matchup with its playing handicap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitEntry {
    /// Participant key on the score card.
    pub key: String,
    /// Team the unit plays for.
    pub side: TeamSide,
    /// Handicap used to allocate strokes per hole.
    pub playing_handicap: u32,
}

/// State of a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupStatus {
    /// Not decided yet.
    InProgress,
    /// Decided in favour of one team.
    Won(TeamSide),
    /// Every hole played with the sides level.
    Halved,
}

/// Running result of a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchupOutcome {
    /// Whether and how the matchup is decided.
    pub status: MatchupStatus,
    /// Holes won by side A minus holes won by side B.
    pub a_up: i32,
    /// Consecutive holes from the first with both sides scored.
    pub holes_played: u8,
    /// Holes left to play.
    pub holes_remaining: u8,
}

impl MatchupStatus {
    /// Stable name used in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchupStatus::InProgress => "in_progress",
            MatchupStatus::Won(_) => "won",
            MatchupStatus::Halved => "halved",
        }
    }

    /// Winning side of a decided matchup.
    pub fn winner(&self) -> Option<TeamSide> {
        match self {
            MatchupStatus::Won(side) => Some(*side),
            _ => None,
        }
    }
}

impl MatchupOutcome {
    /// Points earned by (side A, side B).
    pub fn points(&self, points_per_matchup: f64) -> (f64, f64) {
        match self.status {
            MatchupStatus::Won(TeamSide::A) => (points_per_matchup, 0.0),
            MatchupStatus::Won(TeamSide::B) => (0.0, points_per_matchup),
            MatchupStatus::Halved => (points_per_matchup / 2.0, points_per_matchup / 2.0),
            MatchupStatus::InProgress => (0.0, 0.0),
        }
    }
}

/// Best net score of `side` on `hole`, if any of its units has posted one.
fn side_net(card: &ScoreCard, hole: &Hole, units: &[UnitEntry], side: TeamSide) -> Option<i32> {
    units
        .iter()
        .filter(|unit| unit.side == side)
        .filter_map(|unit| {
            let gross = card.strokes(hole.number, &unit.key)?;
            let strokes = strokes_on_hole(unit.playing_handicap, hole.handicap_rank);
            Some(i32::from(gross) - i32::from(strokes))
        })
        .min()
}

/// Score a matchup over `holes`; a hole counts once both sides have a score on it.
pub fn score_matchup(holes: &[&Hole], units: &[UnitEntry], card: &ScoreCard) -> MatchupOutcome {
    let mut a_up = 0i32;
    let mut played = 0u8;

    for hole in holes {
        let a = side_net(card, hole, units, TeamSide::A);
        let b = side_net(card, hole, units, TeamSide::B);
        if let (Some(a), Some(b)) = (a, b) {
            played += 1;
            a_up += (b - a).signum();
        }
    }

    let remaining = (holes.len() as u8).saturating_sub(played);
    let status = if a_up.unsigned_abs() > u32::from(remaining) {
        if a_up > 0 {
            MatchupStatus::Won(TeamSide::A)
        } else {
            MatchupStatus::Won(TeamSide::B)
        }
    } else if remaining == 0 {
        MatchupStatus::Halved
    } else {
        MatchupStatus::InProgress
    };

    MatchupOutcome {
        status,
        a_up,
        holes_played: played,
        holes_remaining: remaining,
    }
}
