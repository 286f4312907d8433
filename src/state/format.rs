//! Static catalog of the tournament formats and the rules each one carries.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tournament formats a match can be played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Four-player scramble, one ball per side.
    ModifiedScramble,
    /// Two players per side, each plays their own ball and the best net counts.
    BestBall,
    /// Two-man scramble, one ball per side.
    Scramble,
    /// Two players per side alternating shots on one ball.
    AlternateShot,
    /// One player against one player.
    Singles,
}

/// How the playing handicap of a scoring unit is derived from course handicaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandicapType {
    /// No reduction.
    Full,
    /// Average of the partners' course handicaps.
    Avg,
    /// 75% of the partners' average.
    Avg75,
}

/// Whether a side records one ball or one score per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoringUnit {
    /// The side plays a single ball and records one score per hole.
    Team,
    /// Every player records a score; the side counts its best net.
    Individual,
}

/// Rules attached to a [`Format`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatSpec {
    /// Format these rules belong to.
    pub format: Format,
    /// Human-readable name.
    pub label: &'static str,
    /// Points awarded for winning a matchup; a halve splits them.
    pub points_per_matchup: f64,
    /// Simultaneous contests that make up one match of this format.
    pub num_matchups: u8,
    /// Players on each side of a matchup.
    pub players_per_side: u8,
    /// How a side's playing handicap is derived.
    pub hcp_type: HandicapType,
    /// Whether the side or each player records scores.
    pub scoring_unit: ScoringUnit,
    /// Allowed match lengths in holes.
    pub holes_opts: &'static [u8],
}

const HOLES_OPTS: &[u8] = &[9, 18];

const FORMATS: [FormatSpec; 5] = [
    FormatSpec {
        format: Format::ModifiedScramble,
        label: "Modified Scramble",
        points_per_matchup: 2.0,
        num_matchups: 1,
        players_per_side: 4,
        hcp_type: HandicapType::Avg75,
        scoring_unit: ScoringUnit::Team,
        holes_opts: HOLES_OPTS,
    },
    FormatSpec {
        format: Format::BestBall,
        label: "Best Ball",
        points_per_matchup: 1.0,
        num_matchups: 1,
        players_per_side: 2,
        hcp_type: HandicapType::Full,
        scoring_unit: ScoringUnit::Individual,
        holes_opts: HOLES_OPTS,
    },
    FormatSpec {
        format: Format::Scramble,
        label: "2-Man Scramble",
        points_per_matchup: 1.0,
        num_matchups: 1,
        players_per_side: 2,
        hcp_type: HandicapType::Avg75,
        scoring_unit: ScoringUnit::Team,
        holes_opts: HOLES_OPTS,
    },
    FormatSpec {
        format: Format::AlternateShot,
        label: "Alternate Shot",
        points_per_matchup: 1.0,
        num_matchups: 1,
        players_per_side: 2,
        hcp_type: HandicapType::Avg,
        scoring_unit: ScoringUnit::Team,
        holes_opts: HOLES_OPTS,
    },
    FormatSpec {
        format: Format::Singles,
        label: "Singles",
        points_per_matchup: 1.0,
        num_matchups: 2,
        players_per_side: 1,
        hcp_type: HandicapType::Full,
        scoring_unit: ScoringUnit::Individual,
        holes_opts: HOLES_OPTS,
    },
];

impl Format {
    /// Every format, in catalog order.
    pub const ALL: [Format; 5] = [
        Format::ModifiedScramble,
        Format::BestBall,
        Format::Scramble,
        Format::AlternateShot,
        Format::Singles,
    ];

    /// Rules for this format.
    pub fn spec(self) -> &'static FormatSpec {
        let index = match self {
            Format::ModifiedScramble => 0,
            Format::BestBall => 1,
            Format::Scramble => 2,
            Format::AlternateShot => 3,
            Format::Singles => 4,
        };
        &FORMATS[index]
    }
}

impl FormatSpec {
    /// Whether a match of this format may be played over `holes` holes.
    pub fn allows_holes(&self, holes: u8) -> bool {
        self.holes_opts.contains(&holes)
    }
}
