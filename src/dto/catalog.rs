use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::state::format::{Format, FormatSpec, HandicapType, ScoringUnit};

/// Rules of one format as listed by `GET /api/formats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormatView {
    pub format: Format,
    pub label: String,
    pub points_per_matchup: f64,
    pub num_matchups: u8,
    pub players_per_side: u8,
    pub hcp_type: HandicapType,
    pub scoring_unit: ScoringUnit,
    pub holes_opts: Vec<u8>,
}

impl From<&FormatSpec> for FormatView {
    fn from(spec: &FormatSpec) -> Self {
        Self {
            format: spec.format,
            label: spec.label.to_string(),
            points_per_matchup: spec.points_per_matchup,
            num_matchups: spec.num_matchups,
            players_per_side: spec.players_per_side,
            hcp_type: spec.hcp_type,
            scoring_unit: spec.scoring_unit,
            holes_opts: spec.holes_opts.to_vec(),
        }
    }
}

/// Free-form course handicap inputs, as typed by a user.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseHandicapQuery {
    /// Handicap index, e.g. `12.4`. Non-numeric input counts as 0.
    pub handicap_index: Option<String>,
    /// Slope rating of the tee, e.g. `131`. Non-numeric input counts as 0.
    pub slope: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseHandicapResponse {
    pub course_handicap: u32,
}
