//! Handicap arithmetic: course handicap, playing handicap and stroke allocation.
//!
//! Malformed input never fails here. Anything that does not produce a finite
//! number degrades to zero strokes.

use crate::state::{course::Hole, format::HandicapType};

/// Slope rating of a course of standard difficulty.
pub const NEUTRAL_SLOPE: f64 = 113.0;

/// Round `handicap_index * slope / 113` to the nearest stroke.
///
/// Returns 0 when the product is not finite and never goes below 0.
pub fn course_handicap(handicap_index: f64, slope: f64) -> u32 {
    let raw = handicap_index * slope / NEUTRAL_SLOPE;
    if !raw.is_finite() {
        return 0;
    }
    raw.round().max(0.0) as u32
}

/// [`course_handicap`] over free-form text input; unparseable values count as 0.
pub fn course_handicap_lenient(handicap_index: Option<&str>, slope: Option<&str>) -> u32 {
    course_handicap(lenient_number(handicap_index), lenient_number(slope))
}

fn lenient_number(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Strokes received on a hole of stroke index `rank` by a player of course handicap `handicap`.
///
/// One stroke when `rank <= handicap`, a second when `rank <= handicap - 18`.
pub fn strokes_on_hole(handicap: u32, rank: u8) -> u8 {
    let rank = u32::from(rank);
    let first = u8::from(rank <= handicap);
    let second = u8::from(handicap >= 18 && rank <= handicap - 18);
    first + second
}

/// Playing handicap of a scoring unit made of players with the given course handicaps.
pub fn playing_handicap(hcp_type: HandicapType, course_handicaps: &[u32]) -> u32 {
    if course_handicaps.is_empty() {
        return 0;
    }
    let average =
        course_handicaps.iter().map(|&h| f64::from(h)).sum::<f64>() / course_handicaps.len() as f64;
    match hcp_type {
        // A full-handicap unit is a single player; partners never pool strokes.
        HandicapType::Full => course_handicaps.iter().copied().max().unwrap_or(0),
        HandicapType::Avg => average.round() as u32,
        HandicapType::Avg75 => (average * 0.75).round() as u32,
    }
}

/// Strokes received on each hole, keyed by hole number.
pub fn stroke_table<'a>(
    handicap: u32,
    holes: impl IntoIterator<Item = &'a Hole>,
) -> Vec<(u8, u8)> {
    holes
        .into_iter()
        .map(|hole| (hole.number, strokes_on_hole(handicap, hole.handicap_rank)))
        .collect()
}
