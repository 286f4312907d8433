/// Course handicap, playing handicap and stroke allocation.
pub mod handicap;
/// Match-play results from a score card.
pub mod match_play;
