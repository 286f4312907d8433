//! Course, tee and hole definitions shared by the catalog, the course search and matches.

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use utoipa::ToSchema;

/// A golf course with the tee boxes it offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Identifier matches refer to through `course_id`.
    #[serde(default, deserialize_with = "string_or_default")]
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "string_or_default")]
    pub name: String,
    /// Free-form "City, Region, Country".
    #[serde(default, deserialize_with = "string_or_default")]
    pub location: String,
    /// Tee boxes, each with its own rating and card.
    #[serde(default, deserialize_with = "seq_or_default")]
    pub tees: Vec<Tee>,
}

/// A tee box and its rating data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tee {
    /// Tee name, e.g. "Blue".
    #[serde(default, deserialize_with = "string_or_default")]
    pub name: String,
    /// Slope rating, typically 55 to 155 (113 is neutral).
    #[serde(default, deserialize_with = "whole_number")]
    pub slope: u32,
    /// Course rating in strokes.
    #[serde(default, deserialize_with = "decimal_or_default")]
    pub rating: f64,
    /// Par of the full card.
    #[serde(default, deserialize_with = "whole_number")]
    pub par: u32,
    /// Holes in playing order.
    #[serde(default, deserialize_with = "seq_or_default")]
    pub holes: Vec<Hole>,
}

/// Scorecard entry for a single hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hole {
    /// Hole number, starting at 1.
    #[serde(deserialize_with = "whole_number")]
    pub number: u8,
    /// Par of the hole.
    #[serde(deserialize_with = "whole_number")]
    pub par: u8,
    /// Length from this tee; 0 when unknown.
    #[serde(default, deserialize_with = "whole_number")]
    pub yards: u32,
    /// Stroke index, 1 being the hardest hole.
    #[serde(alias = "handicap_rank", deserialize_with = "whole_number")]
    pub handicap_rank: u8,
}

// Course data often comes from a language model, so numbers may arrive as `131.0` and
// unknown values as `null`.

fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + Default,
{
    let Some(raw) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(T::default());
    };
    let rounded = raw.round();
    if !rounded.is_finite() || rounded < 0.0 {
        return Err(D::Error::custom(format!("expected a non-negative number, got {raw}")));
    }
    T::try_from(rounded as u64).map_err(|_| D::Error::custom(format!("number {raw} is out of range")))
}

fn decimal_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn seq_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Course {
    /// Look up a tee by name, ignoring case.
    pub fn tee(&self, name: &str) -> Option<&Tee> {
        self.tees
            .iter()
            .find(|tee| tee.name.eq_ignore_ascii_case(name.trim()))
    }
}

impl Tee {
    /// Holes `1..=count` in number order, or `None` when the card does not cover them.
    pub fn holes_for(&self, count: u8) -> Option<Vec<&Hole>> {
        (1..=count)
            .map(|number| self.holes.iter().find(|hole| hole.number == number))
            .collect()
    }
}

/// Find a course by id, checking `primary` before `fallback`.
pub fn find_course<'a>(primary: &'a [Course], fallback: &'a [Course], id: &str) -> Option<&'a Course> {
    primary
        .iter()
        .chain(fallback.iter())
        .find(|course| course.id == id)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// An 18-hole tee whose stroke index equals the hole number.
    pub fn sequential_tee(name: &str, slope: u32) -> Tee {
        Tee {
            name: name.to_string(),
            slope,
            rating: 71.2,
            par: 72,
            holes: (1..=18)
                .map(|number| Hole {
                    number,
                    par: 4,
                    yards: 380,
                    handicap_rank: number,
                })
                .collect(),
        }
    }

    /// Preset-style course with a Blue (113) and a White (125) tee.
    pub fn course(id: &str) -> Course {
        Course {
            id: id.to_string(),
            name: format!("{id} golf club"),
            location: "Somewhere, USA".to_string(),
            tees: vec![sequential_tee("Blue", 113), sequential_tee("White", 125)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fixtures::*, *};

    #[test]
    fn tee_lookup_ignores_case() {
        let course = course("pines");
        assert_eq!(course.tee("blue").map(|t| t.slope), Some(113));
        assert!(course.tee("gold").is_none());
    }

    #[test]
    fn holes_for_returns_front_nine_in_order() {
        let mut tee = sequential_tee("Blue", 113);
        tee.holes.reverse();
        let holes = tee.holes_for(9).unwrap();
        let numbers: Vec<u8> = holes.iter().map(|h| h.number).collect();
        assert_eq!(numbers, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn holes_for_fails_on_short_card() {
        let mut tee = sequential_tee("Blue", 113);
        tee.holes.truncate(9);
        assert!(tee.holes_for(9).is_some());
        assert!(tee.holes_for(18).is_none());
    }

    #[test]
    fn hole_accepts_snake_case_rank() {
        let hole: Hole =
            serde_json::from_str(r#"{"number":3,"par":5,"yards":510,"handicap_rank":1}"#).unwrap();
        assert_eq!(hole.handicap_rank, 1);
        let json = serde_json::to_value(&hole).unwrap();
        assert_eq!(json["handicapRank"], 1);
    }

    #[test]
    fn loose_numbers_from_generated_cards_are_accepted() {
        let tee: Tee = serde_json::from_str(
            r#"{"name":"Gold","slope":131.0,"rating":null,"par":72.0,"holes":[
                {"number":1,"par":4.0,"yards":null,"handicapRank":9.0},
                {"number":2,"par":3,"handicapRank":17}
            ]}"#,
        )
        .unwrap();
        assert_eq!(tee.slope, 131);
        assert_eq!(tee.rating, 0.0);
        assert_eq!(tee.par, 72);
        assert_eq!(tee.holes[0].yards, 0);
        assert_eq!(tee.holes[0].handicap_rank, 9);
        assert_eq!(tee.holes[1].yards, 0);
    }

    #[test]
    fn negative_or_oversized_numbers_are_refused() {
        assert!(serde_json::from_str::<Hole>(r#"{"number":-1,"par":4,"handicapRank":1}"#).is_err());
        assert!(serde_json::from_str::<Hole>(r#"{"number":1,"par":4,"handicapRank":300}"#).is_err());
        assert!(serde_json::from_str::<Hole>(r#"{"number":1,"par":4}"#).is_err());
    }

    #[test]
    fn find_course_prefers_primary_list() {
        let mut mine = course("pines");
        mine.name = "Tournament copy".into();
        let presets = vec![course("pines"), course("dunes")];
        let primary = vec![mine];
        assert_eq!(
            find_course(&primary, &presets, "pines").map(|c| c.name.as_str()),
            Some("Tournament copy")
        );
        assert!(find_course(&primary, &presets, "dunes").is_some());
        assert!(find_course(&primary, &presets, "links").is_none());
    }
}
