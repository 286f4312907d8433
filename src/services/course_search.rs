//! Free-text course search answered by the course-data oracle.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::{error::ServiceError, state::SharedState, state::course::Course};

/// Message used whenever the oracle reply holds no usable course.
pub const NO_COURSE_DATA: &str = "no course data found";

/// Prompt asking for scorecard data as a bare JSON array.
pub fn build_prompt(query: &str) -> String {
    format!(
        r#"You are a golf course database. Find scorecard data for golf courses matching: "{query}".

Respond with ONLY a JSON array, no prose and no markdown. Each element must have this shape:
{{
  "id": "short-kebab-case-id",
  "name": "Course name",
  "location": "City, Region, Country",
  "tees": [
    {{
      "name": "Tee name (e.g. Blue)",
      "slope": 113,
      "rating": 72.0,
      "par": 72,
      "holes": [
        {{ "number": 1, "par": 4, "yards": 400, "handicapRank": 7 }}
      ]
    }}
  ]
}}

Every tee lists all 18 holes. handicapRank is the stroke index from 1 (hardest) to 18.
Return at most 3 courses. If nothing matches, return []."#
    )
}

/// Extract courses from an oracle reply.
///
/// Code fences are ignored. If the reply does not parse as a whole, the text between
/// the first `[` and the last `]` is tried instead. `None` when nothing usable is found.
pub fn parse_course_reply(reply: &str) -> Option<Vec<Course>> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let courses = serde_json::from_str::<Vec<Course>>(cleaned)
        .ok()
        .or_else(|| {
            let start = cleaned.find('[')?;
            let end = cleaned.rfind(']')?;
            (start < end)
                .then(|| serde_json::from_str::<Vec<Course>>(&cleaned[start..=end]).ok())
                .flatten()
        })?;

    (!courses.is_empty()).then_some(courses)
}

/// Fill in missing course ids from the course name and suffix repeated ones.
///
/// Ids the oracle supplied are kept as sent.
fn assign_ids(courses: &mut [Course]) {
    let mut seen = HashSet::new();
    for course in courses.iter_mut() {
        let base = match course.id.trim() {
            "" => match slug(&course.name) {
                name if !name.is_empty() => name,
                _ => "course".to_string(),
            },
            _ => course.id.clone(),
        };
        let mut candidate = base.clone();
        let mut suffix = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        course.id = candidate;
    }
}

fn slug(raw: &str) -> String {
    raw.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Ask the oracle for courses matching `query`.
pub async fn search_courses(state: &SharedState, query: &str) -> Result<Vec<Course>, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::InvalidInput("query must not be empty".into()));
    }

    let oracle = state.oracle().ok_or_else(|| {
        ServiceError::Configuration("course search is not configured: missing API key".into())
    })?;

    let reply = oracle.complete(build_prompt(query)).await.map_err(|err| {
        warn!(query, error = %err, "course search request failed");
        ServiceError::from(err)
    })?;

    let Some(mut courses) = parse_course_reply(&reply) else {
        warn!(query, "course search reply held no course data");
        return Err(ServiceError::NotFound(NO_COURSE_DATA.into()));
    };
    assign_ids(&mut courses);
    info!(query, count = courses.len(), "course search answered");
    Ok(courses)
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use futures::future::BoxFuture;
    use reqwest::StatusCode;

    use crate::services::oracle::{CourseOracle, OracleError};

    /// Oracle answering with a canned reply and counting calls.
    pub struct FakeOracle {
        reply: Result<String, (StatusCode, String)>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeOracle {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing(status: StatusCode, message: &str) -> Self {
            Self {
                reply: Err((status, message.to_string())),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl CourseOracle for FakeOracle {
        fn complete(&self, _prompt: String) -> BoxFuture<'static, Result<String, OracleError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .reply
                .clone()
                .map_err(|(status, message)| OracleError::Upstream { status, message });
            Box::pin(async move { reply })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, atomic::Ordering};

    use reqwest::StatusCode;

    use super::{fakes::FakeOracle, *};
    use crate::{config::AppConfig, state::AppState};

    const DUNES: &str = r#"[{"id":"dunes","name":"Dunes Links","location":"Bandon, OR","tees":[{"name":"Gold","slope":131,"rating":72.9,"par":72,"holes":[{"number":1,"par":4,"yards":390,"handicapRank":9}]}]}]"#;

    fn state_with(oracle: FakeOracle) -> SharedState {
        AppState::new(AppConfig::default(), Some(Arc::new(oracle)))
    }

    #[test]
    fn fenced_array_is_returned_unmodified() {
        let reply = format!("```json\n{DUNES}\n```");
        let parsed = parse_course_reply(&reply).unwrap();
        let expected: Vec<Course> = serde_json::from_str(DUNES).unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed[0].tees[0].holes[0].handicap_rank, 9);
    }

    #[test]
    fn surrounding_prose_is_recovered() {
        let reply = format!("Here are the courses I found:\n{DUNES}\nLet me know if you need more.");
        let parsed = parse_course_reply(&reply).unwrap();
        assert_eq!(parsed[0].name, "Dunes Links");
    }

    #[test]
    fn empty_or_garbage_replies_yield_nothing() {
        assert!(parse_course_reply("[]").is_none());
        assert!(parse_course_reply("I could not find that course.").is_none());
        assert!(parse_course_reply("] nothing [").is_none());
    }

    #[test]
    fn ids_are_derived_and_deduplicated() {
        let mut courses: Vec<Course> = serde_json::from_str(
            r#"[{"name":"Old Course"},{"name":"Old Course","id":null},{"id":"  ","name":"!!"},{"id":"TPC_Sawgrass","name":"x"},{"id":"TPC_Sawgrass","name":"y"}]"#,
        )
        .unwrap();
        assign_ids(&mut courses);
        let ids = courses.iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec!["old-course", "old-course-2", "course", "TPC_Sawgrass", "TPC_Sawgrass-2"]
        );
    }

    #[test]
    fn loosely_typed_cards_still_parse() {
        let reply = "```json\n[{\"id\":\"Bandon_Dunes\",\"name\":\"Bandon Dunes\",\"location\":null,\"tees\":[{\"name\":\"Green\",\"slope\":131.0,\"rating\":72.9,\"par\":72,\"holes\":[{\"number\":1,\"par\":4,\"yards\":null,\"handicapRank\":9}]}]}]\n```";
        let parsed = parse_course_reply(reply).unwrap();
        let tee = &parsed[0].tees[0];
        assert_eq!(tee.slope, 131);
        assert_eq!(tee.holes[0].yards, 0);
        assert_eq!(parsed[0].location, "");
    }

    #[tokio::test]
    async fn supplied_ids_survive_the_search() {
        let reply = DUNES.replace(r#""id":"dunes""#, r#""id":"Bandon_Dunes-Links""#);
        let state = state_with(FakeOracle::replying(&reply));
        let courses = search_courses(&state, "bandon").await.unwrap();
        assert_eq!(courses[0].id, "Bandon_Dunes-Links");
    }

    #[tokio::test]
    async fn empty_query_never_reaches_the_oracle() {
        let oracle = FakeOracle::replying(DUNES);
        let calls = oracle.calls.clone();
        let state = state_with(oracle);

        let err = search_courses(&state, "   ").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_oracle_is_a_configuration_error() {
        let state = AppState::new(AppConfig::default(), None);
        let err = search_courses(&state, "bandon").await.unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[tokio::test]
    async fn upstream_message_is_propagated() {
        let state = state_with(FakeOracle::failing(
            StatusCode::TOO_MANY_REQUESTS,
            "rate limit exceeded",
        ));
        match search_courses(&state, "bandon").await {
            Err(ServiceError::Upstream(message)) => assert_eq!(message, "rate limit exceeded"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_reply_is_not_found() {
        let state = state_with(FakeOracle::replying("Sorry, no idea."));
        match search_courses(&state, "atlantis").await {
            Err(ServiceError::NotFound(message)) => assert_eq!(message, NO_COURSE_DATA),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_search_calls_once() {
        let oracle = FakeOracle::replying(DUNES);
        let calls = oracle.calls.clone();
        let state = state_with(oracle);

        let courses = search_courses(&state, "bandon dunes").await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, "dunes");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
