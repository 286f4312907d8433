//! Application-level configuration loading: the preset course catalog and course-search settings.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::course::{Course, Hole, Tee};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LINKS_CUP_CONFIG_PATH";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const MODEL_ENV: &str = "COURSE_SEARCH_MODEL";
const BASE_URL_ENV: &str = "COURSE_SEARCH_BASE_URL";

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Settings of the LLM behind the course search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSearchConfig {
    /// Model name sent with every request.
    pub model: String,
    /// API root, without the `/v1/messages` suffix.
    pub base_url: String,
    /// Upper bound on the reply length.
    pub max_tokens: u32,
    /// Read from the environment only, never from the config file.
    pub api_key: Option<String>,
}

impl Default for CourseSearchConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    courses: Vec<Course>,
    course_search: CourseSearchConfig,
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        courses = config.courses.len(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };
        config.apply_env(|key| env::var(key).ok());
        if config.course_search.api_key.is_none() {
            warn!("{API_KEY_ENV} is not set; course search will be unavailable");
        }
        config
    }

    /// Parse a JSON configuration document. Missing sections keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        Ok(raw.into())
    }

    /// Build a configuration from explicit parts.
    pub fn new(courses: Vec<Course>, course_search: CourseSearchConfig) -> Self {
        Self {
            courses,
            course_search,
        }
    }

    /// Preset courses offered to every tournament.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Settings of the course-search oracle.
    pub fn course_search(&self) -> &CourseSearchConfig {
        &self.course_search
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(model) = non_empty(MODEL_ENV) {
            self.course_search.model = model;
        }
        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            self.course_search.base_url = base_url;
        }
        self.course_search.api_key = non_empty(API_KEY_ENV);
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            courses: default_courses(),
            course_search: CourseSearchConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    courses: Option<Vec<Course>>,
    #[serde(default)]
    course_search: Option<RawCourseSearch>,
}

#[derive(Debug, Deserialize)]
struct RawCourseSearch {
    model: Option<String>,
    base_url: Option<String>,
    max_tokens: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let courses = match value.courses {
            Some(courses) => courses
                .into_iter()
                .filter(|course| {
                    let keep = !course.id.trim().is_empty();
                    if !keep {
                        warn!(name = %course.name, "skipping preset course without id");
                    }
                    keep
                })
                .collect(),
            None => default_courses(),
        };

        let defaults = CourseSearchConfig::default();
        let course_search = match value.course_search {
            Some(raw) => CourseSearchConfig {
                model: raw.model.unwrap_or(defaults.model),
                base_url: raw.base_url.unwrap_or(defaults.base_url),
                max_tokens: raw.max_tokens.unwrap_or(defaults.max_tokens),
                api_key: None,
            },
            None => defaults,
        };

        Self {
            courses,
            course_search,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn tee(name: &str, slope: u32, rating: f64, pars: &[u8; 18], ranks: &[u8; 18], yards: &[u32; 18]) -> Tee {
    let holes = (0..18)
        .map(|index| Hole {
            number: index as u8 + 1,
            par: pars[index],
            yards: yards[index],
            handicap_rank: ranks[index],
        })
        .collect();
    Tee {
        name: name.to_string(),
        slope,
        rating,
        par: pars.iter().map(|&par| u32::from(par)).sum(),
        holes,
    }
}

/// Built-in course catalog shipped with the binary.
fn default_courses() -> Vec<Course> {
    const PARS: [u8; 18] = [4, 4, 3, 5, 4, 4, 3, 4, 5, 4, 3, 4, 5, 4, 4, 3, 4, 5];
    const RANKS: [u8; 18] = [7, 3, 15, 11, 1, 9, 17, 5, 13, 8, 16, 2, 12, 6, 4, 18, 10, 14];
    const BLUE: [u32; 18] = [
        398, 421, 176, 532, 445, 384, 158, 412, 548, 402, 189, 437, 521, 391, 428, 167, 405, 556,
    ];
    const WHITE: [u32; 18] = [
        372, 398, 152, 505, 418, 361, 139, 388, 519, 377, 164, 410, 497, 366, 402, 146, 381, 528,
    ];

    vec![Course {
        id: "links-cup-municipal".to_string(),
        name: "Links Cup Municipal".to_string(),
        location: "Springfield, USA".to_string(),
        tees: vec![
            tee("Blue", 131, 72.4, &PARS, &RANKS, &BLUE),
            tee("White", 124, 70.1, &PARS, &RANKS, &WHITE),
        ],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_catalog_has_full_cards() {
        let config = AppConfig::default();
        for course in config.courses() {
            for tee in &course.tees {
                assert_eq!(tee.holes.len(), 18);
                assert_eq!(tee.par, 72);
                let mut ranks = tee.holes.iter().map(|h| h.handicap_rank).collect::<Vec<_>>();
                ranks.sort_unstable();
                assert_eq!(ranks, (1..=18).collect::<Vec<u8>>());
            }
        }
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "course_search": { "max_tokens": 1024 } }"#).unwrap();
        assert_eq!(config.course_search().max_tokens, 1024);
        assert_eq!(config.course_search().model, DEFAULT_MODEL);
        assert_eq!(config.courses().len(), default_courses().len());
    }

    #[test]
    fn preset_courses_without_id_are_skipped() {
        let config = AppConfig::from_json(
            r#"{ "courses": [
                { "id": "", "name": "Nameless" },
                { "id": "dunes", "name": "Dunes", "tees": [] }
            ] }"#,
        )
        .unwrap();
        let ids = config.courses().iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["dunes"]);
    }

    #[test]
    fn environment_overrides_search_settings() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            API_KEY_ENV => Some("sk-test".to_string()),
            MODEL_ENV => Some("  ".to_string()),
            BASE_URL_ENV => Some("http://localhost:9999".to_string()),
            _ => None,
        });
        assert_eq!(config.course_search().api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.course_search().model, DEFAULT_MODEL);
        assert_eq!(config.course_search().base_url, "http://localhost:9999");
    }
}
