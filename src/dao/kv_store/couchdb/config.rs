use super::error::{CouchDaoError, CouchResult};

/// Database used when `COUCH_DB` is not set.
pub const DEFAULT_DATABASE: &str = "links_cup";

/// Runtime configuration describing how to connect to CouchDB.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server root, e.g. `http://localhost:5984`.
    pub base_url: String,
    /// Database holding every store document.
    pub database: String,
    /// Basic-auth user, if any.
    pub username: Option<String>,
    /// Basic-auth password, if any.
    pub password: Option<String>,
}

impl CouchConfig {
    /// Settings without credentials.
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            username: None,
            password: None,
        }
    }

    /// Attach basic-auth credentials to the configuration.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Read the CouchDB settings from the environment.
    ///
    /// Returns `Ok(None)` when `COUCH_BASE_URL` is unset, meaning the caller should
    /// fall back to the in-process store.
    pub fn from_env() -> CouchResult<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CouchResult<Option<Self>> {
        let Some(base_url) = lookup("COUCH_BASE_URL").filter(|url| !url.trim().is_empty()) else {
            return Ok(None);
        };
        let database = lookup("COUCH_DB").unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let config = Self::new(base_url, database);

        match (lookup("COUCH_USERNAME"), lookup("COUCH_PASSWORD")) {
            (Some(username), Some(password)) => {
                Ok(Some(config.with_credentials(username, password)))
            }
            (Some(_), None) => Err(CouchDaoError::MissingEnvVar {
                var: "COUCH_PASSWORD",
            }),
            (None, Some(_)) => Err(CouchDaoError::MissingEnvVar {
                var: "COUCH_USERNAME",
            }),
            (None, None) => Ok(Some(config)),
        }
    }
}
