use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

/// Payload of the `/healthcheck` route.
#[skip_serializing_none]
#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Backend holding tournaments, absent while none is installed.
    pub store: Option<String>,
}

impl HealthResponse {
    pub fn ok(store: &str) -> Self {
        Self {
            status: "ok".to_string(),
            store: Some(store.to_string()),
        }
    }

    pub fn degraded(store: Option<&str>) -> Self {
        Self {
            status: "degraded".to_string(),
            store: store.map(str::to_string),
        }
    }
}
