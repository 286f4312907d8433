use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// First event of a tournament stream.
pub struct Handshake {
    pub tournament_id: String,
    /// Match whose score card is streamed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<uuid::Uuid>,
    /// Whether the backend currently runs without a usable store.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}
