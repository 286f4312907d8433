//! Client for the LLM that answers course-data prompts.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CourseSearchConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Failures talking to the course-data oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    /// No API key in the environment.
    #[error("course search is not configured: missing API key")]
    MissingCredential,
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an answer.
    #[error("failed to reach the course-data service")]
    Transport {
        /// Transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with an error status.
    #[error("course-data service returned {status}: {message}")]
    Upstream {
        /// Status of the reply.
        status: StatusCode,
        /// Error message from the body, or the raw body.
        message: String,
    },
    /// The reply body is not a Messages API response.
    #[error("failed to decode the course-data service response")]
    Decode {
        /// Body decoding failure.
        #[source]
        source: reqwest::Error,
    },
}

/// Opaque text-in, text-out oracle used by the course search.
pub trait CourseOracle: Send + Sync {
    /// Send `prompt` and return the text of the reply.
    fn complete(&self, prompt: String) -> BoxFuture<'static, Result<String, OracleError>>;
}

/// Anthropic Messages API backed oracle.
#[derive(Clone)]
pub struct AnthropicOracle {
    client: Client,
    endpoint: Arc<str>,
    api_key: Arc<str>,
    model: Arc<str>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AnthropicOracle {
    /// Build the oracle from configuration. Fails when no API key is set.
    pub fn from_config(config: &CourseSearchConfig) -> Result<Self, OracleError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(OracleError::MissingCredential)?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| OracleError::ClientBuilder { source })?;

        Ok(Self {
            client,
            endpoint: Arc::from(format!(
                "{}/v1/messages",
                config.base_url.trim_end_matches('/')
            )),
            api_key: Arc::from(api_key),
            model: Arc::from(config.model.as_str()),
            max_tokens: config.max_tokens,
        })
    }

    async fn send(&self, prompt: &str) -> Result<String, OracleError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint.as_ref())
            .header("x-api-key", self.api_key.as_ref())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|source| OracleError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(OracleError::Upstream {
                status,
                message: upstream_message(status, &raw),
            });
        }

        let payload = response
            .json::<MessagesResponse>()
            .await
            .map_err(|source| OracleError::Decode { source })?;
        Ok(join_text(payload))
    }
}

impl CourseOracle for AnthropicOracle {
    fn complete(&self, prompt: String) -> BoxFuture<'static, Result<String, OracleError>> {
        let oracle = self.clone();
        Box::pin(async move { oracle.send(&prompt).await })
    }
}

/// Concatenate the text blocks of a reply, ignoring any other block kind.
fn join_text(payload: MessagesResponse) -> String {
    payload
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("")
}

/// The `error.message` of an error body, falling back to the raw body or the status text.
fn upstream_message(status: StatusCode, raw: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(raw) {
        return envelope.error.message;
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("upstream request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_blocks_are_joined_in_order() {
        let payload: MessagesResponse = serde_json::from_str(
            r#"{ "content": [
                { "type": "text", "text": "[{\"name\":" },
                { "type": "tool_use", "id": "x" },
                { "type": "text", "text": "\"Dunes\"}]" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(join_text(payload), r#"[{"name":"Dunes"}]"#);
    }

    #[test]
    fn upstream_message_prefers_error_body() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert_eq!(
            upstream_message(StatusCode::SERVICE_UNAVAILABLE, body),
            "Overloaded"
        );
        assert_eq!(upstream_message(StatusCode::BAD_GATEWAY, "  "), "Bad Gateway");
        assert_eq!(upstream_message(StatusCode::BAD_GATEWAY, "proxy down"), "proxy down");
    }

    #[test]
    fn oracle_requires_a_credential() {
        let config = CourseSearchConfig::default();
        assert!(matches!(
            AnthropicOracle::from_config(&config),
            Err(OracleError::MissingCredential)
        ));
    }
}
