//! HttpChatBackend - JSON-over-HTTP implementation of the chat backend.
//!
//! Wire contract:
//!
//! ```text
//! POST {origin}/api/chat?botId={id}
//! Content-Type: application/json
//!
//! {"message": "<user text>"}
//! ```
//!
//! The reply is expected to be a JSON object with a `response` string. The
//! HTTP status is not inspected: a JSON error body simply lacks `response`.

use crate::backend::{BackendError, ChatBackend, ChatReply, ChatRequest};
use aligna_core::BotId;
use aligna_core::bot_id::BOT_ID_PARAM;
use aligna_core::config::WidgetConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const CHAT_PATH: &str = "/api/chat";

/// Chat backend reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpChatBackend {
    client: Client,
    origin: String,
    timeout: Option<Duration>,
}

impl HttpChatBackend {
    /// Creates a backend for the given origin (scheme, host and optional port).
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            origin: origin.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &WidgetConfig) -> Self {
        let backend = Self::new(config.backend_origin.clone());
        match config.request_timeout() {
            Some(timeout) => backend.with_timeout(timeout),
            None => backend,
        }
    }

    /// Sets a per-request timeout. Without one a hung backend is waited on forever.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The chat endpoint, without the bot id query.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), CHAT_PATH)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, bot_id: &BotId, message: &str) -> Result<ChatReply, BackendError> {
        let url = self.endpoint();
        debug!(%url, %bot_id, "posting chat message");

        let mut request = self
            .client
            .post(&url)
            .query(&[(BOT_ID_PARAM, bot_id.as_str())])
            .header("content-type", "application/json")
            .json(&ChatRequest {
                message: message.to_string(),
            });

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Transport(format!("Chat request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, %bot_id, "chat backend returned non-success status");
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Transport(format!("Failed to read chat response: {}", e))
            }
        })?;

        let json: Value = serde_json::from_slice(&body)?;
        ChatReply::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_origin_and_path() {
        assert_eq!(
            HttpChatBackend::new("https://your-backend.com").endpoint(),
            "https://your-backend.com/api/chat"
        );
        assert_eq!(
            HttpChatBackend::new("http://localhost:8080/").endpoint(),
            "http://localhost:8080/api/chat"
        );
    }

    #[test]
    fn test_from_config_applies_timeout() {
        let config = WidgetConfig {
            request_timeout_secs: Some(5),
            ..WidgetConfig::default()
        };
        let backend = HttpChatBackend::from_config(&config);
        assert_eq!(backend.timeout, Some(Duration::from_secs(5)));
        assert_eq!(backend.endpoint(), "https://your-backend.com/api/chat");
    }
}
