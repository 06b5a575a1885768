//! The chat backend seam.

use aligna_core::BotId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Request body sent for every user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// What the backend answered.
///
/// Only the `response` field is read; anything else in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    pub response: Option<Value>,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            response: Some(Value::String(text.into())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Interprets a decoded JSON body.
    ///
    /// A `null` body cannot be read at all. Any other non-object body simply
    /// has no `response` field.
    pub fn from_json(body: Value) -> Result<Self, BackendError> {
        match body {
            Value::Null => Err(BackendError::Decode("response body is null".to_string())),
            Value::Object(mut map) => Ok(Self {
                response: map.remove("response"),
            }),
            _ => Ok(Self::empty()),
        }
    }

    /// The displayable reply text, if the backend gave a usable one.
    ///
    /// Empty strings, `false`, `0` and `null` count as missing.
    pub fn reply_text(&self) -> Option<String> {
        match self.response.as_ref()? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Why a send failed.
///
/// The widget shows the same connectivity message for all of these; the
/// distinction only reaches the logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request could not be sent or the body could not be received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The body was not readable JSON.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Transport(_) => "transport",
            BackendError::Timeout => "timeout",
            BackendError::Decode(_) => "decode",
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Something that answers user messages for a bot.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one user message and waits for the reply.
    async fn send(&self, bot_id: &BotId, message: &str) -> Result<ChatReply, BackendError>;
}
