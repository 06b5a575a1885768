use serde::{Deserialize, Serialize};

pub const DEFAULT_GREETING: &str =
    "👋 Hi there! I'm Aligna, your AI assistant. How can I help you today?";
pub const DEFAULT_FALLBACK_REPLY: &str =
    "I'm sorry, I couldn't process that request. Please try again.";
pub const DEFAULT_CONNECTIVITY_ERROR: &str = "🔌 I'm having trouble connecting right now. Please check your internet connection and try again.";

/// Canned texts the widget shows on its own behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetTexts {
    /// First message of every conversation, restored by "clear".
    pub greeting: String,
    /// Shown when the backend answered without a usable `response`.
    pub fallback_reply: String,
    /// Shown when the backend could not be reached or its reply was unreadable.
    pub connectivity_error: String,
}

impl Default for WidgetTexts {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            connectivity_error: DEFAULT_CONNECTIVITY_ERROR.to_string(),
        }
    }
}
