//! Conversation message types.
//!
//! Messages are kept in insertion order, which is also display order.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    /// The person typing into the widget.
    #[serde(rename = "You")]
    User,
    /// The assistant behind the widget (including canned replies).
    Bot,
}

impl Sender {
    /// Label shown next to the message bubble.
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Bot",
        }
    }
}

/// A single message in the widget's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The author of the message.
    pub sender: Sender,
    /// The message text, kept verbatim.
    pub text: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    /// The greeting every conversation starts (and restarts) with.
    pub fn greeting(text: impl Into<String>) -> Self {
        Self::bot(text)
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Two-digit `HH:MM` label in local time.
    pub fn display_time(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}
