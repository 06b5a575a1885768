//! Bot identifier handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Query parameter carrying the bot id on widget and backend URLs.
pub const BOT_ID_PARAM: &str = "botId";

/// Opaque routing key identifying which bot a widget talks to.
///
/// Never validated; it is forwarded to the backend exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(String);

impl BotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts `botId` from a query string. A leading `?` is accepted.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == BOT_ID_PARAM)
            .map(|(_, value)| Self(value.into_owned()))
    }

    /// Extracts `botId` from the query of a full widget URL.
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        parsed.query().and_then(Self::from_query)
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BotId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BotId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
