//! Configuration file management for Aligna.
//!
//! Reads `~/.config/aligna/config.toml`. Every field is optional; a missing
//! file means all defaults.

use crate::embed::EmbedVariant;
use crate::error::{AlignaError, Result};
use crate::widget::WidgetTexts;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Backend origin used when none is configured.
pub const DEFAULT_BACKEND_ORIGIN: &str = "https://your-backend.com";

/// Hosted location of the loader script.
pub const DEFAULT_LOADER_URL: &str = "https://custombot.vercel.app/embed.js";

/// Pause before a reply is shown, so answers don't appear instantly.
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1000;

/// Root configuration structure for config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Origin of the chat backend; `/api/chat` is appended.
    pub backend_origin: String,
    /// Hosted widget page the embed loader points the iframe at.
    /// `None` uses the variant's own default.
    pub widget_url: Option<String>,
    /// Where host pages load the loader script from.
    pub loader_url: String,
    /// Embed variant used when none is requested explicitly.
    pub embed_variant: EmbedVariant,
    /// Artificial delay before a reply (or error) is shown.
    pub reply_delay_ms: u64,
    /// Per-request timeout for the backend call. `None` waits forever.
    pub request_timeout_secs: Option<u64>,
    /// Canned texts.
    pub texts: WidgetTexts,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            backend_origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            widget_url: None,
            loader_url: DEFAULT_LOADER_URL.to_string(),
            embed_variant: EmbedVariant::Deferred,
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            request_timeout_secs: None,
            texts: WidgetTexts::default(),
        }
    }
}

impl WidgetConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Widget page for the given variant, honouring a configured override.
    pub fn widget_url_for(&self, variant: EmbedVariant) -> &str {
        self.widget_url
            .as_deref()
            .unwrap_or_else(|| variant.default_widget_url())
    }

    /// Parses a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AlignaError::io(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "loading config");
        Self::from_toml_str(&content)
    }

    /// Loads from `~/.config/aligna/config.toml`.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    fn validate(&self) -> Result<()> {
        let origin = self.backend_origin.trim();
        if origin.is_empty() {
            return Err(AlignaError::config("backend_origin must not be empty"));
        }
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(AlignaError::config(format!(
                "backend_origin must be an http(s) URL, got '{}'",
                origin
            )));
        }
        Ok(())
    }
}

/// Returns the path to the configuration file: ~/.config/aligna/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AlignaError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("aligna").join("config.toml"))
}
