//! Embed loader: how a host page gets the widget iframe.
//!
//! A host page includes a loader script tag carrying `data-bot-id`. The
//! loader reads that attribute, builds a fixed-position iframe pointing at the
//! hosted widget page with `botId` in the query, and appends it to the body.
//!
//! Two variants ship side by side:
//!
//! - [`EmbedVariant::Deferred`] waits for `DOMContentLoaded` and silently
//!   does nothing when the attribute is missing.
//! - [`EmbedVariant::Immediate`] runs as soon as it is evaluated and does not
//!   check the attribute, so a missing id ends up as `botId=null`.
//!
//! This module renders both the resulting iframe and the loader script itself.

use crate::bot_id::{BOT_ID_PARAM, BotId};
use crate::error::{AlignaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};
use url::Url;

/// Attribute on the loader script tag that carries the bot id.
pub const BOT_ID_ATTRIBUTE: &str = "data-bot-id";

/// Hosted widget page used by the immediate loader.
pub const IMMEDIATE_WIDGET_URL: &str = "https://custombot.vercel.app/chat-widget.html";

/// Hosted widget page used by the deferred loader.
pub const DEFERRED_WIDGET_URL: &str = "https://custombot.vercel.app/widget";

/// What the immediate loader puts in the query when no id was given.
/// Mirrors `getAttribute` returning `null` inside a template string.
const MISSING_BOT_ID: &str = "null";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedVariant {
    /// Waits for page load; aborts silently without a bot id.
    Deferred,
    /// Runs immediately; proceeds even without a bot id.
    Immediate,
}

impl EmbedVariant {
    pub fn requires_bot_id(&self) -> bool {
        matches!(self, EmbedVariant::Deferred)
    }

    pub fn default_widget_url(&self) -> &'static str {
        match self {
            EmbedVariant::Deferred => DEFERRED_WIDGET_URL,
            EmbedVariant::Immediate => IMMEDIATE_WIDGET_URL,
        }
    }

    pub fn default_style(&self) -> IframeStyle {
        match self {
            EmbedVariant::Deferred => IframeStyle {
                bottom_px: 20,
                right_px: 20,
                width_px: 400,
                height_px: 600,
                z_index: 999_999,
                border_radius_px: 16,
                box_shadow: "0 4px 24px rgba(0,0,0,0.2)".to_string(),
            },
            EmbedVariant::Immediate => IframeStyle::default(),
        }
    }
}

impl fmt::Display for EmbedVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedVariant::Deferred => f.write_str("deferred"),
            EmbedVariant::Immediate => f.write_str("immediate"),
        }
    }
}

impl FromStr for EmbedVariant {
    type Err = AlignaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "deferred" => Ok(EmbedVariant::Deferred),
            "immediate" => Ok(EmbedVariant::Immediate),
            other => Err(AlignaError::config(format!(
                "unknown embed variant '{}' (expected 'deferred' or 'immediate')",
                other
            ))),
        }
    }
}

/// Fixed inline styling applied to the injected iframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IframeStyle {
    pub bottom_px: u32,
    pub right_px: u32,
    pub width_px: u32,
    pub height_px: u32,
    pub z_index: i32,
    pub border_radius_px: u32,
    pub box_shadow: String,
}

impl Default for IframeStyle {
    fn default() -> Self {
        Self {
            bottom_px: 20,
            right_px: 20,
            width_px: 350,
            height_px: 500,
            z_index: 9999,
            border_radius_px: 12,
            box_shadow: "0 0 10px rgba(0,0,0,0.3)".to_string(),
        }
    }
}

impl IframeStyle {
    /// Inline CSS declaration list.
    pub fn to_css(&self) -> String {
        format!(
            "position: fixed; bottom: {}px; right: {}px; width: {}px; height: {}px; \
             border: none; z-index: {}; border-radius: {}px; box-shadow: {};",
            self.bottom_px,
            self.right_px,
            self.width_px,
            self.height_px,
            self.z_index,
            self.border_radius_px,
            self.box_shadow
        )
    }
}

/// Attributes of the currently executing `<script>` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptAttributes(BTreeMap<String, String>);

impl ScriptAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn bot_id(&self) -> Option<BotId> {
        self.get(BOT_ID_ATTRIBUTE).map(BotId::new)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ScriptAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The iframe a loader appends to the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iframe {
    pub src: String,
    pub style: IframeStyle,
}

impl Iframe {
    pub fn to_html(&self) -> String {
        format!(
            r#"<iframe src="{}" style="{}"></iframe>"#,
            escape_attr(&self.src),
            escape_attr(&self.style.to_css())
        )
    }
}

/// Appends `botId=<id>` to the widget URL, keeping any existing query.
///
/// A missing id is written as `null`, the way the immediate loader does it.
pub fn widget_src(widget_url: &str, bot_id: Option<&BotId>) -> Result<String> {
    let mut url = Url::parse(widget_url)
        .map_err(|e| AlignaError::invalid_url(widget_url, e.to_string()))?;
    let value = bot_id.map(BotId::as_str).unwrap_or(MISSING_BOT_ID);
    url.query_pairs_mut().append_pair(BOT_ID_PARAM, value);
    Ok(url.into())
}

/// One embed loader activation.
#[derive(Debug, Clone)]
pub struct EmbedLoader {
    variant: EmbedVariant,
    widget_url: String,
    style: IframeStyle,
    bot_id: Option<BotId>,
}

impl EmbedLoader {
    /// Creates a loader for the variant with its default target and sizing.
    pub fn new(variant: EmbedVariant) -> Self {
        Self {
            variant,
            widget_url: variant.default_widget_url().to_string(),
            style: variant.default_style(),
            bot_id: None,
        }
    }

    /// Reads the bot id from the executing script tag's attributes.
    pub fn from_attributes(variant: EmbedVariant, attributes: &ScriptAttributes) -> Self {
        Self {
            bot_id: attributes.bot_id(),
            ..Self::new(variant)
        }
    }

    pub fn with_widget_url(mut self, widget_url: impl Into<String>) -> Self {
        self.widget_url = widget_url.into();
        self
    }

    pub fn variant(&self) -> EmbedVariant {
        self.variant
    }

    pub fn bot_id(&self) -> Option<&BotId> {
        self.bot_id.as_ref()
    }

    /// Builds the iframe the loader would append.
    ///
    /// `Ok(None)` is the deferred loader's silent abort on a missing id.
    pub fn iframe(&self) -> Result<Option<Iframe>> {
        // The deferred check is a JS truthiness test, so an empty id aborts too.
        if self.bot_id.as_ref().is_none_or(|id| id.as_str().is_empty()) {
            if self.variant.requires_bot_id() {
                debug!(variant = %self.variant, "no bot id on script tag, skipping iframe");
                return Ok(None);
            }
            warn!(
                variant = %self.variant,
                "no bot id on script tag, widget URL will carry an unusable botId"
            );
        }

        let src = widget_src(&self.widget_url, self.bot_id.as_ref())?;
        Ok(Some(Iframe {
            src,
            style: self.style.clone(),
        }))
    }

    /// Renders the self-contained loader script for this variant.
    ///
    /// The bot id is read at runtime from the script tag, so it does not
    /// appear in the output.
    pub fn loader_script(&self) -> Result<String> {
        // Validate up front so a bad URL fails here rather than in the browser.
        Url::parse(&self.widget_url)
            .map_err(|e| AlignaError::invalid_url(&self.widget_url, e.to_string()))?;

        let widget_url = serde_json::to_string(&self.widget_url)?;
        let style = serde_json::to_string(&self.style.to_css())?;

        let script = match self.variant {
            EmbedVariant::Immediate => format!(
                r##"(function () {{
  const botId = document.currentScript.getAttribute("{attr}");

  const iframe = document.createElement("iframe");
  const src = new URL({widget_url});
  src.searchParams.append("{param}", botId);
  iframe.src = src.toString();
  iframe.style = {style};

  document.body.appendChild(iframe);
}})();
"##,
                attr = BOT_ID_ATTRIBUTE,
                param = BOT_ID_PARAM,
                widget_url = widget_url,
                style = style,
            ),
            EmbedVariant::Deferred => format!(
                r##"(function () {{
  const script = document.currentScript;
  document.addEventListener("DOMContentLoaded", function () {{
    const botId = script && script.getAttribute("{attr}");
    if (!botId) return;

    const iframe = document.createElement("iframe");
    const src = new URL({widget_url});
    src.searchParams.append("{param}", botId);
    iframe.src = src.toString();
    iframe.style = {style};

    document.body.appendChild(iframe);
  }});
}})();
"##,
                attr = BOT_ID_ATTRIBUTE,
                param = BOT_ID_PARAM,
                widget_url = widget_url,
                style = style,
            ),
        };
        Ok(script)
    }
}

/// Renders the tag a host page pastes in to load the widget.
pub fn script_tag(loader_url: &str, bot_id: &BotId) -> String {
    format!(
        r#"<script src="{}" {}="{}"></script>"#,
        escape_attr(loader_url),
        BOT_ID_ATTRIBUTE,
        escape_attr(bot_id.as_str())
    )
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
