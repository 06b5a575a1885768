//! Error types for the Aligna widget.

use thiserror::Error;

/// A shared error type for the widget's domain layer.
///
/// Send failures never surface through this type: the widget converts them
/// into a bot message. What remains is configuration and embedding problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignaError {
    /// IO error (reading the config file)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A URL could not be parsed or built
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The embed script tag carried no `data-bot-id`
    #[error("Missing bot id on embed script tag")]
    MissingBotId,
}

impl AlignaError {
    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidUrl error
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for AlignaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AlignaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AlignaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AlignaError>`.
pub type Result<T> = std::result::Result<T, AlignaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let err: AlignaError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.to_string().contains("PermissionDenied"));
    }

    #[test]
    fn test_toml_error_is_serialization() {
        let err: AlignaError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(err.is_serialization());
        assert!(err.to_string().contains("TOML"));
    }
}
