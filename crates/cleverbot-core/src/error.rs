//! Error types for the Cleverbot client.

use std::time::Duration;
use thiserror::Error;

/// A shared error type for every cleverbot crate.
///
/// Library callers receive every variant as a hard failure. Interactive
/// callers (the `migrate` command) downgrade `Regression` to a notice by
/// running migrations in explicit mode instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CleverbotError {
    /// Migration registry misuse (e.g. an entity kind that was never declared)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An implicit migration would have to run a lossy transform
    #[error(
        "Won't implicitly migrate due to a regression: {description:?}. \
         Migrate explicitly with `cleverbot migrate`"
    )]
    Regression { description: String },

    /// Named and nameless conversations mixed, or an unsupported field
    #[error("Structural error: {0}")]
    Structural(String),

    /// The API reply could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The API answered with a non-success status
    #[error("API error {status}: {message}")]
    Request { status: u16, message: String },

    /// The request exceeded the configured timeout
    #[error("{}", timeout_message(.timeout))]
    Timeout { timeout: Option<Duration> },

    /// The transport failed before a reply arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },
}

fn timeout_message(timeout: &Option<Duration>) -> String {
    match timeout {
        Some(timeout) => format!("Request timed out after {} seconds.", timeout.as_secs_f64()),
        None => "Request timed out.".to_string(),
    }
}

impl CleverbotError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a Regression error carrying the transform description
    pub fn regression(description: impl Into<String>) -> Self {
        Self::Regression {
            description: description.into(),
        }
    }

    /// Creates a Structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a Request error
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    /// Creates a Timeout error for the configured duration
    pub fn timeout(timeout: Option<Duration>) -> Self {
        Self::Timeout { timeout }
    }

    /// Creates a Serialization error for the given format
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_regression(&self) -> bool {
        matches!(self, Self::Regression { .. })
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns the API status code for `Request` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CleverbotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CleverbotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CleverbotError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CleverbotError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CleverbotError>`.
pub type Result<T> = std::result::Result<T, CleverbotError>;
