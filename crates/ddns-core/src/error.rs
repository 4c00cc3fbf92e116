//! Error types for the DDNS updater
//!
//! Every failure the update flow can detect is a variant of [`Error`]. The
//! caller-facing variants carry their final message; everything else is
//! collapsed into a generic `500` by [`HttpError`].

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to the caller for any failure without a stable message
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, malformed or inactive credential (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Malformed `ip` or hostname parameters (422)
    #[error("{0}")]
    UnprocessableInput(String),

    /// Zero or several zones/records where exactly one was required (400)
    #[error("{0}")]
    AmbiguousOrMissingResource(String),

    /// A provider resource lacks a required field (400)
    #[error("{0}")]
    InvalidResourceState(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// `Authorization` header absent
    pub fn missing_token() -> Self {
        Self::Unauthorized("Error: Missing token.".to_string())
    }

    /// `Authorization` header present but unusable
    pub fn invalid_token() -> Self {
        Self::Unauthorized("Error: Invalid token.".to_string())
    }

    /// Token verified by the provider but not active
    pub fn invalid_token_status(status: &str) -> Self {
        Self::Unauthorized(format!("Error: Invalid token status, {status}"))
    }

    /// `ip` parameter absent or empty
    pub fn invalid_ip() -> Self {
        Self::UnprocessableInput("Error: Invalid IP.".to_string())
    }

    /// hostname parameter absent or empty
    pub fn invalid_hostname() -> Self {
        Self::UnprocessableInput("Error: Invalid hostname.".to_string())
    }

    /// No zone matched the request
    pub fn no_zone() -> Self {
        Self::AmbiguousOrMissingResource(
            "Error: No zone was found! The token should scope to one (1) zone.".to_string(),
        )
    }

    /// Several zones visible in strict mode
    pub fn multiple_zones() -> Self {
        Self::AmbiguousOrMissingResource(
            "Error: More than one zone was found! The token should scope to one (1) zone."
                .to_string(),
        )
    }

    /// No record matched the target
    pub fn no_record() -> Self {
        Self::AmbiguousOrMissingResource(
            "Error: No record was found! Must manually create the record first.".to_string(),
        )
    }

    /// No qualifying record inside a bulk-mode zone
    pub fn no_record_in_zone(zone: &str) -> Self {
        Self::AmbiguousOrMissingResource(format!(
            "Error: No record was found for zone {zone}! Must manually create the record first."
        ))
    }

    /// Several records matched a strict-mode target
    pub fn multiple_records() -> Self {
        Self::AmbiguousOrMissingResource("Error: More than one record was found!".to_string())
    }

    /// Record returned by the provider has no identifier
    pub fn invalid_record_id() -> Self {
        Self::InvalidResourceState("Error: Invalid Record ID.".to_string())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error carries a caller-facing status and message
    pub fn is_client_facing(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_)
                | Self::UnprocessableInput(_)
                | Self::AmbiguousOrMissingResource(_)
                | Self::InvalidResourceState(_)
        )
    }

    /// HTTP status code reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::UnprocessableInput(_) => 422,
            Self::AmbiguousOrMissingResource(_) | Self::InvalidResourceState(_) => 400,
            _ => 500,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Caller-facing failure: a status code and a stable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    /// HTTP status code
    pub status: u16,
    /// Plain-text response body
    pub message: String,
}

impl From<&Error> for HttpError {
    fn from(err: &Error) -> Self {
        if err.is_client_facing() {
            return Self {
                status: err.status_code(),
                message: err.to_string(),
            };
        }

        tracing::error!("Unhandled error while processing update: {}", err);
        Self {
            status: 500,
            message: INTERNAL_SERVER_ERROR.to_string(),
        }
    }
}

impl From<Error> for HttpError {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}
