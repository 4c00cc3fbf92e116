//! Credential extraction from the `Authorization` header
//!
//! Two header shapes are understood, selected by [`AuthScheme`]:
//!
//! - Basic: `<scheme> base64(identity:secret)`
//! - Bearer: `<scheme> <token>`
//!
//! The scheme word itself is not checked. Extraction is a pure parse; the
//! secret is never logged.

use crate::config::AuthScheme;
use crate::error::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Provider credentials presented by the caller
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Account identity (e.g. email), absent for bearer tokens
    identity: Option<String>,

    /// API token
    /// ⚠️ NEVER log this value
    secret: String,
}

// Custom Debug implementation that hides the secret
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

impl Credential {
    /// Create a credential with an identity
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            secret: secret.into(),
        }
    }

    /// Create a credential from a bare token
    pub fn bearer(secret: impl Into<String>) -> Self {
        Self {
            identity: None,
            secret: secret.into(),
        }
    }

    /// The identity part, if any
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// The secret part
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// Parse the `Authorization` header into a [`Credential`]
///
/// # Errors
///
/// - `401 Error: Missing token.` when the header is absent
/// - `401 Error: Invalid token.` when it cannot be parsed
pub fn extract_credential(authorization: Option<&str>, scheme: AuthScheme) -> Result<Credential> {
    let header = authorization.ok_or_else(Error::missing_token)?;

    let data = header
        .trim()
        .split_once(' ')
        .map(|(_, data)| data.trim())
        .filter(|data| !data.is_empty())
        .ok_or_else(Error::invalid_token)?;

    match scheme {
        AuthScheme::Basic => parse_basic(data),
        AuthScheme::Bearer => Ok(Credential::bearer(data)),
    }
}

fn parse_basic(data: &str) -> Result<Credential> {
    let decoded = STANDARD.decode(data).map_err(|_| Error::invalid_token())?;
    let decoded = String::from_utf8(decoded).map_err(|_| Error::invalid_token())?;

    if decoded.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return Err(Error::invalid_token());
    }

    let (identity, secret) = decoded.split_once(':').ok_or_else(Error::invalid_token)?;

    Ok(Credential::new(identity, secret))
}
