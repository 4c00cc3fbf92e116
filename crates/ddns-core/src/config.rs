//! Configuration types for the DDNS updater
//!
//! Only deployment-wide choices live here. Credentials and targets are never
//! configured; they arrive with each request.

use serde::{Deserialize, Serialize};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// How targets are resolved to zones and records
    #[serde(default)]
    pub mode: ResolutionMode,

    /// Expected shape of the `Authorization` header
    #[serde(default)]
    pub auth_scheme: AuthScheme,

    /// Account used for account-scoped token verification (bulk mode)
    #[serde(default)]
    pub account_id: Option<String>,
}

impl ServiceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolution mode
    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the authorization scheme
    pub fn with_auth_scheme(mut self, auth_scheme: AuthScheme) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    /// Set the account ID
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.mode == ResolutionMode::Bulk
            && self.account_id.as_deref().is_none_or(str::is_empty)
        {
            return Err(crate::Error::config(
                "An account ID is required for bulk mode token verification",
            ));
        }

        Ok(())
    }
}

/// Zone/record resolution policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Exactly one zone per credential, exactly one record per target
    #[default]
    Strict,
    /// Zones named after the targets, every address record beneath them
    Bulk,
}

/// `Authorization` header shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `<scheme> base64(identity:secret)`
    #[default]
    Basic,
    /// `<scheme> <token>`
    Bearer,
}
