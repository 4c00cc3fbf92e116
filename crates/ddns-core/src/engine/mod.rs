//! Update orchestration
//!
//! The [`UpdateService`] runs one update request end to end:
//!
//! ```text
//! UpdateRequest
//!     │
//!     ├─ credential::extract_credential   (401)
//!     ├─ target::parse_targets            (422)
//!     ├─ resolver::resolve                (401 / 400)
//!     ├─ updater::apply                   (400)
//!     │
//!     ▼
//! UpdateResponse  ◄── HttpError (any failure; untyped → 500)
//! ```
//!
//! The service is stateless. Every request re-reads the provider's zones and
//! records, and nothing is retried.

use crate::config::{ResolutionMode, ServiceConfig};
use crate::credential::extract_credential;
use crate::error::{HttpError, INTERNAL_SERVER_ERROR, Result};
use crate::resolver::resolve;
use crate::target::{UpdateQuery, parse_targets};
use crate::traits::DnsProvider;
use crate::updater::{UpdateResult, apply};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Inputs of one update request
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Raw `Authorization` header value
    pub authorization: Option<String>,
    /// Parsed query string
    pub query: UpdateQuery,
}

impl UpdateRequest {
    /// Create a request
    pub fn new(authorization: Option<String>, query: UpdateQuery) -> Self {
        Self {
            authorization,
            query,
        }
    }
}

/// Response body of an update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// Plain text (`OK` or an error message)
    Text(String),
    /// Per-zone summaries (bulk mode)
    Json(Vec<UpdateResult>),
}

/// Status and body returned to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: ResponseBody,
}

impl From<HttpError> for UpdateResponse {
    fn from(err: HttpError) -> Self {
        Self {
            status: err.status,
            body: ResponseBody::Text(err.message),
        }
    }
}

/// Stateless update service
///
/// Cheap to clone; clones share the provider.
#[derive(Clone)]
pub struct UpdateService {
    /// DNS provider consulted on every request
    provider: Arc<dyn DnsProvider>,

    /// Deployment configuration
    config: ServiceConfig,
}

impl UpdateService {
    /// Create a new update service
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(provider: Arc<dyn DnsProvider>, config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    /// The configuration in use
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run an update, returning the per-zone provider responses
    pub async fn update(&self, request: &UpdateRequest) -> Result<Vec<UpdateResult>> {
        let credential =
            extract_credential(request.authorization.as_deref(), self.config.auth_scheme)?;
        let targets = parse_targets(&request.query)?;

        debug!(
            "Update requested for {} target(s) via {} [mode: {:?}]",
            targets.len(),
            self.provider.provider_name(),
            self.config.mode
        );

        let resolution = resolve(&self.provider, &credential, &targets, &self.config).await?;
        debug!("Resolved {} record(s)", resolution.record_count());

        let results = apply(&self.provider, &credential, resolution).await?;
        info!(
            "Update complete: {} zone(s), {} record(s)",
            results.len(),
            results.iter().map(|r| r.records.len()).sum::<usize>()
        );

        Ok(results)
    }

    /// Run an update and translate the outcome into a response
    ///
    /// Never fails: typed errors keep their status and message, anything else
    /// (including a panic inside the provider) becomes a bare 500.
    pub async fn handle(&self, request: &UpdateRequest) -> UpdateResponse {
        let outcome = AssertUnwindSafe(self.update(request)).catch_unwind().await;

        match outcome {
            Ok(Ok(results)) => UpdateResponse {
                status: 200,
                body: match self.config.mode {
                    ResolutionMode::Strict => ResponseBody::Text("OK".to_string()),
                    ResolutionMode::Bulk => ResponseBody::Json(results),
                },
            },
            Ok(Err(e)) => {
                if e.is_client_facing() {
                    warn!("Update rejected ({}): {}", e.status_code(), e);
                }
                HttpError::from(&e).into()
            }
            Err(_) => {
                error!("Update handler panicked");
                UpdateResponse {
                    status: 500,
                    body: ResponseBody::Text(INTERNAL_SERVER_ERROR.to_string()),
                }
            }
        }
    }
}
