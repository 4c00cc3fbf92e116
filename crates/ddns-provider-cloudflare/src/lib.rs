// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `ddns_core::DnsProvider`.
//
// ## Behavior
//
// - One HTTP request per trait call, except listings, which follow pagination
// - Authenticates with the caller's credential (Bearer token); holds no secrets
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - No retries, no caching, no background tasks
//
// ## Security Requirements
//
// - API tokens NEVER appear in logs or error messages
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Verify Token: GET `/user/tokens/verify` or `/accounts/:account_id/tokens/verify`
// - List Zones: GET `/zones`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, Record, RecordFilter, RecordUpdate, TokenVerification, Zone};
use ddns_core::{Credential, Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for zone listings (Cloudflare maximum)
const ZONES_PER_PAGE: u32 = 50;

/// Page size for record listings
const RECORDS_PER_PAGE: u32 = 100;

/// Cloudflare API response envelope
#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareError>,
    result: Option<T>,
    result_info: Option<CloudflareResultInfo>,
}

#[derive(Debug, Deserialize)]
struct CloudflareError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CloudflareResultInfo {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
}

/// Cloudflare DNS provider
///
/// # Trust Level: Untrusted
///
/// This provider is isolated and stateless. Every call authenticates with the
/// credential it is given.
#[derive(Debug, Clone)]
pub struct CloudflareProvider {
    /// HTTP client for API requests
    client: reqwest::Client,

    /// API base URL (overridable for testing)
    api_base: String,
}

impl CloudflareProvider {
    /// Create a provider against the public Cloudflare API
    pub fn new() -> Result<Self> {
        Self::with_api_base(CLOUDFLARE_API_BASE)
    }

    /// Create a provider against a custom API base URL
    pub fn with_api_base(api_base: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();
        if api_base.is_empty() {
            return Err(Error::config("Cloudflare API base URL cannot be empty"));
        }

        Ok(Self { client, api_base })
    }

    /// The API base URL in use
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send a request and unwrap the Cloudflare envelope
    ///
    /// `context` names the operation in error messages.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        credential: &Credential,
        context: &str,
    ) -> Result<CloudflareResponse<T>> {
        let response = request
            .bearer_auth(credential.secret())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("Cloudflare {} responded {}", context, status);

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        if !status.is_success() {
            // Map HTTP status codes to specific errors
            return Err(match status.as_u16() {
                401 | 403 => Error::provider(
                    "cloudflare",
                    format!(
                        "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
                        status
                    ),
                ),
                404 => Error::provider("cloudflare", format!("{}: not found", context)),
                409 => Error::provider(
                    "cloudflare",
                    format!("Conflict: Record is being updated by another process. Status: {}", status),
                ),
                429 => Error::provider(
                    "cloudflare",
                    format!("Rate limit exceeded. Please retry later. Status: {}", status),
                ),
                500..=599 => Error::provider(
                    "cloudflare",
                    format!("Cloudflare server error (transient): {} - {}", status, body),
                ),
                _ => Error::provider(
                    "cloudflare",
                    format!("{} failed: {} - {}", context, status, body),
                ),
            });
        }

        let envelope: CloudflareResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::provider("cloudflare", format!("Failed to parse {} response: {}", context, e))
        })?;

        if !envelope.success {
            let message = envelope
                .errors
                .first()
                .map(|e| format!("{} ({})", e.message, e.code))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(Error::provider(
                "cloudflare",
                format!("{} failed: {}", context, message),
            ));
        }

        Ok(envelope)
    }

    /// GET a single result
    async fn get_one<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        context: &str,
    ) -> Result<T> {
        let request = self.client.get(self.url(path));
        self.send::<T>(request, credential, context)
            .await?
            .result
            .ok_or_else(|| {
                Error::provider("cloudflare", format!("Invalid {} response: missing result", context))
            })
    }

    /// GET every page of a listing
    async fn get_all<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
        query: &[(&str, String)],
        per_page: u32,
        context: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let request = self
                .client
                .get(self.url(path))
                .query(query)
                .query(&[("page", page), ("per_page", per_page)]);

            let envelope = self.send::<Vec<T>>(request, credential, context).await?;
            items.extend(envelope.result.unwrap_or_default());

            let total_pages = envelope.result_info.map_or(1, |info| info.total_pages.max(info.page));
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /user/tokens/verify
    /// GET /accounts/:account_id/tokens/verify
    /// ```
    async fn verify_token(
        &self,
        credential: &Credential,
        account_id: Option<&str>,
    ) -> Result<TokenVerification> {
        let path = match account_id {
            Some(account_id) => format!("/accounts/{}/tokens/verify", account_id),
            None => "/user/tokens/verify".to_string(),
        };

        self.get_one(credential, &path, "token verification").await
    }

    /// ```http
    /// GET /zones?page=1&per_page=50
    /// ```
    async fn list_zones(&self, credential: &Credential) -> Result<Vec<Zone>> {
        let zones: Vec<Zone> = self
            .get_all(credential, "/zones", &[], ZONES_PER_PAGE, "zone listing")
            .await?;

        tracing::debug!("Cloudflare returned {} zone(s)", zones.len());
        Ok(zones)
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// ```
    async fn list_records(
        &self,
        credential: &Credential,
        zone_id: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<Record>> {
        let query = match filter {
            Some(filter) => vec![
                ("name", filter.name.clone()),
                ("type", filter.kind.to_string()),
            ],
            None => Vec::new(),
        };

        let path = format!("/zones/{}/dns_records", zone_id);
        let records: Vec<Record> = self
            .get_all(credential, &path, &query, RECORDS_PER_PAGE, "record listing")
            .await?;

        tracing::debug!("Cloudflare returned {} record(s) for zone {}", records.len(), zone_id);
        Ok(records)
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "type": "A",
    ///   "name": "home.example.com",
    ///   "content": "192.0.2.1",
    ///   "ttl": 1,
    ///   "proxied": false
    /// }
    /// ```
    async fn update_record(
        &self,
        credential: &Credential,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<Record> {
        let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);
        let request = self.client.put(self.url(&path)).json(update);

        self.send::<Record>(request, credential, "record update")
            .await?
            .result
            .ok_or_else(|| {
                Error::provider("cloudflare", "Invalid record update response: missing result")
            })
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
