// # DNS Provider Trait
//
// Defines the interface the update flow consumes from a DNS provider.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{Credential, DnsProvider};
//
// async fn zones(provider: &dyn DnsProvider, credential: &Credential) -> ddns_core::Result<()> {
//     let status = provider.verify_token(credential, None).await?;
//     if status.is_active() {
//         for zone in provider.list_zones(credential).await? {
//             println!("{} ({})", zone.name, zone.id);
//         }
//     }
//     Ok(())
// }
// ```

use crate::credential::Credential;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// IPv4 address record
    #[serde(rename = "A")]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordKind {
    /// Derive the record kind from an address literal
    ///
    /// Any address containing `:` is treated as IPv6. This is a syntactic
    /// check only; the address itself is passed through to the provider.
    pub fn for_address(address: &str) -> Self {
        if address.contains(':') {
            RecordKind::Aaaa
        } else {
            RecordKind::A
        }
    }

    /// Provider-facing type string
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
        }
    }

    /// Parse a provider type string, `None` for non-address kinds
    pub fn from_type(record_type: &str) -> Option<Self> {
        match record_type {
            "A" => Some(RecordKind::A),
            "AAAA" => Some(RecordKind::Aaaa),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a token verification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenVerification {
    /// Textual status reported by the provider (e.g. "active", "disabled")
    pub status: String,
}

impl TokenVerification {
    /// Only `"active"` tokens may update records
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// A DNS zone visible to a credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-assigned zone ID
    pub id: String,
    /// Zone apex (e.g. "example.com")
    #[serde(default)]
    pub name: String,
}

/// A DNS record as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Provider-assigned record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Fully-qualified record name
    #[serde(default)]
    pub name: String,
    /// Record type as reported by the provider (A, AAAA, CNAME, ...)
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// Current record content
    #[serde(default)]
    pub content: String,
    /// Whether traffic is routed through the provider's edge network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    /// Time-to-live (1 means automatic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl Record {
    /// The proxied flag, `false` when the provider omitted it
    pub fn proxied_or_default(&self) -> bool {
        self.proxied.unwrap_or(false)
    }

    /// The record ID, only if present and non-empty
    pub fn record_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// The record kind, `None` for non-address records
    pub fn kind(&self) -> Option<RecordKind> {
        RecordKind::from_type(&self.record_type)
    }
}

/// Server-side record filter for `list_records`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    /// Exact record name
    pub name: String,
    /// Record kind
    pub kind: RecordKind,
}

/// Body of an update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordUpdate {
    /// Record type
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Record name
    pub name: String,
    /// New content (the requested address)
    pub content: String,
    /// Time-to-live, omitted to keep the provider default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Proxied flag, preserved from the current record
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// Every method takes the caller's [`Credential`]: the service holds no
/// credentials of its own, so each request authenticates with whatever the
/// client presented.
///
/// # Thread Safety
///
/// Implementations must be thread-safe; the bulk updater calls them from
/// several spawned tasks at once.
///
/// # Trust Level: Untrusted
///
/// Providers perform API calls and parse responses. They must not retry,
/// cache state beyond a single call, or decide whether an update is needed.
/// Failures are returned as-is; the update flow treats them as final.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Verify the credential and return its status
    ///
    /// `account_id` selects account-scoped verification; `None` verifies at
    /// user scope.
    async fn verify_token(
        &self,
        credential: &Credential,
        account_id: Option<&str>,
    ) -> Result<TokenVerification, crate::Error>;

    /// List every zone visible to the credential
    async fn list_zones(&self, credential: &Credential) -> Result<Vec<Zone>, crate::Error>;

    /// List records of a zone
    ///
    /// With a filter, only records matching its exact name and kind are
    /// returned; without one, every record of the zone is returned.
    async fn list_records(
        &self,
        credential: &Credential,
        zone_id: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<Record>, crate::Error>;

    /// Overwrite a record and return the provider's view of it
    async fn update_record(
        &self,
        credential: &Credential,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<Record, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
