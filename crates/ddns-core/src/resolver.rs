//! Zone/record resolution
//!
//! Maps update targets onto the provider's zones and records. Resolution is
//! read-only: it verifies the credential, lists zones and lists records, and
//! enforces the ambiguity/existence policy of the configured
//! [`ResolutionMode`].
//!
//! ## Strict mode
//!
//! The credential must see exactly one zone. Within it, every target must
//! match exactly one record of the same name and kind.
//!
//! ## Bulk mode
//!
//! Zones are selected by name: a zone qualifies when a target names its apex.
//! Every address record beneath a selected zone (wildcards excluded) is
//! resolved. Record listings for the selected zones run concurrently; the
//! first zone without a qualifying record fails the whole batch.

use crate::config::{ResolutionMode, ServiceConfig};
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::fanout::join_fail_fast;
use crate::target::UpdateTarget;
use crate::traits::{DnsProvider, Record, RecordFilter, RecordKind, Zone};
use std::sync::Arc;
use tracing::debug;

/// A record to rewrite and the address to write into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    /// Record as currently stored by the provider
    pub record: Record,
    /// Requested address
    pub address: String,
    /// Record kind derived from the address
    pub kind: RecordKind,
}

/// A zone and the records to rewrite inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedZone {
    /// Provider zone
    pub zone: Zone,
    /// Records to rewrite, in provider listing order
    pub records: Vec<ResolvedRecord>,
}

/// Outcome of resolution, ready for the updater
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Mode the resolution was performed in
    pub mode: ResolutionMode,
    /// Resolved zones (exactly one in strict mode)
    pub zones: Vec<ResolvedZone>,
}

impl Resolution {
    /// Total number of records to rewrite
    pub fn record_count(&self) -> usize {
        self.zones.iter().map(|z| z.records.len()).sum()
    }
}

/// Resolve targets to zones and records
///
/// # Errors
///
/// - `401` when the token is not active
/// - `400` on missing or ambiguous zones/records
/// - provider errors unchanged
pub async fn resolve(
    provider: &Arc<dyn DnsProvider>,
    credential: &Credential,
    targets: &[UpdateTarget],
    config: &ServiceConfig,
) -> Result<Resolution> {
    let scope = match config.mode {
        ResolutionMode::Strict => None,
        ResolutionMode::Bulk => config.account_id.as_deref(),
    };
    verify_credential(provider.as_ref(), credential, scope).await?;

    let zones = match config.mode {
        ResolutionMode::Strict => vec![resolve_strict(provider.as_ref(), credential, targets).await?],
        ResolutionMode::Bulk => resolve_bulk(provider, credential, targets).await?,
    };

    Ok(Resolution {
        mode: config.mode,
        zones,
    })
}

/// Fail unless the provider reports the credential as active
async fn verify_credential(
    provider: &dyn DnsProvider,
    credential: &Credential,
    account_id: Option<&str>,
) -> Result<()> {
    let verification = provider.verify_token(credential, account_id).await?;
    if !verification.is_active() {
        return Err(Error::invalid_token_status(&verification.status));
    }

    debug!("Token verified as active");
    Ok(())
}

async fn resolve_strict(
    provider: &dyn DnsProvider,
    credential: &Credential,
    targets: &[UpdateTarget],
) -> Result<ResolvedZone> {
    let mut zones = provider.list_zones(credential).await?;
    let zone = match zones.len() {
        0 => return Err(Error::no_zone()),
        1 => zones.remove(0),
        _ => return Err(Error::multiple_zones()),
    };

    debug!("Resolved zone {} ({})", zone.name, zone.id);

    let mut records = Vec::with_capacity(targets.len());
    for target in targets {
        let filter = RecordFilter {
            name: target.hostname.clone(),
            kind: target.kind,
        };

        let mut matches = provider
            .list_records(credential, &zone.id, Some(&filter))
            .await?;

        let record = match matches.len() {
            0 => return Err(Error::no_record()),
            1 => matches.remove(0),
            _ => return Err(Error::multiple_records()),
        };

        debug!("Resolved record {} ({})", target.hostname, target.kind);
        records.push(ResolvedRecord {
            record,
            address: target.address.clone(),
            kind: target.kind,
        });
    }

    Ok(ResolvedZone { zone, records })
}

async fn resolve_bulk(
    provider: &Arc<dyn DnsProvider>,
    credential: &Credential,
    targets: &[UpdateTarget],
) -> Result<Vec<ResolvedZone>> {
    let selected: Vec<(Zone, UpdateTarget)> = provider
        .list_zones(credential)
        .await?
        .into_iter()
        .filter_map(|zone| {
            targets
                .iter()
                .find(|t| same_name(&t.hostname, &zone.name))
                .map(|t| (zone, t.clone()))
        })
        .collect();

    if selected.is_empty() {
        return Err(Error::no_zone());
    }

    debug!("Selected {} zone(s) for bulk update", selected.len());

    let handles = selected
        .into_iter()
        .map(|(zone, target)| {
            let provider = Arc::clone(provider);
            let credential = credential.clone();
            tokio::spawn(async move {
                let records = provider.list_records(&credential, &zone.id, None).await?;
                let records: Vec<ResolvedRecord> = records
                    .into_iter()
                    .filter(|r| is_bulk_candidate(r, &zone.name, target.kind))
                    .map(|record| ResolvedRecord {
                        record,
                        address: target.address.clone(),
                        kind: target.kind,
                    })
                    .collect();

                if records.is_empty() {
                    return Err(Error::no_record_in_zone(&zone.name));
                }

                debug!("Zone {}: {} record(s) to update", zone.name, records.len());
                Ok(ResolvedZone { zone, records })
            })
        })
        .collect();

    join_fail_fast(handles).await
}

/// Whether a record beneath `zone_name` should be rewritten in bulk mode
fn is_bulk_candidate(record: &Record, zone_name: &str, kind: RecordKind) -> bool {
    let name = normalize(&record.name);
    let suffix = format!(".{}", normalize(zone_name));

    record.kind() == Some(kind) && !name.starts_with("*.") && name.ends_with(&suffix)
}

fn same_name(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
