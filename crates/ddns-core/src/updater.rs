//! Record updates for a resolved request
//!
//! The new content is always the requested address. Name and kind come from
//! the resolved record, and the proxied flag is carried over (defaulting to
//! `false`). Strict mode keeps the record's TTL and updates sequentially;
//! bulk mode writes TTL 1 ("automatic") and fans out across zones and across
//! the records of each zone.

use crate::config::ResolutionMode;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::fanout::join_fail_fast;
use crate::resolver::{Resolution, ResolvedRecord, ResolvedZone};
use crate::traits::{DnsProvider, Record, RecordUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// TTL written by bulk updates (1 means automatic)
pub const BULK_TTL: u32 = 1;

/// Provider responses for the records of one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Zone name
    pub zone: String,
    /// Updated records as returned by the provider
    #[serde(rename = "record")]
    pub records: Vec<Record>,
}

/// Apply a resolution
///
/// Every record must carry an ID; this is checked for all records before the
/// first update is issued.
///
/// # Errors
///
/// - `400 Error: Invalid Record ID.` for a record without ID
/// - the first provider error observed
pub async fn apply(
    provider: &Arc<dyn DnsProvider>,
    credential: &Credential,
    resolution: Resolution,
) -> Result<Vec<UpdateResult>> {
    let has_missing_id = resolution
        .zones
        .iter()
        .flat_map(|z| &z.records)
        .any(|r| r.record.record_id().is_none());
    if has_missing_id {
        return Err(Error::invalid_record_id());
    }

    match resolution.mode {
        ResolutionMode::Strict => {
            let mut results = Vec::with_capacity(resolution.zones.len());
            for resolved in resolution.zones {
                results.push(update_zone_sequentially(provider.as_ref(), credential, resolved).await?);
            }
            Ok(results)
        }
        ResolutionMode::Bulk => {
            let handles = resolution
                .zones
                .into_iter()
                .map(|resolved| {
                    let provider = Arc::clone(provider);
                    let credential = credential.clone();
                    tokio::spawn(async move {
                        update_zone_concurrently(provider, credential, resolved).await
                    })
                })
                .collect();

            join_fail_fast(handles).await
        }
    }
}

async fn update_zone_sequentially(
    provider: &dyn DnsProvider,
    credential: &Credential,
    resolved: ResolvedZone,
) -> Result<UpdateResult> {
    let mut records = Vec::with_capacity(resolved.records.len());
    for record in &resolved.records {
        let update = build_update(record, record.record.ttl);
        records.push(update_one(provider, credential, &resolved.zone.id, record, &update).await?);
    }

    Ok(UpdateResult {
        zone: resolved.zone.name,
        records,
    })
}

async fn update_zone_concurrently(
    provider: Arc<dyn DnsProvider>,
    credential: Credential,
    resolved: ResolvedZone,
) -> Result<UpdateResult> {
    let zone_id = Arc::new(resolved.zone.id);

    let handles = resolved
        .records
        .into_iter()
        .map(|record| {
            let provider = Arc::clone(&provider);
            let credential = credential.clone();
            let zone_id = Arc::clone(&zone_id);
            tokio::spawn(async move {
                let update = build_update(&record, Some(BULK_TTL));
                update_one(provider.as_ref(), &credential, &zone_id, &record, &update).await
            })
        })
        .collect();

    let records = join_fail_fast(handles).await?;
    Ok(UpdateResult {
        zone: resolved.zone.name,
        records,
    })
}

fn build_update(resolved: &ResolvedRecord, ttl: Option<u32>) -> RecordUpdate {
    RecordUpdate {
        kind: resolved.kind,
        name: resolved.record.name.clone(),
        content: resolved.address.clone(),
        ttl,
        proxied: resolved.record.proxied_or_default(),
    }
}

async fn update_one(
    provider: &dyn DnsProvider,
    credential: &Credential,
    zone_id: &str,
    resolved: &ResolvedRecord,
    update: &RecordUpdate,
) -> Result<Record> {
    let record_id = resolved
        .record
        .record_id()
        .ok_or_else(Error::invalid_record_id)?;

    debug!(
        "Updating {} ({}): {} -> {}",
        update.name, update.kind, resolved.record.content, update.content
    );

    let response = provider
        .update_record(credential, zone_id, record_id, update)
        .await?;

    info!("DNS record updated: {} -> {}", update.name, update.content);
    Ok(response)
}
