//! Test doubles and common utilities for update contract tests
//!
//! The mock provider keeps zones and records in memory, counts every call,
//! and can be told to fail or stall specific operations.

#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::STANDARD};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, Record, RecordFilter, RecordUpdate, TokenVerification, Zone};
use ddns_core::{
    Credential, ResolutionMode, ServiceConfig, UpdateQuery, UpdateRequest, UpdateService,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ACCOUNT_ID: &str = "account-id";

/// One recorded `update_record` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub zone_id: String,
    pub record_id: String,
    pub update: RecordUpdate,
}

/// In-memory DnsProvider that tracks calls
#[derive(Default)]
pub struct MockDnsProvider {
    token_status: Mutex<String>,
    zones: Mutex<Vec<Zone>>,
    records: Mutex<HashMap<String, Vec<Record>>>,
    failing_verify: AtomicBool,
    panicking_verify: AtomicBool,
    failing_updates: Mutex<HashSet<String>>,
    update_delays: Mutex<HashMap<String, Duration>>,
    verify_scopes: Mutex<Vec<Option<String>>>,
    list_zones_call_count: AtomicUsize,
    list_records_call_count: AtomicUsize,
    updates: Mutex<Vec<UpdateCall>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            token_status: Mutex::new("active".to_string()),
            ..Self::default()
        }
    }

    pub fn with_token_status(self, status: &str) -> Self {
        *self.token_status.lock().unwrap() = status.to_string();
        self
    }

    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.zones.lock().unwrap().push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_record(self, zone_id: &str, record: Record) -> Self {
        self.records
            .lock()
            .unwrap()
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
        self
    }

    /// Make `verify_token` return a provider error
    pub fn failing_verify(self) -> Self {
        self.failing_verify.store(true, Ordering::SeqCst);
        self
    }

    /// Make `verify_token` panic
    pub fn panicking_verify(self) -> Self {
        self.panicking_verify.store(true, Ordering::SeqCst);
        self
    }

    /// Make updates of `record_id` fail
    pub fn failing_update(self, record_id: &str) -> Self {
        self.failing_updates
            .lock()
            .unwrap()
            .insert(record_id.to_string());
        self
    }

    /// Delay updates of `record_id`
    pub fn delayed_update(self, record_id: &str, delay: Duration) -> Self {
        self.update_delays
            .lock()
            .unwrap()
            .insert(record_id.to_string(), delay);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn verify_scopes(&self) -> Vec<Option<String>> {
        self.verify_scopes.lock().unwrap().clone()
    }

    pub fn list_zones_call_count(&self) -> usize {
        self.list_zones_call_count.load(Ordering::SeqCst)
    }

    pub fn list_records_call_count(&self) -> usize {
        self.list_records_call_count.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.lock().unwrap().clone()
    }

    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Current stored content of a record
    pub fn content_of(&self, record_id: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|r| r.id.as_deref() == Some(record_id))
            .map(|r| r.content.clone())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn verify_token(
        &self,
        _credential: &Credential,
        account_id: Option<&str>,
    ) -> Result<TokenVerification> {
        if self.panicking_verify.load(Ordering::SeqCst) {
            panic!("Unexpected Error");
        }
        if self.failing_verify.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "Unexpected Error"));
        }

        self.verify_scopes
            .lock()
            .unwrap()
            .push(account_id.map(str::to_string));

        Ok(TokenVerification {
            status: self.token_status.lock().unwrap().clone(),
        })
    }

    async fn list_zones(&self, _credential: &Credential) -> Result<Vec<Zone>> {
        self.list_zones_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.zones.lock().unwrap().clone())
    }

    async fn list_records(
        &self,
        _credential: &Credential,
        zone_id: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<Record>> {
        self.list_records_call_count.fetch_add(1, Ordering::SeqCst);

        let records = self
            .records
            .lock()
            .unwrap()
            .get(zone_id)
            .cloned()
            .unwrap_or_default();

        Ok(match filter {
            Some(filter) => records
                .into_iter()
                .filter(|r| r.name == filter.name && r.record_type == filter.kind.as_str())
                .collect(),
            None => records,
        })
    }

    async fn update_record(
        &self,
        _credential: &Credential,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<Record> {
        let delay = self.update_delays.lock().unwrap().get(record_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.updates.lock().unwrap().push(UpdateCall {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            update: update.clone(),
        });

        if self.failing_updates.lock().unwrap().contains(record_id) {
            return Err(Error::provider("mock", format!("update of {} failed", record_id)));
        }

        let mut records = self.records.lock().unwrap();
        let stored = records
            .get_mut(zone_id)
            .and_then(|rs| rs.iter_mut().find(|r| r.id.as_deref() == Some(record_id)))
            .ok_or_else(|| Error::provider("mock", "record does not exist"))?;

        stored.content = update.content.clone();
        stored.proxied = Some(update.proxied);
        if update.ttl.is_some() {
            stored.ttl = update.ttl;
        }

        Ok(stored.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build a record with no optional attributes
pub fn record(id: &str, name: &str, record_type: &str) -> Record {
    Record {
        id: Some(id.to_string()),
        name: name.to_string(),
        record_type: record_type.to_string(),
        content: String::new(),
        proxied: None,
        ttl: None,
    }
}

/// `Basic base64(identity:secret)`
pub fn basic_auth(identity: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{identity}:{secret}")))
}

/// Valid strict-mode request for one hostname
pub fn request(ip: &str, hostname: &str) -> UpdateRequest {
    UpdateRequest::new(
        Some(basic_auth("email@example.com", "validtoken")),
        UpdateQuery::new(ip, hostname),
    )
}

/// Valid bulk-mode request for a host list
pub fn bulk_request(ip: &str, hosts: &str) -> UpdateRequest {
    UpdateRequest::new(
        Some(basic_auth("email@example.com", "validtoken")),
        UpdateQuery {
            ip: Some(ip.to_string()),
            host: Some(hosts.to_string()),
            ..UpdateQuery::default()
        },
    )
}

pub fn strict_service(provider: &Arc<MockDnsProvider>) -> UpdateService {
    UpdateService::new(provider.clone(), ServiceConfig::new()).expect("valid config")
}

pub fn bulk_service(provider: &Arc<MockDnsProvider>) -> UpdateService {
    let config = ServiceConfig::new()
        .with_mode(ResolutionMode::Bulk)
        .with_account_id(ACCOUNT_ID);
    UpdateService::new(provider.clone(), config).expect("valid config")
}
