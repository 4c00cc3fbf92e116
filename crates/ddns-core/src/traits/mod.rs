//! Core traits for the DDNS updater
//!
//! - [`DnsProvider`]: Zone/record listing, token verification and record updates

pub mod dns_provider;

pub use dns_provider::{
    DnsProvider, Record, RecordFilter, RecordKind, RecordUpdate, TokenVerification, Zone,
};
