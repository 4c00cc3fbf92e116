// # ddns-core
//
// Core library for the HTTP-triggered DDNS updater.
//
// A client (router, gateway) calls `GET /update` with its credential, the
// hostname(s) to update and its new address. This crate holds everything
// between the parsed request and the response:
//
// - **credential**: `Authorization` header → `Credential`
// - **target**: query string → `UpdateTarget`s
// - **resolver**: targets → zones and records (strict or bulk policy)
// - **updater**: resolved records → provider update calls
// - **error**: typed failures and their caller-facing translation
// - **engine**: `UpdateService`, which runs the steps above per request
//
// Providers plug in through the `DnsProvider` trait. The HTTP server lives in
// `ddnsd`; this crate has no HTTP server dependency.

pub mod traits;
pub mod engine;
pub mod config;
pub mod credential;
pub mod error;
pub mod resolver;
pub mod target;
pub mod updater;

mod fanout;

// Re-export core types for convenience
pub use traits::{DnsProvider, Record, RecordFilter, RecordKind, RecordUpdate, TokenVerification, Zone};
pub use engine::{ResponseBody, UpdateRequest, UpdateResponse, UpdateService};
pub use config::{AuthScheme, ResolutionMode, ServiceConfig};
pub use credential::{Credential, extract_credential};
pub use error::{Error, HttpError, Result};
pub use target::{UpdateQuery, UpdateTarget, parse_targets};
pub use updater::UpdateResult;
