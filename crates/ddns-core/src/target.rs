//! Update target parsing from the request query string

use crate::error::{Error, Result};
use crate::traits::RecordKind;
use serde::{Deserialize, Serialize};

/// Query parameters of an update request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuery {
    /// New address
    #[serde(default)]
    pub ip: Option<String>,
    /// dyndns2-style alias for `ip`
    #[serde(default)]
    pub myip: Option<String>,
    /// Single hostname (a comma list is tolerated)
    #[serde(default)]
    pub hostname: Option<String>,
    /// Comma-delimited hostname list
    #[serde(default)]
    pub host: Option<String>,
}

impl UpdateQuery {
    /// Build a query for one hostname
    pub fn new(ip: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            hostname: Some(hostname.into()),
            ..Self::default()
        }
    }
}

/// A (hostname, address) pair to write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateTarget {
    /// Fully-qualified hostname
    pub hostname: String,
    /// Address literal, passed through unchanged
    pub address: String,
    /// Record kind derived from the address
    pub kind: RecordKind,
}

impl UpdateTarget {
    /// Create a target, deriving the record kind from the address
    pub fn new(hostname: impl Into<String>, address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            hostname: hostname.into(),
            kind: RecordKind::for_address(&address),
            address,
        }
    }
}

/// Parse the update targets of a request
///
/// # Errors
///
/// - `422 Error: Invalid IP.` when neither `ip` nor `myip` carries a value
/// - `422 Error: Invalid hostname.` when no non-empty hostname is given
pub fn parse_targets(query: &UpdateQuery) -> Result<Vec<UpdateTarget>> {
    let address = non_empty(&query.ip)
        .or_else(|| non_empty(&query.myip))
        .ok_or_else(Error::invalid_ip)?;

    let hostnames = non_empty(&query.hostname)
        .or_else(|| non_empty(&query.host))
        .ok_or_else(Error::invalid_hostname)?;

    let mut targets: Vec<UpdateTarget> = Vec::new();
    for hostname in hostnames.split(',').map(str::trim).filter(|h| !h.is_empty()) {
        if targets.iter().any(|t| t.hostname == hostname) {
            continue;
        }
        targets.push(UpdateTarget::new(hostname, address));
    }

    if targets.is_empty() {
        return Err(Error::invalid_hostname());
    }

    Ok(targets)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_hostname_ipv4() {
        let targets = parse_targets(&UpdateQuery::new("192.0.2.1", "home.example.com")).unwrap();
        assert_eq!(targets, vec![UpdateTarget::new("home.example.com", "192.0.2.1")]);
        assert_eq!(targets[0].kind, RecordKind::A);
    }

    #[test]
    fn single_hostname_ipv6() {
        let targets = parse_targets(&UpdateQuery::new("2001:db8::1", "home.example.com")).unwrap();
        assert_eq!(targets[0].kind, RecordKind::Aaaa);
        assert_eq!(targets[0].address, "2001:db8::1");
    }

    #[test]
    fn missing_ip_is_checked_first() {
        let err = parse_targets(&UpdateQuery::default()).unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.to_string(), "Error: Invalid IP.");
    }

    #[test]
    fn empty_ip_is_invalid() {
        let query = UpdateQuery::new("", "home.example.com");
        assert_eq!(parse_targets(&query).unwrap_err().to_string(), "Error: Invalid IP.");
    }

    #[test]
    fn missing_hostname_is_invalid() {
        let query = UpdateQuery {
            ip: Some("192.0.2.1".to_string()),
            ..UpdateQuery::default()
        };
        let err = parse_targets(&query).unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.to_string(), "Error: Invalid hostname.");
    }

    #[test]
    fn hostname_list_of_blanks_is_invalid() {
        let query = UpdateQuery {
            ip: Some("192.0.2.1".to_string()),
            host: Some(" , ,".to_string()),
            ..UpdateQuery::default()
        };
        assert_eq!(parse_targets(&query).unwrap_err().to_string(), "Error: Invalid hostname.");
    }

    #[test]
    fn host_list_is_split_trimmed_and_deduplicated() {
        let query = UpdateQuery {
            ip: Some("192.0.2.1".to_string()),
            host: Some("example.com, example.org ,,example.com".to_string()),
            ..UpdateQuery::default()
        };
        let targets = parse_targets(&query).unwrap();
        let names: Vec<_> = targets.iter().map(|t| t.hostname.as_str()).collect();
        assert_eq!(names, vec!["example.com", "example.org"]);
        assert!(targets.iter().all(|t| t.address == "192.0.2.1"));
    }

    #[test]
    fn myip_is_an_alias_and_ip_wins() {
        let query = UpdateQuery {
            myip: Some("198.51.100.7".to_string()),
            hostname: Some("home.example.com".to_string()),
            ..UpdateQuery::default()
        };
        assert_eq!(parse_targets(&query).unwrap()[0].address, "198.51.100.7");

        let query = UpdateQuery {
            ip: Some("192.0.2.1".to_string()),
            ..query
        };
        assert_eq!(parse_targets(&query).unwrap()[0].address, "192.0.2.1");
    }
}
