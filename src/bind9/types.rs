// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Types shared by the BIND9 update and listing layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use crate::constants::{DEFAULT_STATISTICS_PORT, DNS_PORT};
use crate::dns_errors::DnsError;

/// HMAC algorithm of a TSIG key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TsigAlgorithm {
    /// hmac-md5 (legacy, still the BIND9 `tsig-keygen` default on old releases)
    #[serde(rename = "hmac-md5")]
    HmacMd5,
    /// hmac-sha1
    #[serde(rename = "hmac-sha1")]
    HmacSha1,
    /// hmac-sha224
    #[serde(rename = "hmac-sha224")]
    HmacSha224,
    /// hmac-sha256
    #[default]
    #[serde(rename = "hmac-sha256")]
    HmacSha256,
    /// hmac-sha384
    #[serde(rename = "hmac-sha384")]
    HmacSha384,
    /// hmac-sha512
    #[serde(rename = "hmac-sha512")]
    HmacSha512,
}

impl TsigAlgorithm {
    /// BIND9 configuration name of the algorithm.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HmacMd5 => "hmac-md5",
            Self::HmacSha1 => "hmac-sha1",
            Self::HmacSha224 => "hmac-sha224",
            Self::HmacSha256 => "hmac-sha256",
            Self::HmacSha384 => "hmac-sha384",
            Self::HmacSha512 => "hmac-sha512",
        }
    }

    /// Parse a BIND9 algorithm name, case-insensitively.
    ///
    /// Accepts the `hmac-md5.sig-alg.reg.int` spelling used by older key files.
    #[must_use]
    pub fn from_bind_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hmac-md5" | "hmac-md5.sig-alg.reg.int" | "hmac-md5.sig-alg.reg.int." => {
                Some(Self::HmacMd5)
            }
            "hmac-sha1" => Some(Self::HmacSha1),
            "hmac-sha224" => Some(Self::HmacSha224),
            "hmac-sha256" => Some(Self::HmacSha256),
            "hmac-sha384" => Some(Self::HmacSha384),
            "hmac-sha512" => Some(Self::HmacSha512),
            _ => None,
        }
    }
}

/// A stored TSIG key: name, algorithm and base64-encoded secret.
///
/// The secret is kept encoded; it is only decoded by the keyring resolver for
/// the duration of one operation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsigKey {
    /// Key name (must match the `key "<name>"` statement on the server)
    pub name: String,
    /// HMAC algorithm
    #[serde(default)]
    pub algorithm: TsigAlgorithm,
    /// Base64-encoded secret key
    pub secret: String,
}

impl fmt::Debug for TsigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigKey")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A BIND9 server known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindServer {
    /// Hostname or IP address used to reach the server
    pub hostname: String,
    /// Port for dynamic updates and zone transfers
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,
    /// Port of the BIND9 statistics channel (used to enumerate zones)
    #[serde(default = "default_statistics_port")]
    pub statistics_port: u16,
}

fn default_dns_port() -> u16 {
    DNS_PORT
}

fn default_statistics_port() -> u16 {
    DEFAULT_STATISTICS_PORT
}

impl BindServer {
    /// Create a server entry with default ports.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            dns_port: DNS_PORT,
            statistics_port: DEFAULT_STATISTICS_PORT,
        }
    }

    /// `host:port` address for DNS traffic. IPv6 literals are bracketed.
    #[must_use]
    pub fn dns_address(&self) -> String {
        if self.hostname.contains(':') && !self.hostname.starts_with('[') {
            format!("[{}]:{}", self.hostname, self.dns_port)
        } else {
            format!("{}:{}", self.hostname, self.dns_port)
        }
    }
}

/// Result of one requested sub-operation (forward record, reverse record, or
/// one deletion target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Human-readable label of what was attempted
    pub description: String,
    /// Whether the server accepted the update
    pub success: bool,
    /// Server response summary or error message
    pub detail: String,
    /// Stable failure reason code, `None` on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl UpdateOutcome {
    /// Outcome for an update the server accepted.
    #[must_use]
    pub fn succeeded(description: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: true,
            detail: detail.into(),
            reason: None,
        }
    }

    /// Outcome for an update that failed anywhere along the way.
    #[must_use]
    pub fn failed(description: impl Into<String>, error: &DnsError) -> Self {
        Self {
            description: description.into(),
            success: false,
            detail: error.to_string(),
            reason: Some(error.status_reason()),
        }
    }
}

/// Result of a listing: the items that could be read plus the error that
/// stopped the listing, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Why the listing is empty or incomplete
    pub error: Option<DnsError>,
}

impl<T> Listing<T> {
    /// A complete listing.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        Self { items, error: None }
    }

    /// An empty listing carrying the error that prevented it.
    #[must_use]
    pub fn degraded(error: DnsError) -> Self {
        Self {
            items: Vec::new(),
            error: Some(error),
        }
    }
}

/// One address a server hostname resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerAddress {
    /// Family and position among that family, e.g. `IPv4 (1)`
    pub label: String,
    /// The resolved address
    pub address: IpAddr,
}

/// One resource record as read from a zone transfer, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneRecord {
    /// Owner name, fully qualified
    pub name: String,
    /// Time to live in seconds
    pub ttl: u32,
    /// Record class (normally `IN`)
    pub class: String,
    /// Record type mnemonic
    pub record_type: String,
    /// Presentation-format record data
    pub data: String,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
