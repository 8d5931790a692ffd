// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fully-qualified domain name helpers.
//!
//! Both reverse-record creation and batch deletion need to break a dotted
//! name into its first label and the zone it lives in. That split lives here
//! and nowhere else.
//!
//! ```rust
//! use binder::fqdn::{reverse_name, split_first_label};
//!
//! let reverse = reverse_name("10.20.0.5".parse().unwrap());
//! assert_eq!(reverse, "5.0.20.10.in-addr.arpa.");
//!
//! let parts = split_first_label(&reverse).unwrap();
//! assert_eq!(parts.label, "5");
//! assert_eq!(parts.zone, "0.20.10.in-addr.arpa.");
//! ```

use hickory_client::rr::Name;
use std::net::IpAddr;
use std::str::FromStr;

use crate::constants::ZONE_APEX_LABEL;
use crate::dns_errors::RecordError;

/// A dotted name broken at its first label boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FqdnParts {
    /// Leading label (e.g. `"5"` for `5.0.20.10.in-addr.arpa.`)
    pub label: String,
    /// Everything after the first dot, trailing dot preserved if present
    pub zone: String,
}

impl FqdnParts {
    /// Re-join the parts into the original name.
    #[must_use]
    pub fn join(&self) -> String {
        format!("{}.{}", self.label, self.zone)
    }
}

/// Split `name` into its first label and the remaining zone.
///
/// # Errors
///
/// Returns [`RecordError::InvalidRecordIdentifier`] when there is no label
/// boundary, or either side of it is empty (`"localhost"`, `".example.com"`,
/// `"host."`).
pub fn split_first_label(name: &str) -> Result<FqdnParts, RecordError> {
    let invalid = || RecordError::InvalidRecordIdentifier {
        identifier: name.to_string(),
    };

    let (label, zone) = name.split_once('.').ok_or_else(invalid)?;
    if label.is_empty() || zone.is_empty() || zone == "." || zone.starts_with('.') {
        return Err(invalid());
    }

    Ok(FqdnParts {
        label: label.to_string(),
        zone: zone.to_string(),
    })
}

/// Canonical reverse-lookup name for an address, with trailing dot.
///
/// IPv4 maps to `d.c.b.a.in-addr.arpa.`, IPv6 to its 32 reversed nibbles
/// under `ip6.arpa.`.
#[must_use]
pub fn reverse_name(address: IpAddr) -> String {
    absolute(&Name::from(address).to_ascii())
}

/// Append a trailing dot unless one is already there.
#[must_use]
pub fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Build the owner name for `label` inside `zone`.
///
/// `@` or an empty label addresses the zone apex.
///
/// # Errors
///
/// Returns [`RecordError::InvalidRecordData`] if the result is not a valid
/// DNS name.
pub fn owner_name(label: &str, zone: &str) -> Result<Name, RecordError> {
    let text = if label == ZONE_APEX_LABEL || label.is_empty() {
        absolute(zone)
    } else {
        absolute(&format!("{label}.{}", zone.trim_end_matches('.')))
    };
    parse_name(&text)
}

/// Parse text into an absolute hickory [`Name`].
///
/// # Errors
///
/// Returns [`RecordError::InvalidRecordData`] if the text is not a valid
/// DNS name.
pub fn parse_name(text: &str) -> Result<Name, RecordError> {
    Name::from_str(&absolute(text)).map_err(|e| RecordError::InvalidRecordData {
        name: text.to_string(),
        reason: format!("invalid DNS name: {e}"),
    })
}

#[cfg(test)]
#[path = "fqdn_tests.rs"]
mod fqdn_tests;
