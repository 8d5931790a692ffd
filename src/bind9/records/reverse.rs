// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! PTR record construction for reverse zones.
//!
//! Given the address of a forward record, the reverse-lookup name is derived
//! and split at its first label: the leading label becomes the PTR owner and
//! the remainder is taken as the reverse zone. For `10.20.0.5` that is label
//! `5` in `0.20.10.in-addr.arpa.`; for IPv6 it is the last nibble in the
//! zone formed by the other 31 nibbles under `ip6.arpa.`.

use hickory_client::rr::{rdata, DNSClass, RData, Record};
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;

use super::{UpdateOperation, UpdateRequest};
use crate::dns_errors::RecordError;
use crate::fqdn::{absolute, parse_name, reverse_name, split_first_label, FqdnParts};

/// A PTR update together with the reverse-name decomposition it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseRecord {
    /// Leading label and parent reverse zone
    pub parts: FqdnParts,
    /// The PTR replacement to send to the reverse zone
    pub request: UpdateRequest,
}

/// Build the PTR update mapping `ip_address` back to `forward_fqdn`.
///
/// The PTR target always carries a trailing dot.
///
/// # Errors
///
/// Returns [`RecordError::InvalidRecordData`] if `ip_address` is not an IPv4
/// or IPv6 address, or `forward_fqdn` is not a valid name.
pub fn build_reverse(
    ip_address: &str,
    ttl: u32,
    forward_fqdn: &str,
) -> Result<ReverseRecord, RecordError> {
    let ip = IpAddr::from_str(ip_address.trim()).map_err(|e| RecordError::InvalidRecordData {
        name: forward_fqdn.to_string(),
        reason: format!("cannot derive reverse name from '{ip_address}': {e}"),
    })?;

    let reverse_fqdn = reverse_name(ip);
    let parts = split_first_label(&reverse_fqdn)?;

    let zone = parse_name(&parts.zone)?;
    let owner = parse_name(&reverse_fqdn)?;
    let target = parse_name(&absolute(forward_fqdn))?;

    let mut record = Record::from_rdata(owner, ttl, RData::PTR(rdata::PTR(target)));
    record.set_dns_class(DNSClass::IN);

    debug!(
        "Built reverse update: {} in {} -> {}",
        parts.label,
        parts.zone,
        absolute(forward_fqdn)
    );

    Ok(ReverseRecord {
        parts,
        request: UpdateRequest {
            zone,
            operation: UpdateOperation::Replace(record),
        },
    })
}

#[cfg(test)]
#[path = "reverse_tests.rs"]
mod reverse_tests;
