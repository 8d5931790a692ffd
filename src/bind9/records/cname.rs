// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CNAME record construction.

use hickory_client::rr::{rdata, DNSClass, RData, Record};
use tracing::debug;

use super::{UpdateOperation, UpdateRequest};
use crate::dns_errors::RecordError;
use crate::fqdn::{absolute, owner_name, parse_name};

/// Build an update replacing the CNAME at `alias.zone` with `target`.
///
/// `target` is always made absolute: a missing trailing dot is appended
/// rather than letting the server resolve it relative to the zone.
///
/// # Errors
///
/// Returns [`RecordError::InvalidRecordData`] if the zone, alias or target is
/// not a valid name.
pub fn build_cname(
    zone: &str,
    alias: &str,
    target: &str,
    ttl: u32,
) -> Result<UpdateRequest, RecordError> {
    let zone_name = parse_name(zone)?;
    let owner = owner_name(alias, zone)?;
    let target_name = parse_name(&absolute(target.trim()))?;

    let mut record = Record::from_rdata(owner, ttl, RData::CNAME(rdata::CNAME(target_name)));
    record.set_dns_class(DNSClass::IN);

    debug!(
        "Built CNAME update: {} -> {} (TTL: {})",
        record.name(),
        absolute(target.trim()),
        ttl
    );

    Ok(UpdateRequest {
        zone: zone_name,
        operation: UpdateOperation::Replace(record),
    })
}

#[cfg(test)]
#[path = "cname_tests.rs"]
mod cname_tests;
