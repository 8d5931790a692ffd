// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Forward record construction (A, AAAA, CNAME, PTR, NS, MX, TXT, SRV).

use hickory_client::rr::{rdata, DNSClass, Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use tracing::debug;

use super::{UpdateOperation, UpdateRequest};
use crate::dns_errors::RecordError;
use crate::fqdn::{owner_name, parse_name};

/// Build an update that replaces the `record_type` RRset at `name.zone`.
///
/// Names inside `data` (CNAME/NS/PTR/MX/SRV targets) that lack a trailing dot
/// are taken relative to `zone`, the same way a zone file or `nsupdate` reads
/// them.
///
/// # Errors
///
/// - [`RecordError::UnsupportedRecordType`] for types the builder cannot encode
/// - [`RecordError::InvalidRecordData`] if `name`, `zone` or `data` is invalid
pub fn build_forward(
    zone: &str,
    name: &str,
    record_type: &str,
    data: &str,
    ttl: u32,
) -> Result<UpdateRequest, RecordError> {
    let zone_name = parse_name(zone)?;
    let owner = owner_name(name, zone)?;
    let rdata = parse_record_data(record_type, data, &zone_name, &owner)?;

    let mut record = Record::from_rdata(owner, ttl, rdata);
    record.set_dns_class(DNSClass::IN);

    debug!(
        "Built forward update: {} {} {} {}",
        record.name(),
        ttl,
        record.record_type(),
        data
    );

    Ok(UpdateRequest {
        zone: zone_name,
        operation: UpdateOperation::Replace(record),
    })
}

/// Parse a record type mnemonic, case-insensitively.
///
/// # Errors
///
/// Returns [`RecordError::UnsupportedRecordType`] for unknown mnemonics.
pub fn parse_record_type(record_type: &str) -> Result<RecordType, RecordError> {
    RecordType::from_str(&record_type.trim().to_ascii_uppercase()).map_err(|_| {
        RecordError::UnsupportedRecordType {
            record_type: record_type.to_string(),
        }
    })
}

/// Parse presentation-format `data` for `record_type` into record data.
///
/// `origin` resolves relative names; `owner` is only used in error messages.
///
/// # Errors
///
/// - [`RecordError::UnsupportedRecordType`] for types other than
///   A, AAAA, CNAME, PTR, NS, MX, TXT and SRV
/// - [`RecordError::InvalidRecordData`] if `data` does not parse
pub fn parse_record_data(
    record_type: &str,
    data: &str,
    origin: &Name,
    owner: &Name,
) -> Result<RData, RecordError> {
    let invalid = |reason: String| RecordError::InvalidRecordData {
        name: owner.to_string(),
        reason,
    };
    let data = data.trim();

    match parse_record_type(record_type)? {
        RecordType::A => {
            let ip = Ipv4Addr::from_str(data)
                .map_err(|e| invalid(format!("invalid IPv4 address '{data}': {e}")))?;
            Ok(RData::A(ip.into()))
        }
        RecordType::AAAA => {
            let ip = Ipv6Addr::from_str(data)
                .map_err(|e| invalid(format!("invalid IPv6 address '{data}': {e}")))?;
            Ok(RData::AAAA(ip.into()))
        }
        RecordType::CNAME => Ok(RData::CNAME(rdata::CNAME(target_name(data, origin)?))),
        RecordType::PTR => Ok(RData::PTR(rdata::PTR(target_name(data, origin)?))),
        RecordType::NS => Ok(RData::NS(rdata::NS(target_name(data, origin)?))),
        RecordType::MX => {
            let (preference, exchange) = data
                .split_once(char::is_whitespace)
                .ok_or_else(|| invalid(format!("expected '<preference> <exchange>', got '{data}'")))?;
            let preference = preference
                .parse::<u16>()
                .map_err(|e| invalid(format!("invalid MX preference '{preference}': {e}")))?;
            Ok(RData::MX(rdata::MX::new(
                preference,
                target_name(exchange.trim(), origin)?,
            )))
        }
        RecordType::TXT => {
            let texts = split_txt(data);
            if texts.is_empty() {
                return Err(invalid("TXT record requires at least one string".to_string()));
            }
            Ok(RData::TXT(rdata::TXT::new(texts)))
        }
        RecordType::SRV => {
            let fields: Vec<&str> = data.split_whitespace().collect();
            let [priority, weight, port, target] = fields.as_slice() else {
                return Err(invalid(format!(
                    "expected '<priority> <weight> <port> <target>', got '{data}'"
                )));
            };
            let number = |field: &str, what: &str| {
                field
                    .parse::<u16>()
                    .map_err(|e| invalid(format!("invalid SRV {what} '{field}': {e}")))
            };
            Ok(RData::SRV(rdata::SRV::new(
                number(*priority, "priority")?,
                number(*weight, "weight")?,
                number(*port, "port")?,
                target_name(*target, origin)?,
            )))
        }
        other => Err(RecordError::UnsupportedRecordType {
            record_type: other.to_string(),
        }),
    }
}

/// Resolve a target name: absolute if it ends with a dot, else under `origin`.
fn target_name(text: &str, origin: &Name) -> Result<Name, RecordError> {
    if text.ends_with('.') {
        parse_name(text)
    } else if text == "@" {
        Ok(origin.clone())
    } else {
        parse_name(&format!("{text}.{}", origin.to_ascii().trim_end_matches('.')))
    }
}

/// Split TXT data into character-strings, honouring double quotes.
fn split_txt(data: &str) -> Vec<String> {
    let mut texts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in data.chars() {
        match c {
            '"' => {
                if quoted {
                    texts.push(std::mem::take(&mut current));
                }
                quoted = !quoted;
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    texts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        texts.push(current);
    }

    texts
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod forward_tests;
