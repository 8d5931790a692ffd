// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record deletion construction.

use super::{UpdateOperation, UpdateRequest};
use crate::dns_errors::RecordError;
use crate::fqdn::{owner_name, parse_name, split_first_label};

/// Build an update deleting every RRset at `identifier`.
///
/// `identifier` is `"<label>.<zone>"`; the first label is the record and the
/// rest is the zone the update is sent to.
///
/// # Errors
///
/// Returns [`RecordError::InvalidRecordIdentifier`] if the identifier has no
/// label/zone boundary, or [`RecordError::InvalidRecordData`] if either part
/// is not a valid name.
pub fn build_delete(identifier: &str) -> Result<UpdateRequest, RecordError> {
    let parts = split_first_label(identifier.trim())?;
    let zone = parse_name(&parts.zone)?;
    let owner = owner_name(&parts.label, &parts.zone)?;

    Ok(UpdateRequest {
        zone,
        operation: UpdateOperation::DeleteName(owner),
    })
}
