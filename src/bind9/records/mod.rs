// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Construction of dynamic DNS update requests (RFC 2136).
//!
//! This module turns logical record requests into concrete update operations.
//! Nothing here touches the network; the transport sends what these builders
//! produce.
//!
//! - [`forward::build_forward`] replaces an RRset in a forward zone
//! - [`reverse::build_reverse`] derives and replaces the PTR for an address
//! - [`cname::build_cname`] replaces an alias's CNAME with an absolute target
//! - [`delete::build_delete`] removes every RRset at a record identifier

pub mod cname;
pub mod delete;
pub mod forward;
pub mod reverse;

pub use cname::build_cname;
pub use delete::build_delete;
pub use forward::{build_forward, parse_record_data};
pub use reverse::{build_reverse, ReverseRecord};

use hickory_client::rr::{DNSClass, Name, Record, RecordType};
use hickory_proto::op::{Message, MessageType, OpCode, Query, UpdateMessage};
use std::fmt;

/// What an update does at its owner name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOperation {
    /// Replace the RRset at the record's name and type with this record.
    ///
    /// Existing records of the same name and type are removed, not appended to.
    Replace(Record),
    /// Delete every RRset at this name.
    DeleteName(Name),
}

/// A single update against one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Zone the update is addressed to (SOA of the zone section)
    pub zone: Name,
    /// The change to apply
    pub operation: UpdateOperation,
}

impl UpdateRequest {
    /// Owner name the update touches.
    #[must_use]
    pub fn owner(&self) -> &Name {
        match &self.operation {
            UpdateOperation::Replace(record) => record.name(),
            UpdateOperation::DeleteName(name) => name,
        }
    }

    /// Encode the request as an UPDATE message.
    ///
    /// A replace becomes "delete RRset" followed by "add record" in one
    /// message, so the server applies both atomically.
    #[must_use]
    pub fn to_message(&self) -> Message {
        let mut zone = Query::new();
        zone.set_name(self.zone.clone())
            .set_query_class(DNSClass::IN)
            .set_query_type(RecordType::SOA);

        let mut message = Message::new();
        message
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Update)
            .set_recursion_desired(false);
        message.add_zone(zone);

        match &self.operation {
            UpdateOperation::Replace(record) => {
                let mut delete = Record::with(record.name().clone(), record.record_type(), 0);
                delete.set_dns_class(DNSClass::ANY);
                message.add_update(delete);
                message.add_update(record.clone());
            }
            UpdateOperation::DeleteName(name) => {
                let mut delete = Record::with(name.clone(), RecordType::ANY, 0);
                delete.set_dns_class(DNSClass::ANY);
                message.add_update(delete);
            }
        }

        message
    }
}

impl fmt::Display for UpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            UpdateOperation::Replace(record) => write!(
                f,
                "replace {} {} {} in {}",
                record.name(),
                record.ttl(),
                record.record_type(),
                self.zone
            ),
            UpdateOperation::DeleteName(name) => write!(f, "delete {} in {}", name, self.zone),
        }
    }
}
