// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Batch deletion of records.
//!
//! Every identifier is attempted independently: a failure on one item never
//! stops the others, and the outcomes come back in input order whatever
//! order the server answered in.
//!
//! Cancellation is checked when an item is about to start. Deletions already
//! on the wire finish normally; items that have not started are reported as
//! [`DnsError::Cancelled`].

use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info};

use super::keyring::TsigCredential;
use super::records::build_delete;
use super::transport::DnsTransport;
use super::types::{BindServer, UpdateOutcome};
use crate::dns_errors::DnsError;

/// Description used for the outcome of deleting `identifier`.
#[must_use]
pub fn delete_description(identifier: &str) -> String {
    format!("Delete Record: {identifier}")
}

/// Fail every identifier with the same error.
///
/// Used when something shared by the whole batch (credential, server) is
/// unusable, so no item is sent.
#[must_use]
pub fn reject_all(identifiers: &[String], error: &DnsError) -> Vec<UpdateOutcome> {
    identifiers
        .iter()
        .map(|identifier| UpdateOutcome::failed(delete_description(identifier), error))
        .collect()
}

/// Deletes a list of record identifiers against one server.
pub struct DeletionBatch<'a> {
    transport: &'a dyn DnsTransport,
    server: &'a BindServer,
    credential: Option<&'a TsigCredential>,
    concurrency: usize,
}

impl<'a> DeletionBatch<'a> {
    /// Create a batch sending through `transport` to `server`.
    ///
    /// `concurrency` is the number of deletions in flight at once; values
    /// below one are treated as one.
    #[must_use]
    pub fn new(
        transport: &'a dyn DnsTransport,
        server: &'a BindServer,
        credential: Option<&'a TsigCredential>,
        concurrency: usize,
    ) -> Self {
        Self {
            transport,
            server,
            credential,
            concurrency: concurrency.max(1),
        }
    }

    /// Delete every identifier, returning one outcome per identifier in input
    /// order.
    pub async fn run(
        &self,
        identifiers: &[String],
        cancel: watch::Receiver<bool>,
    ) -> Vec<UpdateOutcome> {
        info!(
            server = %self.server.hostname,
            records = identifiers.len(),
            concurrency = self.concurrency,
            "Starting batch deletion"
        );

        let outcomes: Vec<UpdateOutcome> = stream::iter(identifiers)
            .map(|identifier| {
                let cancel = cancel.clone();
                async move { self.delete_one(identifier, &cancel).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| !o.success).count();
        info!(
            server = %self.server.hostname,
            records = outcomes.len(),
            failed = failed,
            "Finished batch deletion"
        );
        outcomes
    }

    async fn delete_one(&self, identifier: &str, cancel: &watch::Receiver<bool>) -> UpdateOutcome {
        let description = delete_description(identifier);

        if *cancel.borrow() {
            debug!(record = %identifier, "Skipping deletion, batch cancelled");
            return UpdateOutcome::failed(description, &DnsError::Cancelled);
        }

        let request = match build_delete(identifier) {
            Ok(request) => request,
            Err(e) => return UpdateOutcome::failed(description, &DnsError::from(e)),
        };

        match self
            .transport
            .send_update(self.server, &request, self.credential)
            .await
        {
            Ok(response) => UpdateOutcome::succeeded(description, response.to_string()),
            Err(e) => UpdateOutcome::failed(description, &DnsError::from(e)),
        }
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod batch_tests;
