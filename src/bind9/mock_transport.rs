// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`DnsTransport`] for unit tests.
//!
//! Records every update it is asked to send and answers from a script keyed
//! by owner name, so tests can assert on exactly what would have reached the
//! server.

use async_trait::async_trait;
use hickory_client::op::ResponseCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

use super::keyring::TsigCredential;
use super::records::UpdateRequest;
use super::transport::{DnsTransport, UpdateResponse};
use super::types::{BindServer, ZoneRecord};
use crate::dns_errors::{TransferError, TransportError};

/// One update as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentUpdate {
    pub server: String,
    pub zone: String,
    pub owner: String,
    pub summary: String,
    pub key_name: Option<String>,
}

#[derive(Default)]
pub(crate) struct RecordingTransport {
    sent: Mutex<Vec<SentUpdate>>,
    failures: HashMap<String, TransportError>,
    delays: HashMap<String, Duration>,
    transfer: Option<Result<Vec<ZoneRecord>, TransferError>>,
    cancel_after: Option<(usize, watch::Sender<bool>)>,
    next_id: AtomicU16,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail updates whose owner is `owner` (absolute, e.g. `www.example.com.`).
    pub(crate) fn failing(mut self, owner: &str, error: TransportError) -> Self {
        self.failures.insert(owner.to_string(), error);
        self
    }

    /// Hold updates for `owner` for `delay` before answering.
    pub(crate) fn delayed(mut self, owner: &str, delay: Duration) -> Self {
        self.delays.insert(owner.to_string(), delay);
        self
    }

    pub(crate) fn with_transfer(mut self, result: Result<Vec<ZoneRecord>, TransferError>) -> Self {
        self.transfer = Some(result);
        self
    }

    /// Signal cancellation once `count` updates have been sent.
    pub(crate) fn cancelling_after(mut self, count: usize, sender: watch::Sender<bool>) -> Self {
        self.cancel_after = Some((count, sender));
        self
    }

    pub(crate) fn sent(&self) -> Vec<SentUpdate> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DnsTransport for RecordingTransport {
    async fn send_update(
        &self,
        server: &BindServer,
        request: &UpdateRequest,
        credential: Option<&TsigCredential>,
    ) -> Result<UpdateResponse, TransportError> {
        let owner = request.owner().to_ascii();
        let count = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentUpdate {
                server: server.dns_address(),
                zone: request.zone.to_ascii(),
                owner: owner.clone(),
                summary: request.to_string(),
                key_name: credential.map(|c| c.key_name().to_string()),
            });
            sent.len()
        };

        if let Some((after, sender)) = &self.cancel_after {
            if count >= *after {
                let _ = sender.send(true);
            }
        }

        if let Some(delay) = self.delays.get(&owner) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(error) = self.failures.get(&owner) {
            return Err(error.clone());
        }

        Ok(UpdateResponse {
            server: server.dns_address(),
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            response_code: ResponseCode::NoError,
        })
    }

    async fn transfer_zone(
        &self,
        _server: &BindServer,
        _zone: &str,
    ) -> Result<Vec<ZoneRecord>, TransferError> {
        self.transfer.clone().unwrap_or_else(|| Ok(Vec::new()))
    }
}
