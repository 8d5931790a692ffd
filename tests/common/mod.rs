// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use binder::bind9::records::UpdateRequest;
use binder::bind9::{
    BindServer, DnsOrchestrator, DnsTransport, MemoryKeyStore, StaticServerRegistry,
    TsigAlgorithm, TsigCredential, TsigKey, UpdateResponse, ZoneLister, ZoneRecord,
};
use binder::dns_errors::{TransferError, TransportError};
use hickory_client::op::ResponseCode;
use std::sync::{Arc, Mutex};

pub const SERVER: &str = "ns1.example.com";
pub const KEY_NAME: &str = "update-key";
pub const SECRET: &str = "c2VjcmV0LWtleS1ieXRlcw==";

/// What the fake server saw for one update.
#[derive(Debug, Clone)]
pub struct Seen {
    pub zone: String,
    pub owner: String,
    pub summary: String,
    pub signed_with: Option<String>,
}

/// Transport standing in for a BIND9 server.
#[derive(Default)]
pub struct FakeBind {
    pub seen: Mutex<Vec<Seen>>,
    pub reject_owner: Option<(String, TransportError)>,
    pub transfer: Option<Result<Vec<ZoneRecord>, TransferError>>,
}

impl FakeBind {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsTransport for FakeBind {
    async fn send_update(
        &self,
        server: &BindServer,
        request: &UpdateRequest,
        credential: Option<&TsigCredential>,
    ) -> Result<UpdateResponse, TransportError> {
        let owner = request.owner().to_ascii();
        self.seen.lock().unwrap().push(Seen {
            zone: request.zone.to_ascii(),
            owner: owner.clone(),
            summary: request.to_string(),
            signed_with: credential.map(|c| c.key_name().to_string()),
        });

        if let Some((rejected, error)) = &self.reject_owner {
            if *rejected == owner {
                return Err(error.clone());
            }
        }

        Ok(UpdateResponse {
            server: server.dns_address(),
            id: 1,
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

pub struct NoZones;

#[async_trait]
impl ZoneLister for NoZones {
    async fn list_zones(&self, _server: &BindServer) -> Result<Vec<String>, TransferError> {
        Ok(Vec::new())
    }
}

pub fn update_key() -> TsigKey {
    TsigKey {
        name: KEY_NAME.to_string(),
        algorithm: TsigAlgorithm::HmacSha256,
        secret: SECRET.to_string(),
    }
}

/// Orchestrator over `fake` with one registered server and one key.
pub fn orchestrator(fake: Arc<FakeBind>) -> DnsOrchestrator {
    DnsOrchestrator::new(
        Arc::new(MemoryKeyStore::new([update_key()])),
        fake,
        Arc::new(NoZones),
        Arc::new(StaticServerRegistry::new([BindServer::new(SERVER)])),
    )
}
