// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! BIND9 record management via dynamic DNS update.
//!
//! This module provides the orchestration layer between a caller (web UI,
//! CLI) and BIND9 servers speaking RFC 2136 dynamic update and RFC 5936 zone
//! transfer. It handles:
//!
//! - Resolving TSIG keys by name ([`keyring`])
//! - Building forward, reverse (PTR), CNAME and delete updates ([`records`])
//! - Sending updates and transfers, classifying failures ([`transport`])
//! - Deleting record batches with per-item outcomes ([`batch`])
//! - Listing zones and records ([`zone_ops`])
//!
//! # Architecture
//!
//! [`DnsOrchestrator`] owns no state of its own. Keys, servers, the network
//! and the zone list are reached through traits injected at construction, so
//! each call works only with what it resolved for itself and drops secret
//! material when it returns.
//!
//! # Example
//!
//! ```rust,no_run
//! use binder::bind9::{
//!     DnsOrchestrator, MemoryKeyStore, RecordRequest, StaticServerRegistry,
//!     StatisticsZoneLister, TcpTransport, BindServer,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let orchestrator = DnsOrchestrator::new(
//!     Arc::new(MemoryKeyStore::default()),
//!     Arc::new(TcpTransport::default()),
//!     Arc::new(StatisticsZoneLister::with_default_timeout()?),
//!     Arc::new(StaticServerRegistry::new([BindServer::new("ns1.example.com")])),
//! );
//!
//! let outcomes = orchestrator
//!     .add_record(&RecordRequest {
//!         server: "ns1.example.com".into(),
//!         zone: "example.com".into(),
//!         name: "host1".into(),
//!         record_type: "A".into(),
//!         data: "10.20.0.5".into(),
//!         ttl: None,
//!         key_name: None,
//!         create_reverse: true,
//!     })
//!     .await;
//! for outcome in outcomes {
//!     println!("{}: {}", outcome.description, outcome.detail);
//! }
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod batch;
pub mod keyring;
pub mod records;
pub mod registry;
pub mod transport;
pub mod types;
pub mod zone_ops;

#[cfg(test)]
pub(crate) mod mock_transport;

pub use batch::DeletionBatch;
pub use keyring::{
    create_tsig_signer, load_key_file, parse_key_file, KeyStore, KeyringResolver,
    MemoryKeyStore, TsigCredential,
};
pub use registry::{resolve_addresses, ServerRegistry, StaticServerRegistry};
pub use transport::{DnsTransport, TcpTransport, UpdateResponse};
pub use types::{
    BindServer, Listing, ServerAddress, TsigAlgorithm, TsigKey, UpdateOutcome, ZoneRecord,
};
pub use zone_ops::{StatisticsZoneLister, ZoneLister};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::constants::{DEFAULT_DELETE_CONCURRENCY, DEFAULT_DNS_RECORD_TTL_SECS};
use crate::dns_errors::{DnsError, RecordError};
use crate::fqdn::owner_name;
use records::{build_cname, build_forward, build_reverse, UpdateRequest};

/// A request to create one record, optionally with its reverse PTR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Hostname of the registered server to update
    pub server: String,
    /// Zone the record lives in
    pub zone: String,
    /// Record label within the zone (`@` for the apex)
    pub name: String,
    /// Record type mnemonic (A, AAAA, CNAME, ...)
    pub record_type: String,
    /// Record data in presentation format
    pub data: String,
    /// TTL in seconds (None = 300)
    #[serde(default)]
    pub ttl: Option<u32>,
    /// TSIG key to sign with (None = unsigned)
    #[serde(default)]
    pub key_name: Option<String>,
    /// Also create the PTR record for A/AAAA data
    #[serde(default)]
    pub create_reverse: bool,
}

impl RecordRequest {
    /// Whether a reverse record is part of this request.
    ///
    /// Only address records have a reverse; the flag is ignored otherwise.
    #[must_use]
    pub fn wants_reverse(&self) -> bool {
        self.create_reverse
            && matches!(
                self.record_type.trim().to_ascii_uppercase().as_str(),
                "A" | "AAAA"
            )
    }
}

/// A request to point an alias at an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnameRequest {
    /// Hostname of the registered server to update
    pub server: String,
    /// Zone the alias lives in
    pub zone: String,
    /// Alias label within the zone
    pub alias: String,
    /// Fully qualified name the alias points to
    pub target: String,
    /// TTL in seconds (None = 300)
    #[serde(default)]
    pub ttl: Option<u32>,
    /// TSIG key to sign with (None = unsigned)
    #[serde(default)]
    pub key_name: Option<String>,
}

/// Orchestrates record changes and listings against BIND9 servers.
///
/// Every operation reports per-item [`UpdateOutcome`]s or a [`Listing`]
/// instead of returning an error: credential, server and transport failures
/// all end up in the outcome so that multi-part requests still report every
/// part.
#[derive(Clone)]
pub struct DnsOrchestrator {
    keyring: KeyringResolver,
    transport: Arc<dyn DnsTransport>,
    zone_lister: Arc<dyn ZoneLister>,
    registry: Arc<dyn ServerRegistry>,
    delete_concurrency: usize,
}

impl fmt::Debug for DnsOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsOrchestrator")
            .field("delete_concurrency", &self.delete_concurrency)
            .finish_non_exhaustive()
    }
}

impl DnsOrchestrator {
    /// Create an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        key_store: Arc<dyn KeyStore>,
        transport: Arc<dyn DnsTransport>,
        zone_lister: Arc<dyn ZoneLister>,
        registry: Arc<dyn ServerRegistry>,
    ) -> Self {
        Self {
            keyring: KeyringResolver::new(key_store),
            transport,
            zone_lister,
            registry,
            delete_concurrency: DEFAULT_DELETE_CONCURRENCY,
        }
    }

    /// Set how many deletions of a batch may be in flight at once.
    #[must_use]
    pub fn with_delete_concurrency(mut self, concurrency: usize) -> Self {
        self.delete_concurrency = concurrency.max(1);
        self
    }

    // ===== Record creation =====

    /// Create a record and, when requested for A/AAAA data, its PTR record.
    ///
    /// Returns one outcome for the forward record, followed by one for the
    /// reverse record when [`RecordRequest::wants_reverse`] holds. The reverse
    /// record is attempted even if the forward update failed.
    pub async fn add_record(&self, request: &RecordRequest) -> Vec<UpdateOutcome> {
        let ttl = request.ttl.unwrap_or(DEFAULT_DNS_RECORD_TTL_SECS);
        let mut descriptions = vec![format!(
            "Forward Record Creation: {}.{}",
            request.name, request.zone
        )];
        if request.wants_reverse() {
            descriptions.push(format!("Reverse Record Creation: {}", request.data));
        }

        info!(
            server = %request.server,
            zone = %request.zone,
            name = %request.name,
            record_type = %request.record_type,
            reverse = request.wants_reverse(),
            "Adding record"
        );

        let (server, credential) = match self
            .prepare(&request.server, request.key_name.as_deref())
            .await
        {
            Ok(prepared) => prepared,
            Err(e) => return reject(descriptions, &e),
        };

        let mut descriptions = descriptions.into_iter();
        let mut outcomes = Vec::with_capacity(2);

        if let Some(description) = descriptions.next() {
            let forward = build_forward(
                &request.zone,
                &request.name,
                &request.record_type,
                &request.data,
                ttl,
            );
            outcomes.push(
                self.apply(&server, description, forward, credential.as_ref())
                    .await,
            );
        }

        if let Some(description) = descriptions.next() {
            let reverse = owner_name(&request.name, &request.zone)
                .and_then(|owner| build_reverse(&request.data, ttl, &owner.to_ascii()))
                .map(|reverse| reverse.request);
            outcomes.push(
                self.apply(&server, description, reverse, credential.as_ref())
                    .await,
            );
        }

        outcomes
    }

    /// Point `alias.zone` at `target` with a CNAME record.
    pub async fn add_cname_record(&self, request: &CnameRequest) -> Vec<UpdateOutcome> {
        let description = format!(
            "CNAME {}.{} points to {}",
            request.alias, request.zone, request.target
        );
        info!(
            server = %request.server,
            zone = %request.zone,
            alias = %request.alias,
            target = %request.target,
            "Adding CNAME record"
        );

        let (server, credential) = match self
            .prepare(&request.server, request.key_name.as_deref())
            .await
        {
            Ok(prepared) => prepared,
            Err(e) => return reject(vec![description], &e),
        };

        let cname = build_cname(
            &request.zone,
            &request.alias,
            &request.target,
            request.ttl.unwrap_or(DEFAULT_DNS_RECORD_TTL_SECS),
        );
        vec![
            self.apply(&server, description, cname, credential.as_ref())
                .await,
        ]
    }

    // ===== Record deletion =====

    /// Delete every RRset at each `"<label>.<zone>"` identifier.
    ///
    /// The key is resolved once for the whole batch; if that fails, every
    /// identifier is reported with the same failure and nothing is sent.
    /// Setting `cancel` to `true` skips the items that have not started yet.
    pub async fn delete_records(
        &self,
        server: &str,
        identifiers: &[String],
        key_name: Option<&str>,
        cancel: watch::Receiver<bool>,
    ) -> Vec<UpdateOutcome> {
        let (server, credential) = match self.prepare(server, key_name).await {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(server = %server, records = identifiers.len(), "Rejecting deletion batch: {e}");
                return batch::reject_all(identifiers, &e);
            }
        };

        DeletionBatch::new(
            self.transport.as_ref(),
            &server,
            credential.as_ref(),
            self.delete_concurrency,
        )
        .run(identifiers, cancel)
        .await
    }

    // ===== Listing =====

    /// Every record of `zone`, or an empty listing with the reason.
    pub async fn list_zone(&self, server: &str, zone: &str) -> Listing<ZoneRecord> {
        match self.lookup_server(server).await {
            Ok(server) => zone_ops::list_zone_records(self.transport.as_ref(), &server, zone).await,
            Err(e) => Listing::degraded(e),
        }
    }

    /// Zones hosted by `server`, or an empty listing with the reason.
    pub async fn list_zones(&self, server: &str) -> Listing<String> {
        match self.lookup_server(server).await {
            Ok(server) => zone_ops::list_server_zones(self.zone_lister.as_ref(), &server).await,
            Err(e) => Listing::degraded(e),
        }
    }

    /// Addresses the registered `server` resolves to, or an empty listing
    /// with the reason.
    pub async fn server_addresses(&self, server: &str) -> Listing<ServerAddress> {
        match self.lookup_server(server).await {
            Ok(server) => registry::resolve_addresses(&server.hostname).await,
            Err(e) => Listing::degraded(e),
        }
    }

    // ===== Helpers =====

    async fn lookup_server(&self, hostname: &str) -> Result<BindServer, DnsError> {
        self.registry
            .server(hostname)
            .await
            .ok_or_else(|| DnsError::ServerNotRegistered {
                server: hostname.to_string(),
            })
    }

    /// Resolve the server and credential shared by every part of a request.
    async fn prepare(
        &self,
        hostname: &str,
        key_name: Option<&str>,
    ) -> Result<(BindServer, Option<TsigCredential>), DnsError> {
        let server = self.lookup_server(hostname).await?;
        let credential = self.keyring.resolve(key_name).await?;
        Ok((server, credential))
    }

    async fn apply(
        &self,
        server: &BindServer,
        description: String,
        request: Result<UpdateRequest, RecordError>,
        credential: Option<&TsigCredential>,
    ) -> UpdateOutcome {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                warn!("{description}: {e}");
                return UpdateOutcome::failed(description, &DnsError::from(e));
            }
        };

        match self.transport.send_update(server, &request, credential).await {
            Ok(response) => UpdateOutcome::succeeded(description, response.to_string()),
            Err(e) => UpdateOutcome::failed(description, &DnsError::from(e)),
        }
    }
}

fn reject(descriptions: Vec<String>, error: &DnsError) -> Vec<UpdateOutcome> {
    warn!("Rejecting request before sending: {error}");
    descriptions
        .into_iter()
        .map(|description| UpdateOutcome::failed(description, error))
        .collect()
}
