// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Known BIND9 servers.
//!
//! Servers are owned by whoever configures the orchestrator; the orchestrator
//! only looks them up by hostname and resolves their addresses for display.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use tracing::{debug, warn};

use super::types::{BindServer, Listing, ServerAddress};
use crate::dns_errors::DnsError;

/// Lookup of servers by hostname.
#[async_trait]
pub trait ServerRegistry: Send + Sync {
    /// The server registered under `hostname`, if any.
    async fn server(&self, hostname: &str) -> Option<BindServer>;
}

/// Registry over a fixed set of servers, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticServerRegistry {
    servers: HashMap<String, BindServer>,
}

impl StaticServerRegistry {
    /// Build a registry from `servers`. A later entry with the same hostname
    /// replaces an earlier one.
    #[must_use]
    pub fn new(servers: impl IntoIterator<Item = BindServer>) -> Self {
        Self {
            servers: servers
                .into_iter()
                .map(|server| (server.hostname.to_ascii_lowercase(), server))
                .collect(),
        }
    }

    /// Register or replace a server.
    pub fn insert(&mut self, server: BindServer) {
        self.servers
            .insert(server.hostname.to_ascii_lowercase(), server);
    }

    /// Number of registered servers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Whether no servers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[async_trait]
impl ServerRegistry for StaticServerRegistry {
    async fn server(&self, hostname: &str) -> Option<BindServer> {
        self.servers.get(&hostname.to_ascii_lowercase()).cloned()
    }
}

/// Resolve `hostname` to every address it has, labelled `IPv4 (n)` and
/// `IPv6 (n)` in resolver order.
///
/// A resolver failure yields an empty listing carrying
/// [`DnsError::ResolutionFailed`].
pub async fn resolve_addresses(hostname: &str) -> Listing<ServerAddress> {
    match tokio::net::lookup_host((hostname, 0)).await {
        Ok(addresses) => {
            let addresses = label_addresses(addresses.map(|a| a.ip()));
            debug!(server = %hostname, addresses = addresses.len(), "Resolved server addresses");
            Listing::complete(addresses)
        }
        Err(e) => {
            warn!(server = %hostname, "Unable to resolve server: {e}");
            Listing::degraded(DnsError::ResolutionFailed {
                hostname: hostname.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Number addresses per family, starting at 1.
pub(crate) fn label_addresses(addresses: impl IntoIterator<Item = IpAddr>) -> Vec<ServerAddress> {
    let (mut ipv4, mut ipv6) = (0u32, 0u32);
    addresses
        .into_iter()
        .map(|address| {
            let label = match address {
                IpAddr::V4(_) => {
                    ipv4 += 1;
                    format!("IPv4 ({ipv4})")
                }
                IpAddr::V6(_) => {
                    ipv6 += 1;
                    format!("IPv6 ({ipv6})")
                }
            };
            ServerAddress { label, address }
        })
        .collect()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
