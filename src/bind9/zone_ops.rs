// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone and record listing.
//!
//! Records of a zone come from a full zone transfer through the
//! [`DnsTransport`]. The zones a server hosts are not discoverable over DNS,
//! so they are read from BIND9's statistics channel by a [`ZoneLister`].
//!
//! Both listings degrade instead of failing: a refused transfer or an
//! unreachable statistics channel yields an empty [`Listing`] carrying the
//! error, which callers show next to the (empty) result.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use super::transport::DnsTransport;
use super::types::{BindServer, Listing, ZoneRecord};
use crate::constants::{
    DEFAULT_STATISTICS_TIMEOUT_SECS, STATISTICS_BUILTIN_ZONE_TYPE, STATISTICS_ZONES_PATH,
};
use crate::dns_errors::{DnsError, TransferError};

/// Label used in errors for server-wide listings that have no zone.
const ALL_ZONES: &str = "*";

/// Enumerates the zones a server is authoritative for.
#[async_trait]
pub trait ZoneLister: Send + Sync {
    /// Zone names hosted by `server`, sorted and without duplicates.
    ///
    /// # Errors
    ///
    /// Returns a [`TransferError`] if the zone list cannot be read.
    async fn list_zones(&self, server: &BindServer) -> Result<Vec<String>, TransferError>;
}

/// [`ZoneLister`] backed by the BIND9 statistics channel JSON API.
#[derive(Debug, Clone)]
pub struct StatisticsZoneLister {
    client: HttpClient,
}

impl StatisticsZoneLister {
    /// Create a lister whose HTTP requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build statistics channel HTTP client")?;
        Ok(Self { client })
    }

    /// Create a lister with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_default_timeout() -> Result<Self> {
        Self::new(Duration::from_secs(DEFAULT_STATISTICS_TIMEOUT_SECS))
    }
}

#[async_trait]
impl ZoneLister for StatisticsZoneLister {
    async fn list_zones(&self, server: &BindServer) -> Result<Vec<String>, TransferError> {
        let failed = |reason: String| TransferError::TransferFailed {
            zone: ALL_ZONES.to_string(),
            server: server.hostname.clone(),
            reason,
        };

        let url = build_statistics_url(server).map_err(|e| failed(e.to_string()))?;
        info!(url = %url, "HTTP request to statistics channel");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = %status, "Statistics channel request failed");
            return Err(failed(format!("HTTP {status} from {url}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| failed(format!("failed to read response body: {e}")))?;

        let zones = parse_zone_names(&body)
            .map_err(|e| failed(format!("invalid statistics document: {e}")))?;
        debug!(url = %url, zones = zones.len(), "Parsed statistics channel zones");
        Ok(zones)
    }
}

/// Build `http://<host>:<statistics_port>/json/v1/zones` for `server`.
///
/// # Errors
///
/// Returns an error if the hostname does not form a valid URL.
pub(crate) fn build_statistics_url(server: &BindServer) -> Result<Url> {
    let host = &server.hostname;
    let authority = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{}", server.statistics_port)
    } else {
        format!("{host}:{}", server.statistics_port)
    };

    let base = Url::parse(&format!("http://{authority}"))
        .with_context(|| format!("Invalid statistics channel host: {host}"))?;
    base.join(STATISTICS_ZONES_PATH)
        .with_context(|| format!("Invalid statistics channel path for {host}"))
}

#[derive(Debug, Deserialize)]
struct StatisticsDocument {
    #[serde(default)]
    views: BTreeMap<String, StatisticsView>,
}

#[derive(Debug, Deserialize)]
struct StatisticsView {
    #[serde(default)]
    zones: Vec<StatisticsZone>,
}

#[derive(Debug, Deserialize)]
struct StatisticsZone {
    name: String,
    #[serde(rename = "type", default)]
    zone_type: Option<String>,
}

/// Extract zone names from a `/json/v1/zones` document.
///
/// Zones from every view are merged; BIND's built-in zones (`localhost`,
/// the RFC 1918 empty zones, ...) are left out.
pub(crate) fn parse_zone_names(body: &str) -> serde_json::Result<Vec<String>> {
    let document: StatisticsDocument = serde_json::from_str(body)?;

    let mut zones: Vec<String> = document
        .views
        .into_values()
        .flat_map(|view| view.zones)
        .filter(|zone| zone.zone_type.as_deref() != Some(STATISTICS_BUILTIN_ZONE_TYPE))
        .map(|zone| zone.name)
        .collect();
    zones.sort();
    zones.dedup();
    Ok(zones)
}

/// Records of `zone` on `server`, or an empty listing with the reason.
pub async fn list_zone_records(
    transport: &dyn DnsTransport,
    server: &BindServer,
    zone: &str,
) -> Listing<ZoneRecord> {
    match transport.transfer_zone(server, zone).await {
        Ok(records) => Listing::complete(records),
        Err(e) => {
            if matches!(e, TransferError::TransferDenied { .. }) {
                warn!(server = %server.hostname, zone = %zone, "Zone transfer denied, listing is empty");
            }
            Listing::degraded(DnsError::from(e))
        }
    }
}

/// Zones hosted by `server`, or an empty listing with the reason.
pub async fn list_server_zones(lister: &dyn ZoneLister, server: &BindServer) -> Listing<String> {
    match lister.list_zones(server).await {
        Ok(zones) => Listing::complete(zones),
        Err(e) => {
            warn!(server = %server.hostname, "Zone list unavailable: {e}");
            Listing::degraded(DnsError::from(e))
        }
    }
}

#[cfg(test)]
#[path = "zone_ops_tests.rs"]
mod zone_ops_tests;
