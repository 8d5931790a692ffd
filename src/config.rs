// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Orchestrator configuration.
//!
//! Loaded from a YAML file. Every field is optional; missing fields take the
//! defaults from [`crate::constants`].
//!
//! ```yaml
//! update_timeout_secs: 10
//! delete_concurrency: 4
//! servers:
//!   - hostname: ns1.example.com
//! keys:
//!   - name: update-key
//!     algorithm: hmac-sha256
//!     secret: c2VjcmV0LWtleS1ieXRlcw==
//! key_files:
//!   - /etc/bind/update.key
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::bind9::{
    load_key_file, BindServer, DnsOrchestrator, MemoryKeyStore, StaticServerRegistry,
    StatisticsZoneLister, TcpTransport, TsigKey,
};
use crate::constants::{
    DEFAULT_DELETE_CONCURRENCY, DEFAULT_STATISTICS_PORT, DEFAULT_STATISTICS_TIMEOUT_SECS,
    DEFAULT_TRANSFER_TIMEOUT_SECS, DEFAULT_UPDATE_TIMEOUT_SECS, DNS_PORT,
};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Port used for servers added without an explicit `dns_port`
    pub dns_port: u16,
    /// Socket timeout for a single dynamic update
    pub update_timeout_secs: u64,
    /// Socket timeout for a zone transfer
    pub transfer_timeout_secs: u64,
    /// Statistics channel port used for servers added without one
    pub statistics_port: u16,
    /// Timeout for statistics channel requests
    pub statistics_timeout_secs: u64,
    /// Deletions in flight at once within a batch
    pub delete_concurrency: usize,
    /// Known servers
    pub servers: Vec<BindServer>,
    /// Inline TSIG keys
    pub keys: Vec<TsigKey>,
    /// BIND key files to read additional keys from
    pub key_files: Vec<PathBuf>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            dns_port: DNS_PORT,
            update_timeout_secs: DEFAULT_UPDATE_TIMEOUT_SECS,
            transfer_timeout_secs: DEFAULT_TRANSFER_TIMEOUT_SECS,
            statistics_port: DEFAULT_STATISTICS_PORT,
            statistics_timeout_secs: DEFAULT_STATISTICS_TIMEOUT_SECS,
            delete_concurrency: DEFAULT_DELETE_CONCURRENCY,
            servers: Vec::new(),
            keys: Vec::new(),
            key_files: Vec::new(),
        }
    }
}

impl BinderConfig {
    /// Read and validate a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML for
    /// this structure, or fails [`BinderConfig::validate`].
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!(
            path = %path.display(),
            servers = config.servers.len(),
            keys = config.keys.len(),
            key_files = config.key_files.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or validation fails.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML")?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and key name uniqueness.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.update_timeout_secs == 0 {
            bail!("update_timeout_secs must be greater than 0");
        }
        if self.transfer_timeout_secs == 0 {
            bail!("transfer_timeout_secs must be greater than 0");
        }
        if self.statistics_timeout_secs == 0 {
            bail!("statistics_timeout_secs must be greater than 0");
        }
        if self.delete_concurrency == 0 {
            bail!("delete_concurrency must be at least 1");
        }

        let mut names = HashSet::new();
        for key in &self.keys {
            if !names.insert(key.name.as_str()) {
                bail!("Duplicate TSIG key name: {}", key.name);
            }
        }

        for server in &self.servers {
            if server.hostname.trim().is_empty() {
                bail!("Server hostname must not be empty");
            }
        }
        Ok(())
    }

    /// Add a server by hostname using the configured default ports, unless it
    /// is already listed.
    pub fn add_server(&mut self, hostname: &str) {
        if self
            .servers
            .iter()
            .any(|s| s.hostname.eq_ignore_ascii_case(hostname))
        {
            return;
        }
        self.servers.push(BindServer {
            hostname: hostname.to_string(),
            dns_port: self.dns_port,
            statistics_port: self.statistics_port,
        });
    }

    /// Inline keys plus every key read from `key_files`.
    ///
    /// A key defined in a file replaces an inline key of the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if a key file cannot be read or parsed.
    pub async fn all_keys(&self) -> Result<Vec<TsigKey>> {
        let mut keys = self.keys.clone();
        for path in &self.key_files {
            let file_keys = load_key_file(path).await?;
            debug!(path = %path.display(), keys = file_keys.len(), "Loaded key file");
            keys.extend(file_keys);
        }
        Ok(keys)
    }

    /// Build an orchestrator over TCP transport, the statistics channel and
    /// the configured servers and keys.
    ///
    /// # Errors
    ///
    /// Returns an error if a key file cannot be loaded or the HTTP client
    /// cannot be built.
    pub async fn build_orchestrator(&self) -> Result<DnsOrchestrator> {
        let keys = MemoryKeyStore::new(self.all_keys().await?);
        let transport = TcpTransport::new(
            Duration::from_secs(self.update_timeout_secs),
            Duration::from_secs(self.transfer_timeout_secs),
        );
        let lister =
            StatisticsZoneLister::new(Duration::from_secs(self.statistics_timeout_secs))?;
        let registry = StaticServerRegistry::new(self.servers.iter().cloned());

        Ok(DnsOrchestrator::new(
            Arc::new(keys),
            Arc::new(transport),
            Arc::new(lister),
            Arc::new(registry),
        )
        .with_delete_concurrency(self.delete_concurrency))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
