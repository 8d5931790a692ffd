// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TSIG keyring resolution.
//!
//! Maps a key name to a ready-to-use TSIG signer. Keys come from a
//! [`KeyStore`] supplied by the caller; the resolver reads the key once per
//! operation and never caches decoded secret material.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hickory_client::rr::rdata::tsig::TsigAlgorithm as HickoryTsigAlgorithm;
use hickory_client::rr::Name;
use hickory_proto::rr::dnssec::tsig::TSigner;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

use super::types::{TsigAlgorithm, TsigKey};
use crate::constants::TSIG_FUDGE_TIME_SECS;
use crate::dns_errors::KeyringError;

/// Read-only lookup of stored TSIG keys.
///
/// Implemented by whatever persistence layer owns the keys.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Fetch the key called `name`.
    ///
    /// Returns `Ok(None)` when no such key exists.
    ///
    /// # Errors
    ///
    /// Returns [`KeyringError::KeyStoreUnavailable`] if the store cannot be read.
    async fn get_key(&self, name: &str) -> Result<Option<TsigKey>, KeyringError>;
}

/// In-memory key store, typically built from configuration.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    keys: HashMap<String, TsigKey>,
}

impl MemoryKeyStore {
    /// Build a store from a list of keys. Later duplicates replace earlier ones.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = TsigKey>) -> Self {
        Self {
            keys: keys.into_iter().map(|k| (k.name.clone(), k)).collect(),
        }
    }

    /// Add or replace a key.
    pub fn insert(&mut self, key: TsigKey) {
        self.keys.insert(key.name.clone(), key);
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn get_key(&self, name: &str) -> Result<Option<TsigKey>, KeyringError> {
        Ok(self.keys.get(name).cloned())
    }
}

/// A resolved TSIG credential, valid for one operation.
#[derive(Clone)]
pub struct TsigCredential {
    key_name: String,
    signer: TSigner,
}

impl TsigCredential {
    /// Name of the key this credential signs with.
    #[must_use]
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Signer to attach to outgoing messages.
    #[must_use]
    pub fn signer(&self) -> &TSigner {
        &self.signer
    }
}

impl fmt::Debug for TsigCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigCredential")
            .field("key_name", &self.key_name)
            .finish_non_exhaustive()
    }
}

/// Resolves key names into [`TsigCredential`]s.
#[derive(Clone)]
pub struct KeyringResolver {
    store: Arc<dyn KeyStore>,
}

impl KeyringResolver {
    /// Create a resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Resolve `key_name` into a credential.
    ///
    /// `None` means "no authentication" and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - [`KeyringError::KeyNotFound`] if the store has no such key
    /// - [`KeyringError::InvalidKeyMaterial`] if the secret cannot be decoded
    ///   or the algorithm cannot be used
    /// - [`KeyringError::KeyStoreUnavailable`] if the store fails
    pub async fn resolve(
        &self,
        key_name: Option<&str>,
    ) -> Result<Option<TsigCredential>, KeyringError> {
        let Some(key_name) = key_name else {
            debug!("No TSIG key requested, sending unsigned");
            return Ok(None);
        };

        let key = self
            .store
            .get_key(key_name)
            .await?
            .ok_or_else(|| KeyringError::KeyNotFound {
                key_name: key_name.to_string(),
            })?;

        let signer = create_tsig_signer(&key)?;
        debug!(key = %key.name, algorithm = key.algorithm.as_str(), "Resolved TSIG key");

        Ok(Some(TsigCredential {
            key_name: key.name,
            signer,
        }))
    }
}

/// Create a TSIG signer from a stored key.
///
/// The decoded secret is moved into the signer rather than copied, so no
/// second plaintext buffer is left behind. hickory keeps the key in a plain
/// `Vec<u8>` for the signer's lifetime; only buffers owned here are zeroized.
///
/// # Errors
///
/// Returns [`KeyringError::InvalidKeyMaterial`] if the secret is not valid
/// base64, is empty, the key name is not a DNS name, or the algorithm is not
/// supported by the signing backend.
pub fn create_tsig_signer(key: &TsigKey) -> Result<TSigner, KeyringError> {
    let invalid = |reason: String| KeyringError::InvalidKeyMaterial {
        key_name: key.name.clone(),
        reason,
    };

    let algorithm = match key.algorithm {
        TsigAlgorithm::HmacMd5 => HickoryTsigAlgorithm::HmacMd5,
        TsigAlgorithm::HmacSha1 => HickoryTsigAlgorithm::HmacSha1,
        TsigAlgorithm::HmacSha224 => HickoryTsigAlgorithm::HmacSha224,
        TsigAlgorithm::HmacSha256 => HickoryTsigAlgorithm::HmacSha256,
        TsigAlgorithm::HmacSha384 => HickoryTsigAlgorithm::HmacSha384,
        TsigAlgorithm::HmacSha512 => HickoryTsigAlgorithm::HmacSha512,
    };

    let mut key_bytes = Zeroizing::new(
        BASE64
            .decode(key.secret.trim())
            .map_err(|e| invalid(e.to_string()))?,
    );
    if key_bytes.is_empty() {
        return Err(invalid("secret is empty".to_string()));
    }

    let signer_name =
        Name::from_str(&key.name).map_err(|e| invalid(format!("invalid key name: {e}")))?;

    TSigner::new(
        std::mem::take(&mut *key_bytes),
        algorithm,
        signer_name,
        u16::try_from(TSIG_FUDGE_TIME_SECS).unwrap_or(300),
    )
    .map_err(|e| invalid(e.to_string()))
}

/// Parse every `key` statement in a BIND9 key file.
///
/// Expected format (one or more blocks):
/// ```text
/// key "key-name" {
///     algorithm hmac-sha256;
///     secret "base64secret==";
/// };
/// ```
///
/// # Errors
///
/// Returns an error if a block is missing its name, algorithm or secret, or
/// names an unknown algorithm.
pub fn parse_key_file(content: &str) -> Result<Vec<TsigKey>> {
    let mut keys = Vec::new();
    let mut rest = content;

    while let Some(start) = find_key_statement(rest) {
        let block = &rest[start..];
        let end = block
            .find("};")
            .context("Unterminated key statement in key file")?;
        let statement = &block[..end];

        let name = statement
            .split('"')
            .nth(1)
            .context("Failed to parse key name from key file")?
            .to_string();

        let body = statement
            .split_once('{')
            .map(|(_, body)| body)
            .with_context(|| format!("Missing '{{' in key statement for '{name}'"))?;

        let algorithm_str = body
            .split(';')
            .find_map(|part| part.trim().strip_prefix("algorithm"))
            .map(|algo| algo.trim().trim_matches('"'))
            .with_context(|| format!("Failed to parse algorithm for key '{name}'"))?;
        let algorithm = TsigAlgorithm::from_bind_name(algorithm_str).with_context(|| {
            format!("Unsupported algorithm '{algorithm_str}' for key '{name}'")
        })?;

        let secret = body
            .split(';')
            .find_map(|part| part.trim().strip_prefix("secret"))
            .and_then(|value| value.split('"').nth(1))
            .with_context(|| format!("Failed to parse secret for key '{name}'"))?
            .to_string();

        keys.push(TsigKey {
            name,
            algorithm,
            secret,
        });
        rest = &block[end + 2..];
    }

    Ok(keys)
}

fn find_key_statement(content: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = content[offset..].find("key") {
        let at = offset + pos;
        let before_ok = at == 0
            || content[..at]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        let after = content[at + 3..].trim_start();
        if before_ok && after.starts_with('"') {
            return Some(at);
        }
        offset = at + 3;
    }
    None
}

/// Read and parse a BIND9 key file from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_key_file(path: &Path) -> Result<Vec<TsigKey>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read key file {}", path.display()))?;
    parse_key_file(&content).with_context(|| format!("Invalid key file {}", path.display()))
}

#[cfg(test)]
#[path = "keyring_tests.rs"]
mod keyring_tests;
