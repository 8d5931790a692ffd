// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS operation error types for Binder.
//!
//! This module provides specialized error types for:
//! - TSIG keyring resolution (missing keys, undecodable secrets)
//! - Hickory DNS client operations (dynamic updates, zone transfers)
//! - TSIG authentication failures reported by the server
//! - Record construction failures (bad identifiers, bad record data)
//!
//! Every failure carries a stable reason code (see [`DnsError::status_reason`])
//! so callers can render per-item outcomes without parsing messages.

use thiserror::Error;

/// Errors that can occur while resolving a TSIG key name into a credential.
///
/// These are raised before any network traffic is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyringError {
    /// No key with this name exists in the key store
    #[error("TSIG key '{key_name}' not found in key store")]
    KeyNotFound {
        /// The key name that was requested
        key_name: String,
    },

    /// The stored key exists but its material cannot be used
    ///
    /// Returned for malformed base64, empty secrets, unsupported algorithms,
    /// or key names that are not valid DNS names.
    #[error("Incorrect key data. Verify key: {key_name}. Reason: {reason}")]
    InvalidKeyMaterial {
        /// The key name with invalid material
        key_name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The key store itself could not be read
    #[error("Key store unavailable while looking up '{key_name}': {reason}")]
    KeyStoreUnavailable {
        /// The key name that was requested
        key_name: String,
        /// Underlying failure
        reason: String,
    },
}

/// Errors produced by the update transport when talking to the DNS server.
///
/// Authentication failures, transport failures and protocol-level refusals are
/// kept distinct so callers can tell a misconfigured key from a down server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server does not know the TSIG key name we signed with (BADKEY)
    #[error("DNS server {server} is not configured for TSIG key: {key_name}.")]
    AuthKeyRejected {
        /// The DNS server that rejected the key
        server: String,
        /// The TSIG key name that was used
        key_name: String,
    },

    /// The server knows the key but rejected the signature (BADSIG/BADTIME)
    #[error(
        "DNS server {server} did not accept the TSIG signature we sent. Check key {key_name} for correctness."
    )]
    AuthSignatureRejected {
        /// The DNS server that rejected the signature
        server: String,
        /// The TSIG key name that was used
        key_name: String,
    },

    /// No response within the configured timeout
    #[error("DNS request to {server} timed out after {timeout_ms}ms")]
    Timeout {
        /// The DNS server that did not answer
        server: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Connection could not be established or was dropped
    #[error("DNS server {server} unreachable: {reason}")]
    Unreachable {
        /// The DNS server that could not be reached
        server: String,
        /// Reason for the connection failure
        reason: String,
    },

    /// A valid response that reports the update failed (REFUSED, NOTAUTH, ...)
    #[error("DNS server {server} rejected the update with response code {response_code}")]
    ServerError {
        /// The DNS server that answered
        server: String,
        /// Response code name as reported by the server
        response_code: String,
    },

    /// The update could not be signed before sending
    #[error("Failed to sign update for {server} with TSIG key {key_name}: {reason}")]
    SigningFailed {
        /// The DNS server the update was meant for
        server: String,
        /// The TSIG key name that was used
        key_name: String,
        /// Signing failure
        reason: String,
    },

    /// The server answered a signed update without a valid TSIG signature
    #[error("Response from {server} failed TSIG verification for key {key_name}: {reason}")]
    ResponseUnverified {
        /// The DNS server that answered
        server: String,
        /// The TSIG key name that was used
        key_name: String,
        /// Verification failure
        reason: String,
    },

    /// The server address could not be turned into a socket address
    #[error("Invalid DNS server address '{server}': {reason}")]
    InvalidServerAddress {
        /// The address as given
        server: String,
        /// Resolution or parse failure
        reason: String,
    },
}

/// Errors related to zone enumeration (AXFR and statistics channel).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The server refused the zone transfer (allow-transfer ACL)
    ///
    /// Most production authoritative servers restrict AXFR, so this is an
    /// expected condition rather than a fault.
    #[error("Zone transfer for '{zone}' refused by {server}")]
    TransferDenied {
        /// The zone being transferred
        zone: String,
        /// The server that refused
        server: String,
    },

    /// Zone transfer or zone enumeration failed for another reason
    #[error("Zone listing for '{zone}' from {server} failed: {reason}")]
    TransferFailed {
        /// The zone being transferred (empty for server-wide listings)
        zone: String,
        /// The server queried
        server: String,
        /// Reason for the failure
        reason: String,
    },

    /// Zone transfer exceeded the configured timeout
    #[error("Zone transfer for '{zone}' from {server} timed out after {timeout_secs}s")]
    TransferTimeout {
        /// The zone being transferred
        zone: String,
        /// The server queried
        server: String,
        /// Timeout in seconds
        timeout_secs: u64,
    },
}

/// Errors raised while turning caller input into update requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A record identifier or name has no label/zone boundary
    #[error("Invalid record identifier '{identifier}': expected '<label>.<zone>'")]
    InvalidRecordIdentifier {
        /// The identifier as given
        identifier: String,
    },

    /// Record data (IP address, target name, ...) failed validation
    #[error("Invalid record data for '{name}': {reason}")]
    InvalidRecordData {
        /// The record owner name
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Record type the builder does not know how to encode
    #[error("Unsupported record type '{record_type}'")]
    UnsupportedRecordType {
        /// The type mnemonic as given
        record_type: String,
    },
}

/// Composite error type that encompasses all DNS operation errors.
///
/// This is the error type surfaced in outcomes and listings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    /// TSIG key resolution error
    #[error(transparent)]
    Keyring(#[from] KeyringError),

    /// Update transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Zone enumeration error
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Record construction error
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The hostname is not present in the server registry
    #[error("DNS server '{server}' is not registered")]
    ServerNotRegistered {
        /// The hostname as given
        server: String,
    },

    /// The server hostname could not be resolved to any address
    #[error("Unable to resolve {hostname}: {reason}")]
    ResolutionFailed {
        /// The hostname as given
        hostname: String,
        /// Resolver failure
        reason: String,
    },

    /// The operation was skipped because the caller cancelled the batch
    #[error("Operation cancelled before it was sent")]
    Cancelled,
}

impl DnsError {
    /// Returns true if this error is transient and the caller may retry.
    ///
    /// Nothing in this crate retries on its own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(
                TransportError::Timeout { .. } | TransportError::Unreachable { .. },
            )
            | Self::Transfer(
                TransferError::TransferFailed { .. } | TransferError::TransferTimeout { .. },
            )
            | Self::Keyring(KeyringError::KeyStoreUnavailable { .. })
            | Self::ResolutionFailed { .. }
            | Self::Cancelled => true,

            Self::Keyring(
                KeyringError::KeyNotFound { .. } | KeyringError::InvalidKeyMaterial { .. },
            )
            | Self::Transport(
                TransportError::AuthKeyRejected { .. }
                | TransportError::AuthSignatureRejected { .. }
                | TransportError::ServerError { .. }
                | TransportError::SigningFailed { .. }
                | TransportError::ResponseUnverified { .. }
                | TransportError::InvalidServerAddress { .. },
            )
            | Self::Transfer(TransferError::TransferDenied { .. })
            | Self::Record(_)
            | Self::ServerNotRegistered { .. } => false,
        }
    }

    /// Returns the stable reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Keyring(KeyringError::KeyNotFound { .. }) => "KeyNotFound",
            Self::Keyring(KeyringError::InvalidKeyMaterial { .. }) => "InvalidKeyMaterial",
            Self::Keyring(KeyringError::KeyStoreUnavailable { .. }) => "KeyStoreUnavailable",

            Self::Transport(TransportError::AuthKeyRejected { .. }) => "AuthKeyRejected",
            Self::Transport(TransportError::AuthSignatureRejected { .. }) => {
                "AuthSignatureRejected"
            }
            Self::Transport(TransportError::Timeout { .. }) => "Timeout",
            Self::Transport(TransportError::Unreachable { .. }) => "Unreachable",
            Self::Transport(TransportError::ServerError { .. }) => "ServerError",
            Self::Transport(TransportError::SigningFailed { .. }) => "SigningFailed",
            Self::Transport(TransportError::ResponseUnverified { .. }) => "ResponseUnverified",
            Self::Transport(TransportError::InvalidServerAddress { .. }) => {
                "InvalidServerAddress"
            }

            Self::Transfer(TransferError::TransferDenied { .. }) => "TransferDenied",
            Self::Transfer(TransferError::TransferFailed { .. }) => "TransferFailed",
            Self::Transfer(TransferError::TransferTimeout { .. }) => "TransferTimeout",

            Self::Record(RecordError::InvalidRecordIdentifier { .. }) => "InvalidRecordIdentifier",
            Self::Record(RecordError::InvalidRecordData { .. }) => "InvalidRecordData",
            Self::Record(RecordError::UnsupportedRecordType { .. }) => "UnsupportedRecordType",

            Self::ServerNotRegistered { .. } => "ServerNotRegistered",
            Self::ResolutionFailed { .. } => "ResolutionFailed",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[cfg(test)]
#[path = "dns_errors_tests.rs"]
mod dns_errors_tests;
