// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for shared BIND9 types.

use super::*;
use crate::dns_errors::{KeyringError, TransportError};

#[test]
fn test_algorithm_names() {
    for algorithm in [
        TsigAlgorithm::HmacMd5,
        TsigAlgorithm::HmacSha1,
        TsigAlgorithm::HmacSha224,
        TsigAlgorithm::HmacSha256,
        TsigAlgorithm::HmacSha384,
        TsigAlgorithm::HmacSha512,
    ] {
        assert_eq!(TsigAlgorithm::from_bind_name(algorithm.as_str()), Some(algorithm));
    }
}

#[test]
fn test_algorithm_legacy_md5_spelling() {
    assert_eq!(
        TsigAlgorithm::from_bind_name("HMAC-MD5.SIG-ALG.REG.INT"),
        Some(TsigAlgorithm::HmacMd5)
    );
    assert_eq!(TsigAlgorithm::from_bind_name("hmac-sha3"), None);
}

#[test]
fn test_tsig_key_debug_redacts_secret() {
    let key = TsigKey {
        name: "k1".to_string(),
        algorithm: TsigAlgorithm::HmacSha256,
        secret: "c2VjcmV0LXRoYXQtbXVzdC1ub3QtbGVhaw==".to_string(),
    };

    let rendered = format!("{key:?}");
    assert!(rendered.contains("k1"));
    assert!(!rendered.contains(&key.secret));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn test_tsig_key_algorithm_defaults_when_deserialized() {
    let key: TsigKey = serde_yaml::from_str("name: k1\nsecret: dGVzdA==\n").unwrap();
    assert_eq!(key.algorithm, TsigAlgorithm::HmacSha256);
}

#[test]
fn test_bind_server_addresses() {
    let server = BindServer::new("ns1.example.com");
    assert_eq!(server.dns_address(), "ns1.example.com:53");

    let server = BindServer {
        hostname: "2001:db8::1".to_string(),
        dns_port: 5353,
        statistics_port: 8053,
    };
    assert_eq!(server.dns_address(), "[2001:db8::1]:5353");
}

#[test]
fn test_outcome_failed_carries_reason() {
    let error = DnsError::from(KeyringError::KeyNotFound {
        key_name: "k1".to_string(),
    });
    let outcome = UpdateOutcome::failed("Delete Record: www.example.com", &error);

    assert!(!outcome.success);
    assert_eq!(outcome.reason, Some("KeyNotFound"));
    assert_eq!(outcome.detail, error.to_string());
}

#[test]
fn test_outcome_serialization_skips_empty_reason() {
    let outcome = UpdateOutcome::succeeded("Forward Record Creation: www.example.com", "NoError");
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["success"], true);
    assert!(json.get("reason").is_none());

    let error = DnsError::from(TransportError::Timeout {
        server: "s".to_string(),
        timeout_ms: 5,
    });
    let json = serde_json::to_value(UpdateOutcome::failed("x", &error)).unwrap();
    assert_eq!(json["reason"], "Timeout");
}

#[test]
fn test_listing_degraded_is_empty() {
    let listing: Listing<ZoneRecord> = Listing::degraded(DnsError::Cancelled);
    assert!(listing.items.is_empty());
    assert_eq!(listing.error, Some(DnsError::Cancelled));
}
