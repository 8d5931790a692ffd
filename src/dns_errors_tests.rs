// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for DNS error types.

use super::*;

#[test]
fn test_key_not_found_error() {
    let error = KeyringError::KeyNotFound {
        key_name: "k1".to_string(),
    };

    assert_eq!(error.to_string(), "TSIG key 'k1' not found in key store");
}

#[test]
fn test_invalid_key_material_error() {
    let error = KeyringError::InvalidKeyMaterial {
        key_name: "k1".to_string(),
        reason: "Invalid padding".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Incorrect key data. Verify key: k1. Reason: Invalid padding"
    );
}

#[test]
fn test_auth_errors_are_distinguishable() {
    let key = DnsError::from(TransportError::AuthKeyRejected {
        server: "ns1.example.com".to_string(),
        key_name: "k1".to_string(),
    });
    let sig = DnsError::from(TransportError::AuthSignatureRejected {
        server: "ns1.example.com".to_string(),
        key_name: "k1".to_string(),
    });

    assert_ne!(key.to_string(), sig.to_string());
    assert_ne!(key.status_reason(), sig.status_reason());
    assert_eq!(
        key.to_string(),
        "DNS server ns1.example.com is not configured for TSIG key: k1."
    );
    assert!(sig.to_string().contains("TSIG signature"));
}

#[test]
fn test_timeout_error() {
    let error = TransportError::Timeout {
        server: "10.0.0.1:53".to_string(),
        timeout_ms: 10_000,
    };

    assert_eq!(
        error.to_string(),
        "DNS request to 10.0.0.1:53 timed out after 10000ms"
    );
}

#[test]
fn test_server_error() {
    let error = TransportError::ServerError {
        server: "10.0.0.1:53".to_string(),
        response_code: "Refused".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "DNS server 10.0.0.1:53 rejected the update with response code Refused"
    );
}

#[test]
fn test_transfer_denied_error() {
    let error = TransferError::TransferDenied {
        zone: "example.com".to_string(),
        server: "ns1.example.com".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Zone transfer for 'example.com' refused by ns1.example.com"
    );
}

#[test]
fn test_invalid_record_identifier_error() {
    let error = RecordError::InvalidRecordIdentifier {
        identifier: "localhost".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Invalid record identifier 'localhost': expected '<label>.<zone>'"
    );
}

#[test]
fn test_dns_error_transparent_display() {
    let inner = KeyringError::KeyNotFound {
        key_name: "k1".to_string(),
    };
    let error: DnsError = inner.clone().into();

    assert_eq!(error.to_string(), inner.to_string());
}

#[test]
fn test_is_transient() {
    assert!(DnsError::from(TransportError::Timeout {
        server: "s".to_string(),
        timeout_ms: 1,
    })
    .is_transient());
    assert!(DnsError::from(TransportError::Unreachable {
        server: "s".to_string(),
        reason: "connection refused".to_string(),
    })
    .is_transient());
    assert!(DnsError::Cancelled.is_transient());

    assert!(!DnsError::from(KeyringError::KeyNotFound {
        key_name: "k".to_string(),
    })
    .is_transient());
    assert!(!DnsError::from(TransportError::AuthSignatureRejected {
        server: "s".to_string(),
        key_name: "k".to_string(),
    })
    .is_transient());
    assert!(!DnsError::from(TransferError::TransferDenied {
        zone: "z".to_string(),
        server: "s".to_string(),
    })
    .is_transient());
}

#[test]
fn test_status_reasons() {
    let cases: Vec<(DnsError, &str)> = vec![
        (
            KeyringError::KeyNotFound {
                key_name: "k".to_string(),
            }
            .into(),
            "KeyNotFound",
        ),
        (
            KeyringError::InvalidKeyMaterial {
                key_name: "k".to_string(),
                reason: "r".to_string(),
            }
            .into(),
            "InvalidKeyMaterial",
        ),
        (
            TransportError::ServerError {
                server: "s".to_string(),
                response_code: "NotAuth".to_string(),
            }
            .into(),
            "ServerError",
        ),
        (
            TransportError::SigningFailed {
                server: "s".to_string(),
                key_name: "k".to_string(),
                reason: "r".to_string(),
            }
            .into(),
            "SigningFailed",
        ),
        (
            TransportError::ResponseUnverified {
                server: "s".to_string(),
                key_name: "k".to_string(),
                reason: "r".to_string(),
            }
            .into(),
            "ResponseUnverified",
        ),
        (
            TransferError::TransferDenied {
                zone: "z".to_string(),
                server: "s".to_string(),
            }
            .into(),
            "TransferDenied",
        ),
        (
            DnsError::ServerNotRegistered {
                server: "s".to_string(),
            },
            "ServerNotRegistered",
        ),
        (DnsError::Cancelled, "Cancelled"),
    ];

    for (error, reason) in cases {
        assert_eq!(error.status_reason(), reason);
    }
}
