// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for batch deletion.

use super::*;
use crate::bind9::keyring::{KeyringResolver, MemoryKeyStore};
use crate::bind9::mock_transport::RecordingTransport;
use crate::bind9::types::{TsigAlgorithm, TsigKey};
use crate::dns_errors::TransportError;
use std::sync::Arc;
use std::time::Duration;

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn not_cancelled() -> watch::Receiver<bool> {
    // a dropped sender leaves the last value readable
    watch::channel(false).1
}

#[tokio::test]
async fn test_outcomes_follow_input_order() {
    let transport = RecordingTransport::new()
        .delayed("a.example.com.", Duration::from_millis(80))
        .delayed("c.example.com.", Duration::from_millis(20));
    let server = BindServer::new("ns1.example.com");
    let identifiers = ids(&["a.example.com", "b.example.com", "c.example.com"]);

    let outcomes = DeletionBatch::new(&transport, &server, None, 3)
        .run(&identifiers, not_cancelled())
        .await;

    let descriptions: Vec<&str> = outcomes.iter().map(|o| o.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec![
            "Delete Record: a.example.com",
            "Delete Record: b.example.com",
            "Delete Record: c.example.com",
        ]
    );
    assert!(outcomes.iter().all(|o| o.success));
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_rest() {
    let transport = RecordingTransport::new().failing(
        "b.example.com.",
        TransportError::ServerError {
            server: "ns1.example.com:53".to_string(),
            response_code: "Refused".to_string(),
        },
    );
    let server = BindServer::new("ns1.example.com");
    let identifiers = ids(&["a.example.com", "b.example.com", "c.example.com"]);

    let outcomes = DeletionBatch::new(&transport, &server, None, 2)
        .run(&identifiers, not_cancelled())
        .await;

    assert_eq!(transport.sent().len(), 3);
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
    assert_eq!(outcomes[1].reason, Some("ServerError"));
    assert!(outcomes[2].success);
}

#[tokio::test]
async fn test_malformed_identifier_is_a_failed_outcome() {
    let transport = RecordingTransport::new();
    let server = BindServer::new("ns1.example.com");
    let identifiers = ids(&["localhost", "www.example.com"]);

    let outcomes = DeletionBatch::new(&transport, &server, None, 1)
        .run(&identifiers, not_cancelled())
        .await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].reason, Some("InvalidRecordIdentifier"));
    assert!(outcomes[1].success);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].zone, "example.com.");
    assert_eq!(sent[0].owner, "www.example.com.");
}

#[tokio::test]
async fn test_cancellation_skips_remaining_items() {
    let (tx, rx) = watch::channel(false);
    let transport = RecordingTransport::new().cancelling_after(1, tx);
    let server = BindServer::new("ns1.example.com");
    let identifiers = ids(&["a.example.com", "b.example.com", "c.example.com"]);

    let outcomes = DeletionBatch::new(&transport, &server, None, 1)
        .run(&identifiers, rx)
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].success, "in-flight deletion completes");
    assert_eq!(outcomes[1].reason, Some("Cancelled"));
    assert_eq!(outcomes[2].reason, Some("Cancelled"));
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_already_cancelled_sends_nothing() {
    let (tx, rx) = watch::channel(true);
    let transport = RecordingTransport::new();
    let server = BindServer::new("ns1.example.com");
    let identifiers = ids(&["a.example.com", "b.example.com"]);

    let outcomes = DeletionBatch::new(&transport, &server, None, 4)
        .run(&identifiers, rx)
        .await;
    drop(tx);

    assert!(outcomes.iter().all(|o| o.reason == Some("Cancelled")));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_credential_is_attached_to_every_item() {
    let store = MemoryKeyStore::new([TsigKey {
        name: "update-key".to_string(),
        algorithm: TsigAlgorithm::HmacSha256,
        secret: "c2VjcmV0LWtleS1ieXRlcw==".to_string(),
    }]);
    let credential = KeyringResolver::new(Arc::new(store))
        .resolve(Some("update-key"))
        .await
        .unwrap();
    let transport = RecordingTransport::new();
    let server = BindServer::new("ns1.example.com");
    let identifiers = ids(&["a.example.com", "b.example.org"]);

    DeletionBatch::new(&transport, &server, credential.as_ref(), 2)
        .run(&identifiers, not_cancelled())
        .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent
        .iter()
        .all(|update| update.key_name.as_deref() == Some("update-key")));
}

#[test]
fn test_reject_all() {
    let error = DnsError::Cancelled;
    let outcomes = reject_all(&ids(&["a.example.com", "b.example.com"]), &error);

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[1].description, "Delete Record: b.example.com");
    assert!(outcomes.iter().all(|o| !o.success));
}

#[test]
fn test_zero_concurrency_is_clamped() {
    let transport = RecordingTransport::new();
    let server = BindServer::new("ns1.example.com");
    assert_eq!(DeletionBatch::new(&transport, &server, None, 0).concurrency, 1);
}
