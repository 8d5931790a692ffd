// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Binder - BIND9 dynamic update orchestration
//!
//! Binder creates, deletes and lists resource records on BIND9 servers using
//! RFC 2136 dynamic updates authenticated with TSIG keys, and enumerates
//! zones and records via zone transfer and the BIND9 statistics channel.
//!
//! ## Overview
//!
//! The library is the layer between a front-end that collects validated
//! input (server, zone, record name/type/data, TTL, key name) and the
//! authoritative server:
//!
//! - TSIG key resolution from a pluggable key store
//! - Forward, reverse (PTR) and CNAME record construction, including reverse
//!   zone derivation for IPv4 and IPv6 addresses
//! - Update transmission over TCP with classified failures
//! - Batch deletion with ordered per-record outcomes and cancellation
//! - Zone and record listing that degrades to an empty result on refusal
//!
//! ## Modules
//!
//! - [`bind9`] - Orchestrator, record builders, transport and listing
//! - [`config`] - YAML configuration
//! - [`dns_errors`] - Error taxonomy
//! - [`fqdn`] - Name decomposition shared by reverse records and deletion
//! - [`constants`] - Defaults and protocol constants
//!
//! ## Example
//!
//! ```rust,no_run
//! use binder::config::BinderConfig;
//! use binder::bind9::RecordRequest;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BinderConfig::load(std::path::Path::new("binder.yaml")).await?;
//! let orchestrator = config.build_orchestrator().await?;
//!
//! let outcomes = orchestrator
//!     .add_record(&RecordRequest {
//!         server: "ns1.example.com".to_string(),
//!         zone: "example.com".to_string(),
//!         name: "host1".to_string(),
//!         record_type: "A".to_string(),
//!         data: "10.20.0.5".to_string(),
//!         ttl: Some(300),
//!         key_name: Some("update-key".to_string()),
//!         create_reverse: true,
//!     })
//!     .await;
//! assert_eq!(outcomes.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod bind9;
pub mod config;
pub mod constants;
pub mod dns_errors;
pub mod fqdn;
