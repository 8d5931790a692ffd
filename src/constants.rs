// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for Binder.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for updates and zone transfers
pub const DNS_PORT: u16 = 53;

/// Default TTL for DNS records (5 minutes)
pub const DEFAULT_DNS_RECORD_TTL_SECS: u32 = 300;

/// TSIG fudge time in seconds (allows for clock skew)
pub const TSIG_FUDGE_TIME_SECS: u64 = 300;

/// TSIG RR error field: signature failed verification (RFC 8945)
pub const TSIG_ERROR_BADSIG: u16 = 16;

/// TSIG RR error field: key not recognized
pub const TSIG_ERROR_BADKEY: u16 = 17;

/// TSIG RR error field: signing time outside the fudge window
pub const TSIG_ERROR_BADTIME: u16 = 18;

/// TSIG RR error field: MAC truncated below the accepted length
pub const TSIG_ERROR_BADTRUNC: u16 = 22;

/// Label used by callers to address the zone apex
pub const ZONE_APEX_LABEL: &str = "@";

/// Suffix of IPv4 reverse-lookup names
pub const IPV4_REVERSE_SUFFIX: &str = "in-addr.arpa.";

/// Suffix of IPv6 reverse-lookup names
pub const IPV6_REVERSE_SUFFIX: &str = "ip6.arpa.";

// ============================================================================
// Timeout Constants
// ============================================================================

/// Default timeout for a single dynamic update round trip
pub const DEFAULT_UPDATE_TIMEOUT_SECS: u64 = 10;

/// Default timeout for a complete zone transfer
pub const DEFAULT_TRANSFER_TIMEOUT_SECS: u64 = 30;

/// Default timeout for statistics channel HTTP requests
pub const DEFAULT_STATISTICS_TIMEOUT_SECS: u64 = 10;

/// Slack added on top of a socket timeout before the caller gives up on the
/// blocking DNS task
pub const TRANSPORT_TIMEOUT_GRACE_SECS: u64 = 2;

// ============================================================================
// BIND9 Statistics Channel Constants
// ============================================================================

/// Default BIND9 statistics channel port
pub const DEFAULT_STATISTICS_PORT: u16 = 8053;

/// Path of the JSON zone listing on the statistics channel
pub const STATISTICS_ZONES_PATH: &str = "/json/v1/zones";

/// Zone type reported by BIND9 for its built-in zones
pub const STATISTICS_BUILTIN_ZONE_TYPE: &str = "builtin";

// ============================================================================
// Batch Constants
// ============================================================================

/// Default number of deletions in flight at once
pub const DEFAULT_DELETE_CONCURRENCY: usize = 4;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
