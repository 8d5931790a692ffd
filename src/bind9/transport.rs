// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS update transmission and zone transfer over TCP.
//!
//! hickory's `SyncClient` is blocking, so every exchange runs on the blocking
//! pool via `tokio::task::spawn_blocking`. Each exchange is bounded twice: the
//! TCP connection carries a socket timeout, and the async caller stops waiting
//! shortly after it in case the blocking task is stuck elsewhere.
//!
//! Server answers and client failures are translated into [`TransportError`]
//! and [`TransferError`] values here so that callers never have to inspect
//! hickory error types.
//!
//! Updates are signed here rather than by the client. A server rejecting a
//! TSIG key answers NOTAUTH with the reason in the TSIG RR error field and an
//! empty MAC; a signing client would fail verification and drop that answer,
//! so the raw response is inspected first and only then verified.

use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::error::{ClientError, ClientErrorKind};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{Record, RecordType};
use hickory_client::tcp::TcpClientConnection;
use hickory_proto::error::ProtoErrorKind;
use hickory_proto::op::{Message, MessageVerifier};
use hickory_proto::rr::dnssec::rdata::DNSSECRData;
use hickory_proto::rr::dnssec::tsig::TSigner;
use hickory_proto::rr::RData;
use hickory_proto::serialize::binary::BinEncodable;
use hickory_proto::xfer::{DnsRequest, DnsRequestOptions};
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

use super::keyring::TsigCredential;
use super::records::UpdateRequest;
use super::types::{BindServer, ZoneRecord};
use crate::constants::{
    DEFAULT_TRANSFER_TIMEOUT_SECS, DEFAULT_UPDATE_TIMEOUT_SECS, TRANSPORT_TIMEOUT_GRACE_SECS,
    TSIG_ERROR_BADKEY, TSIG_ERROR_BADSIG, TSIG_ERROR_BADTIME, TSIG_ERROR_BADTRUNC,
};
use crate::dns_errors::{TransferError, TransportError};
use crate::fqdn::parse_name;

/// Placeholder key name used in error messages for unsigned requests.
const UNSIGNED: &str = "<none>";

/// A server's answer to an accepted update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResponse {
    /// `host:port` the update was sent to
    pub server: String,
    /// Message ID of the response
    pub id: u16,
    /// Response code; always `NoError` for a returned response
    pub response_code: ResponseCode,
}

impl fmt::Display for UpdateResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} answered {:?} (id {})",
            self.server, self.response_code, self.id
        )
    }
}

/// Sends updates and zone transfers to a DNS server.
///
/// The production implementation is [`TcpTransport`]; tests substitute their
/// own to observe what would have been sent.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Send one update, signed with `credential` when present.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] describing why the update was not applied.
    async fn send_update(
        &self,
        server: &BindServer,
        request: &UpdateRequest,
        credential: Option<&TsigCredential>,
    ) -> Result<UpdateResponse, TransportError>;

    /// Transfer every record of `zone` (AXFR).
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::TransferDenied`] when the server refuses the
    /// transfer, or another [`TransferError`] for failures along the way.
    async fn transfer_zone(
        &self,
        server: &BindServer,
        zone: &str,
    ) -> Result<Vec<ZoneRecord>, TransferError>;
}

/// [`DnsTransport`] over TCP using hickory's synchronous client.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    update_timeout: Duration,
    transfer_timeout: Duration,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_UPDATE_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_TRANSFER_TIMEOUT_SECS),
        )
    }
}

impl TcpTransport {
    /// Create a transport with the given socket timeouts.
    #[must_use]
    pub fn new(update_timeout: Duration, transfer_timeout: Duration) -> Self {
        Self {
            update_timeout,
            transfer_timeout,
        }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send_update(
        &self,
        server: &BindServer,
        request: &UpdateRequest,
        credential: Option<&TsigCredential>,
    ) -> Result<UpdateResponse, TransportError> {
        let address = server.dns_address();
        let key_name = credential.map(|c| c.key_name().to_string());
        let signer = credential.map(|c| c.signer().clone());
        let message = request.to_message();
        let timeout = self.update_timeout;

        info!(
            server = %address,
            key = key_name.as_deref().unwrap_or(UNSIGNED),
            "Sending DNS update: {request}"
        );

        let task_address = address.clone();
        let task_key = key_name.clone();
        let task = tokio::task::spawn_blocking(move || {
            send_update_blocking(&task_address, task_key.as_deref(), message, signer, timeout)
        });

        let result = match tokio::time::timeout(with_grace(timeout), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(TransportError::Unreachable {
                server: address.clone(),
                reason: format!("update task failed: {join_error}"),
            }),
            Err(_) => Err(TransportError::Timeout {
                server: address.clone(),
                timeout_ms: duration_ms(timeout),
            }),
        };

        match &result {
            Ok(response) => info!(server = %address, "DNS update accepted: {response}"),
            Err(e) => error!(server = %address, "DNS update failed: {e}"),
        }
        result
    }

    async fn transfer_zone(
        &self,
        server: &BindServer,
        zone: &str,
    ) -> Result<Vec<ZoneRecord>, TransferError> {
        let address = server.dns_address();
        let timeout = self.transfer_timeout;

        debug!(server = %address, zone = %zone, "Requesting zone transfer");

        let task_address = address.clone();
        let task_zone = zone.to_string();
        let task = tokio::task::spawn_blocking(move || {
            transfer_zone_blocking(&task_address, &task_zone, timeout)
        });

        let result = match tokio::time::timeout(with_grace(timeout), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(TransferError::TransferFailed {
                zone: zone.to_string(),
                server: address.clone(),
                reason: format!("transfer task failed: {join_error}"),
            }),
            Err(_) => Err(TransferError::TransferTimeout {
                zone: zone.to_string(),
                server: address.clone(),
                timeout_secs: timeout.as_secs(),
            }),
        };

        match &result {
            Ok(records) => {
                info!(server = %address, zone = %zone, records = records.len(), "Zone transfer complete");
            }
            Err(TransferError::TransferDenied { .. }) => {
                warn!(server = %address, zone = %zone, "Zone transfer refused");
            }
            Err(e) => error!(server = %address, zone = %zone, "Zone transfer failed: {e}"),
        }
        result
    }
}

fn with_grace(timeout: Duration) -> Duration {
    timeout + Duration::from_secs(TRANSPORT_TIMEOUT_GRACE_SECS)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Resolve `host:port` to the first socket address.
fn resolve_address(server: &str) -> Result<SocketAddr, TransportError> {
    let invalid = |reason: String| TransportError::InvalidServerAddress {
        server: server.to_string(),
        reason,
    };

    server
        .to_socket_addrs()
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("address resolved to nothing".to_string()))
}

fn send_update_blocking(
    server: &str,
    key_name: Option<&str>,
    mut message: Message,
    signer: Option<TSigner>,
    timeout: Duration,
) -> Result<UpdateResponse, TransportError> {
    let address = resolve_address(server)?;
    let verifier = match &signer {
        Some(signer) => sign_message(server, key_name.unwrap_or(UNSIGNED), &mut message, signer)?,
        None => None,
    };

    let conn = TcpClientConnection::with_timeout(address, timeout)
        .map_err(|e| classify_client_error(server, key_name, &e, timeout))?;

    let request = DnsRequest::new(message, DnsRequestOptions::default());
    let response = SyncClient::new(conn)
        .send(request)
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::Unreachable {
            server: server.to_string(),
            reason: "connection closed without a response".to_string(),
        })?
        .map_err(|e| classify_client_error(server, key_name, &e, timeout))?;

    check_tsig_error(server, key_name, &response)?;
    check_response_code(server, key_name, response.response_code())?;

    if let Some(mut verify) = verifier {
        verify(response.as_buffer()).map_err(|e| TransportError::ResponseUnverified {
            server: server.to_string(),
            key_name: key_name.unwrap_or(UNSIGNED).to_string(),
            reason: e.to_string(),
        })?;
        debug!(server = %server, "TSIG signature on response verified");
    }

    Ok(UpdateResponse {
        server: server.to_string(),
        id: response.id(),
        response_code: response.response_code(),
    })
}

/// Append a TSIG record to `message`, returning the verifier for the answer.
fn sign_message(
    server: &str,
    key_name: &str,
    message: &mut Message,
    signer: &TSigner,
) -> Result<Option<MessageVerifier>, TransportError> {
    let failed = |reason: String| TransportError::SigningFailed {
        server: server.to_string(),
        key_name: key_name.to_string(),
        reason,
    };

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| failed(e.to_string()))?;
    let now = u32::try_from(now.as_secs()).map_err(|e| failed(e.to_string()))?;

    message.finalize(signer, now).map_err(|e| failed(e.to_string()))
}

/// Map the error field of a response's TSIG record to a [`TransportError`].
///
/// Only consulted for signed requests. BADKEY means the server does not know
/// the key name; BADSIG, BADTIME and BADTRUNC mean it knows the key but
/// rejected the signature.
pub(crate) fn check_tsig_error(
    server: &str,
    key_name: Option<&str>,
    response: &Message,
) -> Result<(), TransportError> {
    let Some(key) = key_name else {
        return Ok(());
    };
    let Some(error) = response.signature().iter().find_map(tsig_error) else {
        return Ok(());
    };

    match error {
        0 => Ok(()),
        TSIG_ERROR_BADKEY => Err(TransportError::AuthKeyRejected {
            server: server.to_string(),
            key_name: key.to_string(),
        }),
        TSIG_ERROR_BADSIG | TSIG_ERROR_BADTIME | TSIG_ERROR_BADTRUNC => {
            Err(TransportError::AuthSignatureRejected {
                server: server.to_string(),
                key_name: key.to_string(),
            })
        }
        other => Err(TransportError::ServerError {
            server: server.to_string(),
            response_code: format!("{:?}", <ResponseCode as From<u16>>::from(other)),
        }),
    }
}

/// Read the error field of a TSIG record.
///
/// hickory does not expose the field, so it is taken from the encoded RDATA:
/// algorithm name, time (6), fudge (2), MAC size (2), MAC, original ID (2),
/// then the error.
pub(crate) fn tsig_error(record: &Record) -> Option<u16> {
    let Some(RData::DNSSEC(DNSSECRData::TSIG(tsig))) = record.data() else {
        return None;
    };
    let rdata = tsig.to_bytes().ok()?;
    let algorithm = tsig.algorithm().to_name().to_bytes().ok()?;

    let offset = algorithm.len() + 6 + 2 + 2 + tsig.mac().len() + 2;
    let field = rdata.get(offset..offset + 2)?;
    <[u8; 2]>::try_from(field).ok().map(u16::from_be_bytes)
}

fn transfer_zone_blocking(
    server: &str,
    zone: &str,
    timeout: Duration,
) -> Result<Vec<ZoneRecord>, TransferError> {
    let failed = |reason: String| TransferError::TransferFailed {
        zone: zone.to_string(),
        server: server.to_string(),
        reason,
    };

    let origin = parse_name(zone).map_err(|e| failed(e.to_string()))?;
    let address = resolve_address(server).map_err(|e| failed(e.to_string()))?;
    let conn = TcpClientConnection::with_timeout(address, timeout)
        .map_err(|e| classify_transfer_error(server, zone, &e, timeout))?;
    let client = SyncClient::new(conn);

    let responses = client
        .zone_transfer(&origin, None)
        .map_err(|e| classify_transfer_error(server, zone, &e, timeout))?;

    let mut records = Vec::new();
    for response in responses {
        let response = response.map_err(|e| classify_transfer_error(server, zone, &e, timeout))?;
        check_transfer_code(server, zone, response.response_code())?;
        records.extend(response.answers().iter().cloned());
    }

    Ok(collect_zone_records(records))
}

/// Map an update response code to success or a [`TransportError`].
///
/// The TSIG codes only appear here when a server reports them as an extended
/// RCODE; the usual place is the TSIG record (see [`check_tsig_error`]).
pub(crate) fn check_response_code(
    server: &str,
    key_name: Option<&str>,
    code: ResponseCode,
) -> Result<(), TransportError> {
    let key = key_name.unwrap_or(UNSIGNED).to_string();
    match code {
        ResponseCode::NoError => Ok(()),
        ResponseCode::BADKEY => Err(TransportError::AuthKeyRejected {
            server: server.to_string(),
            key_name: key,
        }),
        ResponseCode::BADSIG | ResponseCode::BADTIME => {
            Err(TransportError::AuthSignatureRejected {
                server: server.to_string(),
                key_name: key,
            })
        }
        other => Err(TransportError::ServerError {
            server: server.to_string(),
            response_code: format!("{other:?}"),
        }),
    }
}

/// Map a hickory client failure to a [`TransportError`].
pub(crate) fn classify_client_error(
    server: &str,
    key_name: Option<&str>,
    err: &ClientError,
    timeout: Duration,
) -> TransportError {
    let timed_out = || TransportError::Timeout {
        server: server.to_string(),
        timeout_ms: duration_ms(timeout),
    };
    let unreachable = |reason: String| TransportError::Unreachable {
        server: server.to_string(),
        reason,
    };

    match err.kind() {
        ClientErrorKind::Timeout => timed_out(),
        ClientErrorKind::Io(e) => unreachable(e.to_string()),
        ClientErrorKind::Proto(proto) => match proto.kind() {
            ProtoErrorKind::Timeout => timed_out(),
            ProtoErrorKind::Io(e) => unreachable(e.to_string()),
            _ => classify_error_text(server, key_name, &err.to_string(), timeout),
        },
        _ => classify_error_text(server, key_name, &err.to_string(), timeout),
    }
}

/// Classify a failure from its message when hickory gives no structured kind.
pub(crate) fn classify_error_text(
    server: &str,
    key_name: Option<&str>,
    text: &str,
    timeout: Duration,
) -> TransportError {
    let lower = text.to_ascii_lowercase();

    if let Some(key) = key_name {
        if lower.contains("badkey") || lower.contains("bad key") || lower.contains("unknown key")
        {
            return TransportError::AuthKeyRejected {
                server: server.to_string(),
                key_name: key.to_string(),
            };
        }
        if lower.contains("badsig")
            || lower.contains("badtime")
            || lower.contains("signature")
            || lower.contains("tsig")
        {
            return TransportError::AuthSignatureRejected {
                server: server.to_string(),
                key_name: key.to_string(),
            };
        }
    }

    if lower.contains("timed out") || lower.contains("timeout") {
        return TransportError::Timeout {
            server: server.to_string(),
            timeout_ms: duration_ms(timeout),
        };
    }

    TransportError::Unreachable {
        server: server.to_string(),
        reason: text.to_string(),
    }
}

fn check_transfer_code(server: &str, zone: &str, code: ResponseCode) -> Result<(), TransferError> {
    match code {
        ResponseCode::NoError => Ok(()),
        ResponseCode::Refused | ResponseCode::NotAuth => Err(TransferError::TransferDenied {
            zone: zone.to_string(),
            server: server.to_string(),
        }),
        other => Err(TransferError::TransferFailed {
            zone: zone.to_string(),
            server: server.to_string(),
            reason: format!("server answered {other:?}"),
        }),
    }
}

/// Map a hickory client failure during AXFR to a [`TransferError`].
pub(crate) fn classify_transfer_error(
    server: &str,
    zone: &str,
    err: &ClientError,
    timeout: Duration,
) -> TransferError {
    let timed_out = || TransferError::TransferTimeout {
        zone: zone.to_string(),
        server: server.to_string(),
        timeout_secs: timeout.as_secs(),
    };
    let failed = |reason: String| TransferError::TransferFailed {
        zone: zone.to_string(),
        server: server.to_string(),
        reason,
    };

    match err.kind() {
        ClientErrorKind::Timeout => timed_out(),
        ClientErrorKind::Io(e) => failed(e.to_string()),
        ClientErrorKind::Proto(proto) => match proto.kind() {
            ProtoErrorKind::Timeout => timed_out(),
            ProtoErrorKind::Io(e) => failed(e.to_string()),
            _ => classify_transfer_text(server, zone, &err.to_string()),
        },
        _ => classify_transfer_text(server, zone, &err.to_string()),
    }
}

fn classify_transfer_text(server: &str, zone: &str, text: &str) -> TransferError {
    let lower = text.to_ascii_lowercase();
    if lower.contains("refused") || lower.contains("notauth") || lower.contains("not auth") {
        TransferError::TransferDenied {
            zone: zone.to_string(),
            server: server.to_string(),
        }
    } else {
        TransferError::TransferFailed {
            zone: zone.to_string(),
            server: server.to_string(),
            reason: text.to_string(),
        }
    }
}

/// Turn the raw AXFR answer stream into display records.
///
/// A transfer is framed by the zone's SOA at both ends; the closing copy is
/// dropped so the SOA is listed once.
pub(crate) fn collect_zone_records(mut records: Vec<Record>) -> Vec<ZoneRecord> {
    let framed = records.len() > 1
        && records.first().map(Record::record_type) == Some(RecordType::SOA)
        && records.last().map(Record::record_type) == Some(RecordType::SOA);
    if framed {
        records.pop();
    }

    records.iter().map(zone_record).collect()
}

fn zone_record(record: &Record) -> ZoneRecord {
    ZoneRecord {
        name: record.name().to_ascii(),
        ttl: record.ttl(),
        class: record.dns_class().to_string(),
        record_type: record.record_type().to_string(),
        data: record.data().map(ToString::to_string).unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod transport_tests;
