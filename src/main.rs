// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use binder::{
    bind9::{CnameRequest, Listing, RecordRequest, UpdateOutcome},
    config::BinderConfig,
    constants::TOKIO_WORKER_THREADS,
    dns_errors::DnsError,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Manage records on BIND9 servers with TSIG-signed dynamic updates.
#[derive(Debug, Parser)]
#[command(name = "binder", version)]
struct Cli {
    /// YAML configuration file (servers, keys, timeouts)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hostname of the BIND9 server to act on
    #[arg(short, long)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or replace a record, optionally with its PTR record
    Add {
        /// Zone the record lives in
        #[arg(long)]
        zone: String,
        /// Record label within the zone (`@` for the apex)
        #[arg(long)]
        name: String,
        /// Record type (A, AAAA, CNAME, PTR, NS, MX, TXT, SRV)
        #[arg(long = "type", default_value = "A")]
        record_type: String,
        /// Record data
        #[arg(long)]
        data: String,
        /// TTL in seconds
        #[arg(long)]
        ttl: Option<u32>,
        /// TSIG key name
        #[arg(long)]
        key: Option<String>,
        /// Also create the reverse PTR record (A/AAAA only)
        #[arg(long)]
        reverse: bool,
    },
    /// Point an alias at an existing name
    AddCname {
        /// Zone the alias lives in
        #[arg(long)]
        zone: String,
        /// Alias label within the zone
        #[arg(long)]
        alias: String,
        /// Fully qualified target name
        #[arg(long)]
        target: String,
        /// TTL in seconds
        #[arg(long)]
        ttl: Option<u32>,
        /// TSIG key name
        #[arg(long)]
        key: Option<String>,
    },
    /// Delete every record at each `<label>.<zone>` identifier
    Delete {
        /// TSIG key name
        #[arg(long)]
        key: Option<String>,
        /// Record identifiers, e.g. `www.example.com`
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
    /// List the records of a zone (AXFR)
    ListZone {
        /// Zone to transfer
        zone: String,
    },
    /// List the zones the server hosts (statistics channel)
    ListZones,
    /// Show the addresses the server hostname resolves to
    Addresses,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("binder")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_tracing() {
    // Respects RUST_LOG (default info) and RUST_LOG_FORMAT=json|text.
    // Logs go to stderr so stdout carries only the JSON result.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<ExitCode> {
    init_tracing();
    debug!("Logging initialized with file and line number tracking");

    let mut config = match &cli.config {
        Some(path) => BinderConfig::load(path).await?,
        None => BinderConfig::default(),
    };
    config.add_server(&cli.server);

    let orchestrator = config.build_orchestrator().await?;
    info!(server = %cli.server, "Binder ready");

    let success = match cli.command {
        Command::Add {
            zone,
            name,
            record_type,
            data,
            ttl,
            key,
            reverse,
        } => {
            let request = RecordRequest {
                server: cli.server.clone(),
                zone,
                name,
                record_type,
                data,
                ttl,
                key_name: key,
                create_reverse: reverse,
            };
            print_outcomes(&orchestrator.add_record(&request).await)?
        }
        Command::AddCname {
            zone,
            alias,
            target,
            ttl,
            key,
        } => {
            let request = CnameRequest {
                server: cli.server.clone(),
                zone,
                alias,
                target,
                ttl,
                key_name: key,
            };
            print_outcomes(&orchestrator.add_cname_record(&request).await)?
        }
        Command::Delete { key, identifiers } => {
            let (cancel_tx, cancel_rx) = watch::channel(false);
            let interrupt = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling remaining deletions");
                    let _ = cancel_tx.send(true);
                }
            });

            let outcomes = orchestrator
                .delete_records(&cli.server, &identifiers, key.as_deref(), cancel_rx)
                .await;
            interrupt.abort();
            print_outcomes(&outcomes)?
        }
        Command::ListZone { zone } => print_listing(&orchestrator.list_zone(&cli.server, &zone).await)?,
        Command::ListZones => print_listing(&orchestrator.list_zones(&cli.server).await)?,
        Command::Addresses => print_listing(&orchestrator.server_addresses(&cli.server).await)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_outcomes(outcomes: &[UpdateOutcome]) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(outcomes)?);
    Ok(outcomes.iter().all(|outcome| outcome.success))
}

fn print_listing<T: Serialize>(listing: &Listing<T>) -> Result<bool> {
    let error = listing.error.as_ref().map(|e: &DnsError| {
        json!({
            "reason": e.status_reason(),
            "message": e.to_string(),
            "transient": e.is_transient(),
        })
    });
    let document = json!({
        "items": listing.items,
        "error": error,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(listing.error.is_none())
}
