// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # BlinkPay Actions Server
//!
//! Entry point for the `blinkpay-node` binary. Parses CLI arguments,
//! initializes logging and metrics, wires the ledger client into the
//! transfer builder, and serves the Actions API.
//!
//! The binary supports three subcommands:
//!
//! - `run`      — start the Actions server
//! - `metadata` — print the discovery document as JSON
//! - `version`  — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use blinkpay_protocol::action::transfer_action;
use blinkpay_protocol::config::{ACTION_PATH, ACTION_VERSION};
use blinkpay_protocol::ledger::{Checkpoint, LedgerClient, RpcLedgerClient, StaticLedger};
use blinkpay_protocol::transaction::TransferBuilder;

use cli::{BlinkpayCli, Commands};
use metrics::NodeMetrics;

/// Last valid block height reported in offline mode. Never reached in
/// practice, which is the point: offline hashes never expire locally.
const OFFLINE_LAST_VALID_BLOCK_HEIGHT: u64 = u64::MAX;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = BlinkpayCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Metadata(args) => print_metadata(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the Actions API and the metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, args.log_format());

    let fetch_timeout = Duration::from_millis(args.fetch_timeout_ms);

    // --- Ledger client ---
    let ledger: Arc<dyn LedgerClient> = match args.offline_blockhash {
        Some(blockhash) => {
            tracing::warn!(%blockhash, "offline mode: transactions will not land on chain");
            Arc::new(StaticLedger::new(Checkpoint {
                blockhash,
                last_valid_block_height: OFFLINE_LAST_VALID_BLOCK_HEIGHT,
            }))
        }
        None => {
            let url = args.resolved_rpc_url();
            let client = RpcLedgerClient::new(url.as_str(), fetch_timeout)
                .with_context(|| format!("failed to create RPC client for {}", url))?;
            tracing::info!(rpc_url = client.url(), cluster = %args.cluster, "ledger client ready");
            Arc::new(client)
        }
    };

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);

    // --- Application state ---
    let app_state = api::AppState {
        version: format!("{} (actions {})", env!("CARGO_PKG_VERSION"), ACTION_VERSION),
        builder: Arc::new(TransferBuilder::new(ledger).fetch_timeout(fetch_timeout)),
        metrics: Arc::clone(&node_metrics),
        public_url: args.public_url.clone(),
    };

    tracing::info!(
        listen = %args.listen,
        port = args.port,
        metrics_port = args.metrics_port,
        fetch_timeout_ms = args.fetch_timeout_ms,
        public_url = args.public_url.as_ref().map(|u| u.as_str()).unwrap_or("<from Host>"),
        "starting blinkpay-node"
    );

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = SocketAddr::new(args.listen, args.port);
    let api_listener = tokio::net::TcpListener::bind(api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("Actions API listening on {} (action at {})", api_addr, ACTION_PATH);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = SocketAddr::new(args.listen, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    // The API drains in-flight requests on shutdown; the metrics server is
    // dropped once the API has stopped.
    let api_server = axum::serve(api_listener, api_router).with_graceful_shutdown(shutdown_signal());
    tokio::select! {
        res = api_server => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
    }

    tracing::info!("blinkpay-node stopped");
    Ok(())
}

/// Prints the discovery document to stdout, for inspection or static hosting.
fn print_metadata(args: cli::MetadataArgs) -> Result<()> {
    let icon = api::resolve_icon_url(Some(&args.public_url), &Default::default())
        .with_context(|| format!("cannot build icon URL from {}", args.public_url))?;
    let json = serde_json::to_string_pretty(&transfer_action(icon))
        .context("failed to serialize discovery document")?;
    println!("{}", json);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("blinkpay-node {}", env!("CARGO_PKG_VERSION"));
    println!("actions       {}", ACTION_VERSION);
    println!("rustc         {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler cannot be
/// installed, that branch waits forever rather than triggering a shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received, draining connections");
}
