//! # CLI Interface
//!
//! Defines the command-line argument structure for `blinkpay-node` using
//! `clap` derive. Supports three subcommands: `run`, `metadata`, and
//! `version`. Every `run` flag has a `BLINKPAY_*` environment fallback so
//! the binary can be configured entirely from the environment.

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use url::Url;

use blinkpay_protocol::crypto::hash::Hash;
use blinkpay_protocol::ledger::Cluster;

use crate::logging::LogFormat;

/// BlinkPay Actions server.
///
/// Serves a Solana Action that builds unsigned SOL and SPL token transfers
/// for a wallet to sign. Holds no keys and broadcasts nothing.
#[derive(Parser, Debug)]
#[command(
    name = "blinkpay-node",
    about = "BlinkPay Solana Actions server",
    version,
    propagate_version = true
)]
pub struct BlinkpayCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the Actions HTTP server.
    Run(RunArgs),
    /// Print the action's discovery document and exit.
    Metadata(MetadataArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address to bind both listeners on.
    #[arg(long, env = "BLINKPAY_LISTEN", default_value = "0.0.0.0")]
    pub listen: IpAddr,

    /// Port for the Actions API.
    #[arg(long, env = "BLINKPAY_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "BLINKPAY_METRICS_PORT", default_value_t = 9090)]
    pub metrics_port: u16,

    /// Cluster whose public RPC endpoint supplies blockhashes.
    #[arg(long, env = "BLINKPAY_CLUSTER", default_value = "mainnet-beta")]
    pub cluster: Cluster,

    /// Explicit RPC endpoint. Overrides `--cluster`.
    #[arg(long, env = "BLINKPAY_RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Public origin used for the icon URL, e.g. `https://pay.example.com`.
    ///
    /// When omitted, the origin is taken from each request's `Host` header.
    #[arg(long, env = "BLINKPAY_PUBLIC_URL")]
    pub public_url: Option<Url>,

    /// Upper bound on the blockhash fetch, in milliseconds.
    #[arg(long, env = "BLINKPAY_FETCH_TIMEOUT_MS", default_value_t = 10_000)]
    pub fetch_timeout_ms: u64,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "BLINKPAY_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Serve this fixed blockhash instead of querying RPC.
    ///
    /// For local wallet integration testing only: transactions built this
    /// way are well-formed but will never land.
    #[arg(long, env = "BLINKPAY_OFFLINE_BLOCKHASH")]
    pub offline_blockhash: Option<Hash>,
}

impl RunArgs {
    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_str_lossy(&self.log_format)
    }

    /// RPC endpoint to query: the explicit URL if given, else the cluster's.
    pub fn resolved_rpc_url(&self) -> String {
        match &self.rpc_url {
            Some(url) => url.to_string(),
            None => self.cluster.rpc_url().to_string(),
        }
    }
}

/// Arguments for the `metadata` subcommand.
#[derive(Parser, Debug)]
pub struct MetadataArgs {
    /// Origin to build the icon URL from.
    #[arg(long, env = "BLINKPAY_PUBLIC_URL", default_value = "http://localhost:3000")]
    pub public_url: Url,
}
