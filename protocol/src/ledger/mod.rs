//! # Ledger Access
//!
//! Everything that talks to, or names, the live ledger: clusters, the
//! JSON-RPC wire types, and the [`LedgerClient`] trait the builder depends
//! on. Broadcasting and confirmation are the wallet's business, not ours.

pub mod client;
pub mod cluster;
pub mod rpc;

pub use client::{Checkpoint, LedgerClient, LedgerError, RpcLedgerClient, StaticLedger};
pub use cluster::{Cluster, UnknownCluster};
