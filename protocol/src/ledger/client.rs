//! The ledger client seam.
//!
//! The transfer builder needs exactly one thing from the network: a fresh
//! checkpoint (blockhash + last valid block height). [`LedgerClient`] is
//! that one call. [`RpcLedgerClient`] answers it over JSON-RPC;
//! [`StaticLedger`] answers it from memory for tests and offline runs.
//!
//! Implementations are shared across concurrent requests behind an `Arc`
//! and must not hold per-request state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::config::RPC_COMMITMENT;
use crate::crypto::hash::Hash;
use crate::ledger::rpc::{LatestBlockhash, RpcRequest, RpcResponse, WithContext};

/// Failures talking to the ledger. None of these are the caller's fault.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("ledger rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),

    #[error("ledger call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LedgerError::MalformedResponse(e.to_string())
        } else {
            LedgerError::Transport(e.to_string())
        }
    }
}

/// A recent blockhash and the last block height at which a message
/// referencing it is still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

impl From<LatestBlockhash> for Checkpoint {
    fn from(value: LatestBlockhash) -> Self {
        Self {
            blockhash: value.blockhash,
            last_valid_block_height: value.last_valid_block_height,
        }
    }
}

/// Read-only access to the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetches a checkpoint fresh enough to anchor a new transaction.
    async fn latest_checkpoint(&self) -> Result<Checkpoint, LedgerError>;
}

// ---------------------------------------------------------------------------
// RpcLedgerClient
// ---------------------------------------------------------------------------

/// JSON-RPC client for a ledger node. Construct once at startup.
///
/// `reqwest::Client` pools connections internally and is cheap to share;
/// request ids come from an atomic counter so concurrent calls never block
/// each other.
pub struct RpcLedgerClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    /// Creates a client for `url`, with `timeout` applied to every HTTP call.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn latest_checkpoint(&self) -> Result<Checkpoint, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::latest_blockhash(id, RPC_COMMITMENT);

        tracing::debug!(url = %self.url, id, "fetching latest blockhash");

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: RpcResponse<WithContext<LatestBlockhash>> = response.json().await?;

        if let Some(err) = body.error {
            return Err(LedgerError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let result = body
            .result
            .ok_or_else(|| LedgerError::MalformedResponse("missing result".into()))?;

        tracing::debug!(
            slot = result.context.slot,
            last_valid_block_height = result.value.last_valid_block_height,
            "latest blockhash received"
        );
        Ok(result.value.into())
    }
}

// ---------------------------------------------------------------------------
// StaticLedger
// ---------------------------------------------------------------------------

/// A ledger that always returns the same checkpoint and counts the calls.
///
/// Transactions built against it are well-formed but will be rejected at
/// broadcast once the hash is stale, which for a made-up hash is always.
pub struct StaticLedger {
    checkpoint: Checkpoint,
    calls: AtomicUsize,
}

impl StaticLedger {
    pub fn new(checkpoint: Checkpoint) -> Self {
        Self {
            checkpoint,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times [`LedgerClient::latest_checkpoint`] was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for StaticLedger {
    async fn latest_checkpoint(&self) -> Result<Checkpoint, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.checkpoint)
    }
}
