//! Error types for transfer construction.
//!
//! Every build failure is a [`BuildError`]. The split that matters to the
//! HTTP layer is [`BuildError::is_client_error`]: malformed input is the
//! caller's to fix and is echoed back verbatim; anything else is ours (or
//! the ledger's) and is reported generically.

use thiserror::Error;

use crate::crypto::address::AddressError;
use crate::ledger::LedgerError;
use crate::transaction::message::MessageError;
use crate::transaction::types::{AmountError, UnknownCurrency};

/// Message shown to clients for failures that are not their fault.
pub const GENERIC_FAILURE: &str = "Failed to build transaction, please try again";

#[derive(Debug, Error)]
pub enum BuildError {
    /// The signer account in the POST body is not a usable address.
    #[error("Invalid account: {0}")]
    InvalidAccount(AddressError),

    /// The `walletAddress` query parameter is not a usable address.
    #[error("Invalid recipient wallet address: {0}")]
    InvalidRecipient(AddressError),

    #[error("Unsupported token: {0}")]
    UnknownCurrency(#[from] UnknownCurrency),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Fetching the checkpoint failed or timed out.
    #[error("ledger unavailable: {0}")]
    Ledger(#[from] LedgerError),

    /// Address derivation failed for a reason other than bad input.
    #[error("address derivation failed: {0}")]
    Derivation(AddressError),

    #[error("transaction encoding failed: {0}")]
    Encoding(#[from] MessageError),
}

impl BuildError {
    /// `true` for input validation failures (HTTP 400), `false` for
    /// dependency or internal failures (HTTP 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAccount(_)
                | Self::InvalidRecipient(_)
                | Self::UnknownCurrency(_)
                | Self::InvalidAmount(_)
        )
    }

    /// Text safe to return to the client.
    pub fn client_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            GENERIC_FAILURE.to_string()
        }
    }
}
