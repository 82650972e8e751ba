//! Transfer construction, from raw request strings to an unsigned transaction.
//!
//! [`TransferBuilder::build`] runs a fixed pipeline; each step is a hard
//! precondition for the next and the first failure ends the request:
//!
//! 1. parse the signer account
//! 2. resolve the currency
//! 3. normalize the amount
//! 4. parse the recipient
//! 5. pick the transfer primitive (deriving token accounts for SPL assets)
//! 6. fetch a checkpoint from the ledger, under a timeout
//! 7. assemble the unsigned transaction and summary message
//!
//! Steps 1–5 are pure and make no network calls, so malformed input never
//! costs an RPC round trip. Nothing is retried here; a failed fetch is the
//! wallet's cue to ask again.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::envelope::Transaction;
use super::error::BuildError;
use super::instruction::TransferInstruction;
use super::types::{Currency, TokenAmount};
use crate::action::ActionPostResponse;
use crate::config::{DEFAULT_AMOUNT, DEFAULT_CLUSTER, DEFAULT_FETCH_TIMEOUT, DEFAULT_TOKEN};
use crate::crypto::address::{associated_token_address, AddressError, Pubkey};
use crate::ledger::{Checkpoint, Cluster, LedgerClient, LedgerError};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters of the action `POST`, exactly as the client sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    /// Recipient address.
    pub wallet_address: Option<String>,
    /// Currency symbol; absent means SOL.
    pub token: Option<String>,
    /// Decimal amount; absent means 1.
    pub amount: Option<String>,
    /// Cluster name; absent means devnet. Informational only.
    pub cluster: Option<String>,
}

/// A fully validated transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub sender: Pubkey,
    pub recipient: Pubkey,
    pub amount: TokenAmount,
    /// `None` when the client sent an unrecognizable cluster name.
    pub cluster: Option<Cluster>,
}

impl TransferRequest {
    /// Validates steps 1–4 in order. No I/O.
    pub fn parse(account: &str, params: &TransferParams) -> Result<Self, BuildError> {
        let sender: Pubkey = account.trim().parse().map_err(BuildError::InvalidAccount)?;

        let currency: Currency = params
            .token
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN)
            .parse()?;

        let amount = TokenAmount::parse(
            params.amount.as_deref().unwrap_or(DEFAULT_AMOUNT),
            currency,
        )?;

        let recipient: Pubkey = params
            .wallet_address
            .as_deref()
            .unwrap_or_default()
            .trim()
            .parse()
            .map_err(BuildError::InvalidRecipient)?;

        // Clients that do not fill the `{cluster}` placeholder send it back
        // verbatim; that is not worth failing a transfer over.
        let cluster = match params.cluster.as_deref().unwrap_or(DEFAULT_CLUSTER).parse() {
            Ok(cluster) => Some(cluster),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring cluster parameter");
                None
            }
        };

        Ok(Self {
            sender,
            recipient,
            amount,
            cluster,
        })
    }

    pub fn currency(&self) -> Currency {
        self.amount.currency
    }

    /// Step 5: chooses the transfer primitive and resolves its accounts.
    pub fn resolve_instruction(&self) -> Result<TransferInstruction, BuildError> {
        let Some(mint) = self.currency().mint() else {
            return Ok(TransferInstruction::Native {
                from: self.sender,
                to: self.recipient,
                lamports: self.amount.raw,
            });
        };

        let source = associated_token_address(&self.sender, &mint).map_err(|e| match e {
            AddressError::OwnerOffCurve => BuildError::InvalidAccount(e),
            other => BuildError::Derivation(other),
        })?;
        let destination = associated_token_address(&self.recipient, &mint).map_err(|e| match e {
            AddressError::OwnerOffCurve => BuildError::InvalidRecipient(e),
            other => BuildError::Derivation(other),
        })?;

        Ok(TransferInstruction::Token {
            mint,
            source,
            destination,
            owner: self.sender,
            amount: self.amount.raw,
        })
    }

    /// Human-readable summary shown by the wallet before signing.
    pub fn summary(&self) -> String {
        format!(
            "Send {} {} to {}",
            self.amount.display_decimal(),
            self.currency(),
            self.recipient
        )
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The builder's output: everything the wallet needs, nothing retained.
#[derive(Debug, Clone)]
pub struct UnsignedTransfer {
    pub request: TransferRequest,
    pub instruction: TransferInstruction,
    pub checkpoint: Checkpoint,
    pub transaction: Transaction,
    pub message: String,
}

impl UnsignedTransfer {
    /// Encodes the transaction for the Actions `POST` response.
    pub fn to_post_response(&self) -> Result<ActionPostResponse, BuildError> {
        Ok(ActionPostResponse::transaction(
            self.transaction.to_base64()?,
            self.message.clone(),
        ))
    }
}

// ---------------------------------------------------------------------------
// TransferBuilder
// ---------------------------------------------------------------------------

/// Builds unsigned transfer transactions against a shared ledger client.
///
/// Cheap to clone: the ledger client sits behind an `Arc`.
#[derive(Clone)]
pub struct TransferBuilder {
    ledger: Arc<dyn LedgerClient>,
    fetch_timeout: Duration,
}

impl TransferBuilder {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Overrides the checkpoint fetch timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Runs the full pipeline for one request.
    pub async fn build(
        &self,
        account: &str,
        params: &TransferParams,
    ) -> Result<UnsignedTransfer, BuildError> {
        let request = TransferRequest::parse(account, params)?;
        let instruction = request.resolve_instruction()?;
        self.assemble(request, instruction).await
    }

    /// Steps 6–7 for an already validated request.
    pub async fn assemble(
        &self,
        request: TransferRequest,
        instruction: TransferInstruction,
    ) -> Result<UnsignedTransfer, BuildError> {
        let checkpoint = tokio::time::timeout(self.fetch_timeout, self.ledger.latest_checkpoint())
            .await
            .map_err(|_| LedgerError::Timeout(self.fetch_timeout))??;

        let transaction = Transaction::new_unsigned(
            &request.sender,
            &[instruction.to_instruction()],
            checkpoint.blockhash,
        )?;
        let message = request.summary();

        tracing::info!(
            sender = %request.sender,
            recipient = %request.recipient,
            currency = %request.currency(),
            amount = request.amount.raw,
            last_valid_block_height = checkpoint.last_valid_block_height,
            "unsigned transfer built"
        );

        Ok(UnsignedTransfer {
            request,
            instruction,
            checkpoint,
            transaction,
            message,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
