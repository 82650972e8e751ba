//! # Transaction Module
//!
//! Everything between a validated transfer request and the base64 string a
//! wallet signs.
//!
//! ## Architecture
//!
//! ```text
//! types.rs       Currency and fixed-point TokenAmount
//! instruction.rs System and SPL token transfer instructions
//! message.rs     Legacy message compilation and wire encoding
//! envelope.rs    Unsigned transaction with empty signature slots
//! builder.rs     TransferBuilder: request strings in, UnsignedTransfer out
//! error.rs       BuildError and its client/internal split
//! ```
//!
//! ## Design Decisions
//!
//! - All amounts are `u64` in the currency's smallest unit. Decimal input is
//!   parsed as fixed point; floats never touch a monetary value.
//! - The server never signs. The wallet's account is the only signer and
//!   the fee payer, so every transaction has exactly one signature slot.
//! - Token transfers move between associated token accounts derived from the
//!   two wallets. Accounts that do not exist yet are the ledger's problem at
//!   broadcast time; we do not create them.

pub mod builder;
pub mod envelope;
pub mod error;
pub mod instruction;
pub mod message;
pub mod types;

pub use builder::{TransferBuilder, TransferParams, TransferRequest, UnsignedTransfer};
pub use envelope::Transaction;
pub use error::BuildError;
pub use instruction::{AccountMeta, Instruction, TransferInstruction};
pub use message::{Message, MessageError, MessageHeader};
pub use types::{AmountError, Currency, TokenAmount, UnknownCurrency};
