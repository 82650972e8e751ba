//! Ledger instructions: the one thing a transfer transaction carries.
//!
//! Two transfer primitives exist. Native SOL moves through the System
//! program between wallet addresses. SPL tokens move through the Token
//! program between associated token accounts, authorized by the owner.
//! [`TransferInstruction`] captures which one a request needs before it is
//! lowered into a raw [`Instruction`].

use serde::{Deserialize, Serialize};

use crate::crypto::address::{system_program_id, token_program_id, Pubkey};

/// System program instruction discriminant for `Transfer` (u32 LE).
const SYSTEM_TRANSFER_TAG: u32 = 2;

/// SPL Token instruction discriminant for `Transfer` (u8).
const TOKEN_TRANSFER_TAG: u8 = 3;

/// An account referenced by an instruction, with its access flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A program invocation: which program, which accounts, what bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Native transfer of `lamports` from `from` to `to`. `from` signs.
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_TAG.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction {
        program_id: system_program_id(),
        accounts: vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    }
}

/// SPL Token transfer of `amount` base units between two token accounts.
///
/// `owner` authorizes the debit of `source` and must sign. Neither token
/// account is created here; if `destination` does not exist the ledger
/// rejects the transaction at execution time.
pub fn token_transfer(
    source: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(TOKEN_TRANSFER_TAG);
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: token_program_id(),
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data,
    }
}

/// The single transfer a request resolves to, before lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferInstruction {
    /// Direct SOL transfer between wallets.
    Native {
        from: Pubkey,
        to: Pubkey,
        lamports: u64,
    },
    /// Token transfer between the derived token accounts of two wallets.
    Token {
        mint: Pubkey,
        source: Pubkey,
        destination: Pubkey,
        owner: Pubkey,
        amount: u64,
    },
}

impl TransferInstruction {
    /// Amount moved, in smallest units.
    pub fn amount(&self) -> u64 {
        match self {
            Self::Native { lamports, .. } => *lamports,
            Self::Token { amount, .. } => *amount,
        }
    }

    pub fn to_instruction(&self) -> Instruction {
        match self {
            Self::Native { from, to, lamports } => system_transfer(from, to, *lamports),
            Self::Token {
                source,
                destination,
                owner,
                amount,
                ..
            } => token_transfer(source, destination, owner, *amount),
        }
    }
}
