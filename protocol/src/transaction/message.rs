//! Legacy message compilation and the ledger's compact wire format.
//!
//! A message is what the wallet signs. It lists every account the
//! instructions touch exactly once, ordered so the header can describe
//! signer/writable status with three counters instead of per-key flags:
//!
//! ```text
//! [ writable signers | readonly signers | writable non-signers | readonly non-signers ]
//!   ^ fee payer always first
//! ```
//!
//! Lengths are "shortvec" encoded: 7 bits per byte, high bit means more.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{HASH_LENGTH, PUBKEY_LENGTH};
use crate::crypto::address::Pubkey;
use crate::crypto::hash::Hash;
use crate::transaction::instruction::Instruction;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("message references {0} accounts, at most 256 fit in u8 indices")]
    TooManyAccounts(usize),

    #[error("length {0} does not fit a compact u16")]
    LengthOverflow(usize),
}

/// Appends `len` as a compact u16 (1 to 3 bytes).
pub fn encode_shortvec_len(buf: &mut Vec<u8>, len: usize) -> Result<(), MessageError> {
    let mut rem = u16::try_from(len).map_err(|_| MessageError::LengthOverflow(len))?;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            buf.push(byte);
            return Ok(());
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Decodes a compact u16 from the start of `bytes`. Returns `(value, bytes_read)`.
pub fn decode_shortvec_len(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut value: usize = 0;
    for (i, byte) in bytes.iter().take(3).enumerate() {
        value |= ((byte & 0x7f) as usize) << (7 * i);
        if byte & 0x80 == 0 {
            return (value <= u16::MAX as usize).then_some((value, i + 1));
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with its program and accounts replaced by key indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// A compiled, unsigned legacy message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Clone, Copy)]
struct KeyFlags {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

impl Message {
    /// Compiles `instructions` with `payer` as the fee payer.
    ///
    /// Keys are deduplicated with their flags OR-ed together, so a payer that
    /// is also the transfer source appears once, as a writable signer.
    pub fn compile(
        payer: &Pubkey,
        instructions: &[Instruction],
        recent_blockhash: Hash,
    ) -> Result<Self, MessageError> {
        let mut keys: Vec<KeyFlags> = vec![KeyFlags {
            pubkey: *payer,
            is_signer: true,
            is_writable: true,
        }];

        let mut upsert = |pubkey: Pubkey, is_signer: bool, is_writable: bool| {
            match keys.iter_mut().find(|k| k.pubkey == pubkey) {
                Some(existing) => {
                    existing.is_signer |= is_signer;
                    existing.is_writable |= is_writable;
                }
                None => keys.push(KeyFlags {
                    pubkey,
                    is_signer,
                    is_writable,
                }),
            }
        };

        for ix in instructions {
            upsert(ix.program_id, false, false);
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
        }

        let bucket = |signer: bool, writable: bool| {
            keys.iter()
                .filter(move |k| k.is_signer == signer && k.is_writable == writable)
                .map(|k| k.pubkey)
        };
        let writable_signers: Vec<Pubkey> = bucket(true, true).collect();
        let readonly_signers: Vec<Pubkey> = bucket(true, false).collect();
        let writable_unsigned: Vec<Pubkey> = bucket(false, true).collect();
        let readonly_unsigned: Vec<Pubkey> = bucket(false, false).collect();

        let total = keys.len();
        if total > 256 {
            return Err(MessageError::TooManyAccounts(total));
        }

        let header = MessageHeader {
            num_required_signatures: (writable_signers.len() + readonly_signers.len()) as u8,
            num_readonly_signed_accounts: readonly_signers.len() as u8,
            num_readonly_unsigned_accounts: readonly_unsigned.len() as u8,
        };

        let account_keys: Vec<Pubkey> = writable_signers
            .into_iter()
            .chain(readonly_signers)
            .chain(writable_unsigned)
            .chain(readonly_unsigned)
            .collect();

        let index_of = |pubkey: &Pubkey| -> u8 {
            // Every key was inserted above and total <= 256.
            account_keys
                .iter()
                .position(|k| k == pubkey)
                .unwrap_or_default() as u8
        };

        let instructions: Vec<CompiledInstruction> = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|m| index_of(&m.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    /// The fee payer: always the first key.
    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }


    /// Serializes the message bytes the wallet signs.
    pub fn serialize(&self) -> Result<Vec<u8>, MessageError> {
        let mut buf = Vec::with_capacity(
            3 + 1 + self.account_keys.len() * PUBKEY_LENGTH + HASH_LENGTH + 64,
        );
        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        encode_shortvec_len(&mut buf, self.account_keys.len())?;
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(self.recent_blockhash.as_bytes());

        encode_shortvec_len(&mut buf, self.instructions.len())?;
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            encode_shortvec_len(&mut buf, ix.accounts.len())?;
            buf.extend_from_slice(&ix.accounts);
            encode_shortvec_len(&mut buf, ix.data.len())?;
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
