//! The unsigned transaction envelope handed to the wallet.
//!
//! On the wire a transaction is `shortvec(n) || n * 64-byte signatures ||
//! message`. We emit one zeroed slot per required signer; the wallet fills
//! in its slot after signing the message bytes. The server keeps nothing.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::SIGNATURE_LENGTH;
use crate::crypto::address::Pubkey;
use crate::crypto::hash::Hash;
use crate::transaction::instruction::Instruction;
use crate::transaction::message::{encode_shortvec_len, Message, MessageError};

/// A fully specified transaction with empty signature slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<[u8; SIGNATURE_LENGTH]>,
    pub message: Message,
}

impl Transaction {
    /// Compiles the instructions into a message and reserves signature slots.
    pub fn new_unsigned(
        fee_payer: &Pubkey,
        instructions: &[Instruction],
        recent_blockhash: Hash,
    ) -> Result<Self, MessageError> {
        let message = Message::compile(fee_payer, instructions, recent_blockhash)?;
        let slots = message.header.num_required_signatures as usize;
        Ok(Self {
            signatures: vec![[0u8; SIGNATURE_LENGTH]; slots],
            message,
        })
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.message.fee_payer()
    }

    /// The bytes a signer signs.
    pub fn message_bytes(&self) -> Result<Vec<u8>, MessageError> {
        self.message.serialize()
    }

    /// Full wire serialization, signatures included (zeroed or not).
    pub fn serialize(&self) -> Result<Vec<u8>, MessageError> {
        let message = self.message.serialize()?;
        let mut buf = Vec::with_capacity(3 + self.signatures.len() * SIGNATURE_LENGTH + message.len());
        encode_shortvec_len(&mut buf, self.signatures.len())?;
        for sig in &self.signatures {
            buf.extend_from_slice(sig);
        }
        buf.extend_from_slice(&message);
        Ok(buf)
    }

    /// Base64 of [`Transaction::serialize`], the form Actions clients expect.
    pub fn to_base64(&self) -> Result<String, MessageError> {
        Ok(STANDARD.encode(self.serialize()?))
    }
}
