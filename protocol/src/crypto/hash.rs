//! # Hashing Utilities
//!
//! SHA-256 is the only hash function the ledger asks of us: program-derived
//! addresses are SHA-256 preimages, full stop. Blockhashes are opaque 32-byte
//! values we receive from the RPC node and echo back into the message; we
//! never compute one ourselves.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::config::HASH_LENGTH;
use crate::crypto::address::AddressError;

/// Hash multiple byte slices together without concatenation overhead.
///
/// Equivalent to `sha256(parts[0] || parts[1] || ...)`. Used for PDA
/// derivation, where the preimage is seeds, bump, program id and marker.
///
/// # Example
///
/// ```
/// use blinkpay_protocol::crypto::hash::sha256_multi;
///
/// let a = sha256_multi(&[b"block", b"hash"]);
/// let b = sha256_multi(&[b"blockhash"]);
/// assert_eq!(a, b);
/// ```
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// A recent blockhash, the ledger's recency anchor for a transaction.
///
/// Text form is base58, same as addresses. Blockhashes expire after roughly
/// 150 slots, so a `Hash` should never outlive the request that fetched it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; HASH_LENGTH] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }
}

impl FromStr for Hash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::crypto::address::decode_base58_32(s).map(Self)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
