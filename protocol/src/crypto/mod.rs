//! # Cryptographic Primitives
//!
//! Addresses, blockhashes and the SHA-256 plumbing behind program-derived
//! addresses. Note what is *not* here: private keys. The server never holds
//! one, never sees one, and never signs anything. The wallet does that.

pub mod address;
pub mod hash;

pub use address::{
    associated_token_address, create_program_address, find_program_address, AddressError, Pubkey,
};
pub use hash::{sha256_multi, Hash};
