//! # Ledger Addresses
//!
//! A ledger address is 32 raw bytes, written as base58. Most addresses are
//! ed25519 public keys; program-derived addresses (PDAs) are deliberately
//! *off* the curve so that no private key can ever sign for them.
//!
//! This module parses and renders addresses, tells on-curve from off-curve,
//! and derives PDAs, including the associated token account (ATA) that
//! holds an owner's balance of a given mint.
//!
//! ## Derivation
//!
//! ```text
//! candidate = sha256(seed_0 || ... || seed_n || [bump] || program_id || "ProgramDerivedAddress")
//! ```
//!
//! The first bump from 255 downward whose candidate is off curve wins. Same
//! seeds, same program, same address, on every machine, forever. No RPC
//! call is involved; the account at that address may or may not exist yet.

use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{
    ASSOCIATED_TOKEN_PROGRAM_ID, MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER, PUBKEY_LENGTH,
    SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::crypto::hash::sha256_multi;

/// Longest base58 string that can decode to 32 bytes.
const MAX_BASE58_LEN: usize = 44;

/// Errors produced while parsing or deriving addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address is not valid base58")]
    InvalidBase58,

    #[error("address decodes to {0} bytes, expected 32")]
    WrongLength(usize),

    #[error("owner address is off curve and cannot own a token account")]
    OwnerOffCurve,

    #[error("derived address landed on the ed25519 curve")]
    OnCurve,

    #[error("too many seeds or seed longer than 32 bytes")]
    MaxSeedLengthExceeded,

    #[error("no viable bump seed found")]
    NoViableBump,
}

/// Decodes a base58 string into exactly 32 bytes.
pub(crate) fn decode_base58_32(s: &str) -> Result<[u8; PUBKEY_LENGTH], AddressError> {
    if s.is_empty() {
        return Err(AddressError::Empty);
    }
    if s.len() > MAX_BASE58_LEN {
        return Err(AddressError::WrongLength(s.len()));
    }
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|_| AddressError::InvalidBase58)?;
    <[u8; PUBKEY_LENGTH]>::try_from(bytes.as_slice())
        .map_err(|_| AddressError::WrongLength(bytes.len()))
}

/// A 32-byte ledger address.
///
/// Parsing is the only way to get one from untrusted input, and parsing
/// either yields a well-formed address or an [`AddressError`]. There is no
/// "maybe valid" state in between.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pubkey([u8; PUBKEY_LENGTH]);

impl Pubkey {
    pub const fn new(bytes: [u8; PUBKEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; PUBKEY_LENGTH] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_LENGTH] {
        &self.0
    }

    /// Parses a base58 constant. Only for addresses baked into the binary;
    /// a bad constant is a programming error and fails every test.
    pub(crate) fn from_static(s: &'static str) -> Self {
        match decode_base58_32(s) {
            Ok(bytes) => Self(bytes),
            Err(e) => panic!("invalid address constant {s}: {e}"),
        }
    }

    /// Returns `true` if the bytes decompress to a point on the ed25519 curve.
    ///
    /// Wallet addresses are on curve. PDAs (including every ATA) are not.
    pub fn is_on_curve(&self) -> bool {
        CompressedEdwardsY(self.0).decompress().is_some()
    }
}

impl FromStr for Pubkey {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58_32(s).map(Self)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self)
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Well-known programs
// ---------------------------------------------------------------------------

pub fn system_program_id() -> Pubkey {
    Pubkey::from_static(SYSTEM_PROGRAM_ID)
}

pub fn token_program_id() -> Pubkey {
    Pubkey::from_static(TOKEN_PROGRAM_ID)
}

pub fn associated_token_program_id() -> Pubkey {
    Pubkey::from_static(ASSOCIATED_TOKEN_PROGRAM_ID)
}

// ---------------------------------------------------------------------------
// Program-derived addresses
// ---------------------------------------------------------------------------

/// Computes the PDA for an exact seed list (bump included by the caller).
///
/// Fails with [`AddressError::OnCurve`] if the hash happens to be a valid
/// curve point; callers searching for a bump should move on to the next one.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, AddressError> {
    if seeds.len() > MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(AddressError::MaxSeedLengthExceeded);
    }

    let mut parts: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 2);
    parts.extend_from_slice(seeds);
    parts.push(program_id.as_bytes());
    parts.push(PDA_MARKER);

    let candidate = Pubkey(sha256_multi(&parts));
    if candidate.is_on_curve() {
        return Err(AddressError::OnCurve);
    }
    Ok(candidate)
}

/// Finds the canonical PDA: the first bump from 255 down that lands off curve.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), AddressError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(AddressError::MaxSeedLengthExceeded);
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);
        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(AddressError::OnCurve) => {}
            Err(e) => return Err(e),
        }
    }

    Err(AddressError::NoViableBump)
}

/// Derives the associated token account of `owner` for `mint`.
///
/// Owners must be on curve. A PDA owner is legal on the ledger but the
/// wallet SDKs refuse it by default, and a transfer into such an account is
/// almost always a user pasting the wrong address.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey, AddressError> {
    if !owner.is_on_curve() {
        return Err(AddressError::OwnerOffCurve);
    }
    let token_program = token_program_id();
    find_program_address(
        &[owner.as_bytes(), token_program.as_bytes(), mint.as_bytes()],
        &associated_token_program_id(),
    )
    .map(|(address, _bump)| address)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const BONK_MINT: &str = "bonkMLw9Gyn4F3dqwxaHgcqLQxvchiYLfjDjEVXCEMf";

    /// ed25519 public key of the all-ones seed.
    const OWNER: &str = "AKnL4NNf3DGWZJS6cPknBuEGnVsV4A4m5tgebLHaRSZ9";

    fn pk(s: &str) -> Pubkey {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display_roundtrip() {
        let key = pk(OWNER);
        assert_eq!(key.to_string(), OWNER);
    }

    #[test]
    fn system_program_is_all_zero() {
        assert_eq!(system_program_id().to_bytes(), [0u8; 32]);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!("".parse::<Pubkey>(), Err(AddressError::Empty));
    }

    #[test]
    fn rejects_bad_alphabet() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet.
        assert_eq!(
            "0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl".parse::<Pubkey>(),
            Err(AddressError::InvalidBase58)
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            "abc".parse::<Pubkey>(),
            Err(AddressError::WrongLength(_))
        ));
        let too_long = "1".repeat(45);
        assert!(matches!(
            too_long.parse::<Pubkey>(),
            Err(AddressError::WrongLength(45))
        ));
    }

    #[test]
    fn wallet_keys_are_on_curve() {
        assert!(pk(OWNER).is_on_curve());
        assert!(pk(USDC_MINT).is_on_curve());
    }

    #[test]
    fn associated_token_address_known_vectors() {
        assert_eq!(
            associated_token_address(&pk(OWNER), &pk(USDC_MINT))
                .unwrap()
                .to_string(),
            "3wvJdyFnGvaMWpbq93NU91SggiVRveULUXL6iX5VZDGP"
        );
        assert_eq!(
            associated_token_address(&pk(OWNER), &pk(BONK_MINT))
                .unwrap()
                .to_string(),
            "41DKHcwY4uuUoYPzkLcTWFKzxKVU6jk4i5i1ey2spcgJ"
        );
    }

    #[test]
    fn find_program_address_reports_bump() {
        let owner = pk(OWNER);
        let token = token_program_id();
        let mint = pk(BONK_MINT);
        let (address, bump) = find_program_address(
            &[owner.as_bytes(), token.as_bytes(), mint.as_bytes()],
            &associated_token_program_id(),
        )
        .unwrap();
        // 255 and 254 both land on curve for this owner/mint pair.
        assert_eq!(bump, 253);
        let recreated = create_program_address(
            &[owner.as_bytes(), token.as_bytes(), mint.as_bytes(), &[bump]],
            &associated_token_program_id(),
        )
        .unwrap();
        assert_eq!(recreated, address);
    }

    #[test]
    fn derived_addresses_are_off_curve() {
        let ata = associated_token_address(&pk(OWNER), &pk(USDC_MINT)).unwrap();
        assert!(!ata.is_on_curve());
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = associated_token_address(&pk(OWNER), &pk(USDC_MINT)).unwrap();
        let b = associated_token_address(&pk(OWNER), &pk(USDC_MINT)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn off_curve_owner_is_rejected() {
        let pda_owner = associated_token_address(&pk(OWNER), &pk(USDC_MINT)).unwrap();
        assert_eq!(
            associated_token_address(&pda_owner, &pk(USDC_MINT)),
            Err(AddressError::OwnerOffCurve)
        );
    }

    #[test]
    fn seed_limits_are_enforced() {
        let long_seed = [0u8; 33];
        assert_eq!(
            create_program_address(&[&long_seed], &system_program_id()),
            Err(AddressError::MaxSeedLengthExceeded)
        );
    }

    #[test]
    fn serde_uses_base58_string() {
        let key = pk(OWNER);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", OWNER));
        let back: Pubkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<Pubkey>("\"nope\"").is_err());
    }
}
