//! Core value types for transfers: which currency, and how much of it.
//!
//! Amounts arrive as human decimal strings ("1.5") and leave as integer
//! smallest units (1_500_000_000 lamports). The conversion is done in
//! integer arithmetic on the digit string. No floating point anywhere near
//! money.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::LAMPORTS_PER_SOL;
use crate::crypto::address::Pubkey;

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Symbol was not one of the currencies this action transfers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown currency symbol: {0:?}")]
pub struct UnknownCurrency(pub String);

/// The closed set of transferable currencies.
///
/// Adding a variant forces every `match` below to handle it, which is the
/// point: there is no map lookup that can quietly miss and fall back to some
/// other asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Native SOL (smallest unit: lamport, 10^-9).
    Sol,
    /// USD Coin (10^-6).
    Usdc,
    /// Bonk (10^-5).
    Bonk,
    /// Send (10^-6).
    Send,
}

impl Currency {
    /// Every currency, in the order the action form lists them.
    pub const ALL: [Currency; 4] = [Currency::Sol, Currency::Usdc, Currency::Send, Currency::Bonk];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Sol => "SOL",
            Self::Usdc => "USDC",
            Self::Bonk => "BONK",
            Self::Send => "SEND",
        }
    }

    /// Number of decimal places between the display unit and the smallest unit.
    pub fn decimals(&self) -> u8 {
        match self {
            Self::Sol => 9,
            Self::Usdc => 6,
            Self::Bonk => 5,
            Self::Send => 6,
        }
    }

    /// Smallest units per display unit, i.e. `10^decimals`.
    pub fn divisor(&self) -> u64 {
        match self {
            Self::Sol => LAMPORTS_PER_SOL,
            other => 10u64.pow(other.decimals() as u32),
        }
    }

    /// Mint address for SPL tokens; `None` for native SOL.
    pub fn mint(&self) -> Option<Pubkey> {
        match self {
            Self::Sol => None,
            Self::Usdc => Some(Pubkey::from_static(
                "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            )),
            Self::Bonk => Some(Pubkey::from_static(
                "bonkMLw9Gyn4F3dqwxaHgcqLQxvchiYLfjDjEVXCEMf",
            )),
            Self::Send => Some(Pubkey::from_static(
                "CZWADf5pH1J9SdASXjTN2dBhD9GjuVscbz1htojexto8",
            )),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Sol)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    /// Case-insensitive: "sol", "Sol" and "SOL" are the same currency.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// TokenAmount
// ---------------------------------------------------------------------------

/// Reasons a decimal amount string cannot become a transfer amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a decimal number: {0:?}")]
    Malformed(String),

    #[error("amount must be positive")]
    NotPositive,

    #[error("amount is too small for {currency}: rounds to zero at {decimals} decimals")]
    BelowPrecision { currency: Currency, decimals: u8 },

    #[error("amount does not fit in 64 bits of smallest units")]
    Overflow,
}

/// An amount in the smallest indivisible unit of `currency`.
///
/// Constructed through [`TokenAmount::parse`], which guarantees `raw > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Value in smallest units (lamports for SOL, base units for tokens).
    pub raw: u64,
    pub currency: Currency,
}

impl TokenAmount {
    /// Normalizes a human-entered decimal string into smallest units.
    ///
    /// Accepts `[+]digits[.digits]` (either side of the point may be empty,
    /// but not both). Digits past the currency's precision are rounded half
    /// up. Negative, zero, and values that round to zero are rejected, as
    /// are `NaN`, `Infinity` and exponent notation.
    pub fn parse(input: &str, currency: Currency) -> Result<Self, AmountError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if s.starts_with('-') {
            // Still reject garbage like "-x" as malformed rather than negative.
            return if is_decimal(&s[1..]) {
                Err(AmountError::NotPositive)
            } else {
                Err(AmountError::Malformed(input.to_string()))
            };
        }
        let s = s.strip_prefix('+').unwrap_or(s);
        if !is_decimal(s) {
            return Err(AmountError::Malformed(input.to_string()));
        }

        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        let decimals = currency.decimals() as usize;
        let (kept, dropped) = if frac.len() > decimals {
            frac.split_at(decimals)
        } else {
            (frac, "")
        };

        let mut raw: u64 = 0;
        for digit in whole.bytes().chain(kept.bytes()) {
            raw = raw
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit - b'0')))
                .ok_or(AmountError::Overflow)?;
        }
        // Pad the fraction out to full precision.
        for _ in kept.len()..decimals {
            raw = raw.checked_mul(10).ok_or(AmountError::Overflow)?;
        }
        if dropped.bytes().next().is_some_and(|d| d >= b'5') {
            raw = raw.checked_add(1).ok_or(AmountError::Overflow)?;
        }

        if raw == 0 {
            let all_zero = whole.bytes().chain(frac.bytes()).all(|d| d == b'0');
            return Err(if all_zero {
                AmountError::NotPositive
            } else {
                AmountError::BelowPrecision {
                    currency,
                    decimals: currency.decimals(),
                }
            });
        }

        Ok(Self { raw, currency })
    }

    /// Decimal rendering without the symbol, trailing zeros trimmed.
    ///
    /// `1_500_000_000` lamports renders as `"1.5"`, `2 SOL` as `"2"`.
    pub fn display_decimal(&self) -> String {
        let divisor = self.currency.divisor();
        let whole = self.raw / divisor;
        let frac = self.raw % divisor;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac, width = self.currency.decimals() as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_decimal(), self.currency)
    }
}

fn is_decimal(s: &str) -> bool {
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    !(whole.is_empty() && frac.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
