// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # BlinkPay Protocol: Core Library
//!
//! Turns "send 10 USDC to this address" into a transaction a wallet can sign,
//! and nothing more. No keys are held, nothing is broadcast, nothing is
//! remembered between requests. The server's whole job is to be correct
//! about bytes.
//!
//! ## Architecture
//!
//! - **action**: Solana Actions wire types and the transfer action's
//!   discovery document.
//! - **crypto**: Addresses, hashes, and program-derived address search.
//! - **transaction**: Amounts, instructions, message encoding, and the
//!   [`transaction::TransferBuilder`] that ties them together.
//! - **ledger**: The one question we ask the network (latest blockhash),
//!   behind a trait so tests never need a network.
//! - **config**: Program ids, protocol headers, defaults.
//!
//! ## Design Philosophy
//!
//! 1. Validate everything before touching the network.
//! 2. Integers for money. Always.
//! 3. The wire format is hand-written and tested against known vectors,
//!    because a wrong byte here costs someone real tokens.

pub mod action;
pub mod config;
pub mod crypto;
pub mod ledger;
pub mod transaction;
