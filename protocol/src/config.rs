//! # Protocol Configuration & Constants
//!
//! Every magic number in blinkpay lives here. If you're hardcoding a program
//! id or a default somewhere else, you're doing it wrong and you owe the
//! team coffee.
//!
//! Program ids and mint addresses are ledger facts, not tunables. Changing
//! them means talking to a different program, which is somewhere between
//! "broken" and "someone else's money".

use std::time::Duration;

// ---------------------------------------------------------------------------
// Ledger Units
// ---------------------------------------------------------------------------

/// Lamports per SOL. SOL has 9 decimals; the lamport is the indivisible unit.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Length of a ledger address in raw bytes.
pub const PUBKEY_LENGTH: usize = 32;

/// Length of a blockhash in raw bytes.
pub const HASH_LENGTH: usize = 32;

/// Length of an ed25519 signature slot in a serialized transaction.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Program Identifiers
// ---------------------------------------------------------------------------

/// The System program. Owns native SOL transfers. All-zero bytes, which
/// base58-encodes as 32 ones.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// The SPL Token program (the original one, not Token-2022).
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// The Associated Token Account program. ATAs are derived under this id.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Domain separator appended to every program-derived address preimage.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds in a program-derived address.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single PDA seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Action Surface
// ---------------------------------------------------------------------------

/// Path the transfer action is served under.
pub const ACTION_PATH: &str = "/api/actions/transfer-multi-token";

/// Path of the icon, resolved against the request origin.
pub const ICON_PATH: &str = "/logo.png";

/// Solana Actions protocol version advertised in `X-Action-Version`.
pub const ACTION_VERSION: &str = "2.1.3";

/// CAIP-2 id for Solana mainnet, advertised in `X-Blockchain-Ids`.
pub const MAINNET_BLOCKCHAIN_ID: &str = "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp";

/// Token symbol used when the `token` query parameter is absent.
pub const DEFAULT_TOKEN: &str = "SOL";

/// Amount used when the `amount` query parameter is absent.
pub const DEFAULT_AMOUNT: &str = "1";

/// Cluster used when the `cluster` query parameter is absent.
pub const DEFAULT_CLUSTER: &str = "devnet";

// ---------------------------------------------------------------------------
// Ledger Client
// ---------------------------------------------------------------------------

/// Upper bound on a single checkpoint fetch. A hung RPC node would otherwise
/// hang the request with it.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Commitment level requested for `getLatestBlockhash`.
pub const RPC_COMMITMENT: &str = "confirmed";

pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const TESTNET_RPC_URL: &str = "https://api.testnet.solana.com";
