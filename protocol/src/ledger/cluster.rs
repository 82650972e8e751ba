//! Named ledger clusters and their public RPC endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{DEVNET_RPC_URL, MAINNET_RPC_URL, TESTNET_RPC_URL};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cluster: {0:?} (expected mainnet-beta, devnet or testnet)")]
pub struct UnknownCluster(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    /// Mainnet — the real deal. Mistakes here cost real money.
    MainnetBeta,
    Devnet,
    Testnet,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
        }
    }

    /// Public RPC endpoint operated for the cluster. Rate limited; fine for
    /// a blockhash per request, not for heavy traffic.
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Self::MainnetBeta => MAINNET_RPC_URL,
            Self::Devnet => DEVNET_RPC_URL,
            Self::Testnet => TESTNET_RPC_URL,
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = UnknownCluster;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            _ => Err(UnknownCluster(s.to_string())),
        }
    }
}
