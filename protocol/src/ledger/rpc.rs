//! # JSON-RPC Wire Types
//!
//! Request/response shapes for the slice of the Solana JSON-RPC API this
//! service talks to. The HTTP transport lives in [`super::client`]; this
//! module is pure serde so it can be tested without a network.
//!
//! | Method               | Used for                                  |
//! |----------------------|-------------------------------------------|
//! | `getLatestBlockhash` | Recency anchor + expiry for new messages  |

use serde::{Deserialize, Serialize};

use crate::crypto::hash::Hash;

/// Supported JSON-RPC methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcMethod {
    /// Parameters: `[{ "commitment": <level> }]`
    #[serde(rename = "getLatestBlockhash")]
    GetLatestBlockhash,
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version. Always "2.0".
    pub jsonrpc: String,
    pub id: u64,
    pub method: RpcMethod,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: RpcMethod, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params,
        }
    }

    /// `getLatestBlockhash` at the given commitment level.
    pub fn latest_blockhash(id: u64, commitment: &str) -> Self {
        Self::new(
            id,
            RpcMethod::GetLatestBlockhash,
            serde_json::json!([{ "commitment": commitment }]),
        )
    }
}

/// A JSON-RPC 2.0 response. Exactly one of `result` or `error` is set by a
/// conforming node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub jsonrpc: String,
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC 2.0 error object as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Slot context wrapper the node puts around most results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcContext {
    pub slot: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithContext<T> {
    pub context: RpcContext,
    pub value: T,
}

/// `getLatestBlockhash` result value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}
