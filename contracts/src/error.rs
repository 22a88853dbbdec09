//! Error types for contract reads.
//!
//! Every read against the reserve contract that can fail returns a
//! [`ContractError`]. The variants separate "could not talk to the node"
//! from "the node answered with something we cannot use".

use thiserror::Error;

/// Errors that can occur while reading contract state.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The HTTP request to the JSON-RPC endpoint failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Message reported by the node.
        message: String,
    },

    /// The response could not be decoded as the expected ABI type.
    #[error("could not decode result data: {0}")]
    Decode(String),

    /// A configured or returned address is not 20 bytes of hex.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}
