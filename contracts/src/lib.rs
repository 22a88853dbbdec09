// Copyright (c) 2026 Aurum Custody Engineering. MIT License.
// See LICENSE for details.

//! # Aurum Reserve Contract Client
//!
//! Read-only access to the `VaultFaucet` contract that publishes the Aurum
//! reserve on chain. The node uses it two ways: as pass-through reads for
//! the `/contract/*` endpoints, and as the live [`aurum_ledger::OunceFeed`]
//! behind vault reserve summaries.
//!
//! - **abi**: Selectors, return-word decoding, fixed-point formatting.
//! - **rpc**: JSON-RPC envelopes and the [`rpc::EthCall`] transport seam.
//! - **vault_faucet**: The contract reader and its snapshot types.
//! - **error**: [`ContractError`].
//!
//! Nothing here signs or submits transactions.

pub mod abi;
pub mod error;
pub mod rpc;
pub mod vault_faucet;

pub use error::ContractError;
pub use rpc::{EthCall, HttpRpcClient};
pub use vault_faucet::{
    CollectedFees, ContractConfig, FeeAccumulator, FeeAmount, TokenAmount, VaultFaucet,
};
