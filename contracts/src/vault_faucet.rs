//! # VaultFaucet Reader
//!
//! Read-only view of the `VaultFaucet` reserve contract. Six zero-argument
//! view functions are exposed through four reads:
//!
//! | Read              | Contract function(s)                                          |
//! |-------------------|---------------------------------------------------------------|
//! | `vault_ounces`    | `vaultOunces() → uint256`                                     |
//! | `current_rate`    | `currentRate() → uint256`                                     |
//! | `fee_accumulator` | `feeAccumulator() → address`                                  |
//! | `collected_fees`  | `feeCollected()`, `mintFeesCollected()`, `custodyFeesCollected()` |
//!
//! Every read goes to the node; nothing is cached. The three fee counters
//! are fetched concurrently and the read fails as soon as any one fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use aurum_ledger::config::{
    CONTRACT_DECIMALS, DEFAULT_CHAIN_ID, DEFAULT_CHAIN_NAME, DEFAULT_CONTRACT_ADDRESS,
    DEFAULT_RPC_URL,
};
use aurum_ledger::OunceFeed;

use crate::abi::{self, Uint256};
use crate::error::ContractError;
use crate::rpc::EthCall;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where the reserve contract lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractConfig {
    /// Deployed contract address.
    pub contract_address: String,
    /// EVM chain id.
    pub chain_id: u64,
    /// Display name of the chain.
    pub chain_name: String,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            chain_name: DEFAULT_CHAIN_NAME.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A fixed-point contract value with its precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Integer value as decimal digits.
    pub raw: String,
    /// `raw` scaled down by `decimals`.
    pub formatted: String,
    pub decimals: u32,
}

impl TokenAmount {
    fn from_uint(value: Uint256) -> Self {
        Self {
            raw: value.to_decimal_string(),
            formatted: value.format_units(CONTRACT_DECIMALS),
            decimals: CONTRACT_DECIMALS,
        }
    }
}

/// One fee counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAmount {
    pub raw: String,
    pub formatted: String,
}

impl FeeAmount {
    fn from_uint(value: Uint256) -> Self {
        Self {
            raw: value.to_decimal_string(),
            formatted: value.format_units(CONTRACT_DECIMALS),
        }
    }
}

/// Address that receives protocol fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAccumulator {
    /// EIP-55 checksummed.
    pub address: String,
}

/// All fee counters, read together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedFees {
    pub fee_collected: FeeAmount,
    pub mint_fees_collected: FeeAmount,
    pub custody_fees_collected: FeeAmount,
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Reads `VaultFaucet` state through an [`EthCall`] transport.
#[derive(Clone)]
pub struct VaultFaucet {
    client: Arc<dyn EthCall>,
    address: String,
}

impl VaultFaucet {
    /// Binds a reader to `address`. Fails if the address is not 20 bytes of
    /// `0x`-prefixed hex.
    pub fn new(client: Arc<dyn EthCall>, address: &str) -> Result<Self, ContractError> {
        let bytes = abi::parse_address(address)?;
        Ok(Self {
            client,
            address: abi::to_checksum_address(&bytes),
        })
    }

    /// Checksummed contract address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Total troy ounces backing the vault token.
    pub async fn vault_ounces(&self) -> Result<TokenAmount, ContractError> {
        self.read_uint("vaultOunces").await.map(TokenAmount::from_uint)
    }

    /// Current redemption rate.
    pub async fn current_rate(&self) -> Result<TokenAmount, ContractError> {
        self.read_uint("currentRate").await.map(TokenAmount::from_uint)
    }

    pub async fn fee_accumulator(&self) -> Result<FeeAccumulator, ContractError> {
        let output = self.call("feeAccumulator").await?;
        let address = abi::decode_address(&output).map_err(|e| {
            tracing::warn!(method = "feeAccumulator", error = %e, "failed to decode contract result");
            e
        })?;
        Ok(FeeAccumulator { address })
    }

    /// Reads the three fee counters concurrently; all or nothing.
    pub async fn collected_fees(&self) -> Result<CollectedFees, ContractError> {
        let (fee, mint, custody) = futures::try_join!(
            self.read_uint("feeCollected"),
            self.read_uint("mintFeesCollected"),
            self.read_uint("custodyFeesCollected"),
        )?;

        Ok(CollectedFees {
            fee_collected: FeeAmount::from_uint(fee),
            mint_fees_collected: FeeAmount::from_uint(mint),
            custody_fees_collected: FeeAmount::from_uint(custody),
        })
    }

    async fn read_uint(&self, method: &'static str) -> Result<Uint256, ContractError> {
        let output = self.call(method).await?;
        Uint256::decode(&output).map_err(|e| {
            tracing::warn!(method, error = %e, "failed to decode contract result");
            e
        })
    }

    async fn call(&self, method: &'static str) -> Result<Vec<u8>, ContractError> {
        let calldata = abi::selector(&format!("{method}()"));
        tracing::debug!(method, contract = %self.address, "eth_call");

        self.client
            .eth_call(&self.address, &calldata)
            .await
            .map_err(|e| {
                tracing::warn!(method, error = %e, "error reading from contract");
                e
            })
    }
}

#[async_trait]
impl OunceFeed for VaultFaucet {
    async fn total_ounces(&self) -> anyhow::Result<String> {
        Ok(self.vault_ounces().await?.formatted)
    }
}
