//! Integration tests for the VaultFaucet reader.
//!
//! The reader is driven through an in-memory [`EthCall`] that answers by
//! function selector, so every test runs offline.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aurum_contracts::abi::{self, Uint256};
use aurum_contracts::{ContractError, EthCall, VaultFaucet};
use aurum_ledger::config::DEFAULT_CONTRACT_ADDRESS;
use aurum_ledger::OunceFeed;

/// Canned chain: selector → return bytes. Unknown selectors revert.
#[derive(Default)]
struct MockChain {
    responses: Mutex<HashMap<[u8; 4], Vec<u8>>>,
    calls: AtomicUsize,
    seen_targets: Mutex<Vec<String>>,
}

impl MockChain {
    fn with_uint(self, signature: &str, value: u128) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(abi::selector(signature), Uint256::from(value).to_be_bytes().to_vec());
        self
    }

    fn with_raw(self, signature: &str, bytes: Vec<u8>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(abi::selector(signature), bytes);
        self
    }
}

#[async_trait]
impl EthCall for MockChain {
    async fn eth_call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, ContractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_targets.lock().unwrap().push(to.to_string());

        let selector: [u8; 4] = data.try_into().expect("zero-arg calls are 4 bytes");
        self.responses
            .lock()
            .unwrap()
            .get(&selector)
            .cloned()
            .ok_or(ContractError::Rpc {
                code: 3,
                message: "execution reverted".into(),
            })
    }
}

fn reader(chain: MockChain) -> (VaultFaucet, Arc<MockChain>) {
    let chain = Arc::new(chain);
    let faucet = VaultFaucet::new(chain.clone(), DEFAULT_CONTRACT_ADDRESS).unwrap();
    (faucet, chain)
}

const ONE: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Single Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vault_ounces_is_formatted_with_18_decimals() {
    let (faucet, chain) = reader(MockChain::default().with_uint("vaultOunces()", 1_234 * ONE + ONE / 2));

    let oz = faucet.vault_ounces().await.unwrap();
    assert_eq!(oz.raw, "1234500000000000000000");
    assert_eq!(oz.formatted, "1234.5");
    assert_eq!(oz.decimals, 18);

    assert_eq!(chain.calls.load(Ordering::SeqCst), 1);
    assert_eq!(chain.seen_targets.lock().unwrap()[0], DEFAULT_CONTRACT_ADDRESS);
}

#[tokio::test]
async fn current_rate_reads_its_own_function() {
    let (faucet, _) = reader(
        MockChain::default()
            .with_uint("vaultOunces()", 5 * ONE)
            .with_uint("currentRate()", ONE / 100),
    );

    let rate = faucet.current_rate().await.unwrap();
    assert_eq!(rate.formatted, "0.01");
}

#[tokio::test]
async fn fee_accumulator_returns_checksummed_address() {
    let addr = abi::parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
    let mut word = vec![0u8; 32];
    word[12..].copy_from_slice(&addr);

    let (faucet, _) = reader(MockChain::default().with_raw("feeAccumulator()", word));
    let acc = faucet.fee_accumulator().await.unwrap();
    assert_eq!(acc.address, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
}

#[tokio::test]
async fn empty_return_data_is_a_decode_error() {
    // What a node returns for a call to an address with no code.
    let (faucet, _) = reader(MockChain::default().with_raw("vaultOunces()", vec![]));
    assert!(matches!(
        faucet.vault_ounces().await,
        Err(ContractError::Decode(_))
    ));
}

#[tokio::test]
async fn revert_propagates_as_rpc_error() {
    let (faucet, _) = reader(MockChain::default());
    let err = faucet.current_rate().await.unwrap_err();
    assert!(err.to_string().contains("execution reverted"));
}

// ---------------------------------------------------------------------------
// Collected Fees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collected_fees_reads_all_three_counters() {
    let (faucet, chain) = reader(
        MockChain::default()
            .with_uint("feeCollected()", 3 * ONE)
            .with_uint("mintFeesCollected()", ONE)
            .with_uint("custodyFeesCollected()", 2 * ONE),
    );

    let fees = faucet.collected_fees().await.unwrap();
    assert_eq!(fees.fee_collected.formatted, "3.0");
    assert_eq!(fees.mint_fees_collected.formatted, "1.0");
    assert_eq!(fees.custody_fees_collected.raw, "2000000000000000000");
    assert_eq!(chain.calls.load(Ordering::SeqCst), 3);

    let json = serde_json::to_value(&fees).unwrap();
    assert!(json.get("feeCollected").is_some());
    assert!(json.get("mintFeesCollected").is_some());
    assert!(json.get("custodyFeesCollected").is_some());
    assert!(json["feeCollected"].get("decimals").is_none());
}

#[tokio::test]
async fn collected_fees_fails_if_any_counter_fails() {
    let (faucet, _) = reader(
        MockChain::default()
            .with_uint("feeCollected()", ONE)
            .with_uint("custodyFeesCollected()", ONE),
    );
    assert!(faucet.collected_fees().await.is_err());
}

// ---------------------------------------------------------------------------
// Ounce Feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reader_feeds_formatted_ounces() {
    let (faucet, _) = reader(MockChain::default().with_uint("vaultOunces()", 42 * ONE));
    assert_eq!(faucet.total_ounces().await.unwrap(), "42.0");
}

#[tokio::test]
async fn feed_error_carries_contract_message() {
    let (faucet, _) = reader(MockChain::default());
    let err = faucet.total_ounces().await.unwrap_err();
    assert!(format!("{err:#}").contains("execution reverted"));
}
