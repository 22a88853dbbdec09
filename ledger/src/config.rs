//! # Ledger Configuration & Constants
//!
//! Every number the ledger multiplies or divides by lives here. Two of them
//! look like they describe the same conversion and do not agree with each
//! other; both are load-bearing for API compatibility, see
//! [`FALLBACK_OZ_PER_GRAM`].

use std::ops::RangeInclusive;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Grams per troy ounce. The precious-metals standard, exact by definition.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1034768;

/// Ounces per gram used by the synthetic reserve path.
///
/// This is the *avoirdupois* factor (1 / 28.3495), not the troy one, so
/// synthetic figures are about 9.7% heavier in ounces than live figures for
/// the same grams. Existing clients compare against it; do not "fix" it.
pub const FALLBACK_OZ_PER_GRAM: f64 = 0.035274;

/// Decimal places for gram totals in responses.
pub const GRAMS_DECIMALS: u32 = 2;

/// Decimal places for ounce totals in responses.
pub const OUNCES_DECIMALS: u32 = 4;

// ---------------------------------------------------------------------------
// Reserve Contract Defaults
// ---------------------------------------------------------------------------

/// Fixed-point precision of every uint256 the reserve contract exposes.
pub const CONTRACT_DECIMALS: u32 = 18;

/// Deployed `VaultFaucet` contract on Sepolia.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x5313BC6Fca048258aedA94C05b68C17A376Ab555";

/// Sepolia chain id.
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Human-readable name reported by `/contract/info`.
pub const DEFAULT_CHAIN_NAME: &str = "Sepolia Testnet";

/// Public demo endpoint. Rate limited; point `--rpc-url` at a real provider
/// for anything beyond local development.
pub const DEFAULT_RPC_URL: &str = "https://eth-sepolia.g.alchemy.com/v2/demo";

// ---------------------------------------------------------------------------
// Placeholder Ranges
// ---------------------------------------------------------------------------

/// Range for the reserve `total_bars` placeholder. The contract has no bar
/// count, so this is always synthetic, even on the live path.
pub const PLACEHOLDER_BAR_COUNT: RangeInclusive<u32> = 1..=100;

/// Range for synthetic reserve grams when the contract is unreachable.
pub const FALLBACK_GRAMS: RangeInclusive<u32> = 1_000..=100_999;

/// Message attached to synthetic reserve responses.
pub const FALLBACK_MESSAGE: &str = "Using fallback calculation - contract unavailable";

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Converts grams to troy ounces.
pub fn grams_to_troy_ounces(grams: f64) -> f64 {
    grams / GRAMS_PER_TROY_OUNCE
}

/// Converts troy ounces to grams.
pub fn troy_ounces_to_grams(ounces: f64) -> f64 {
    ounces * GRAMS_PER_TROY_OUNCE
}

/// Rounds to `places` decimals the way a fixed-point display would.
///
/// The exact decimal expansion of `value` is rounded, not the binary product
/// `value * 10^places`, so `0.015` (stored as 0.01499...) becomes 0.01 while
/// a true tie such as `0.125` goes away from zero to 0.13.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // 1074 fractional digits hold every finite f64 exactly.
    let exact = format!("{:.1074}", value.abs());
    let Some((int_part, frac_part)) = exact.split_once('.') else {
        return value;
    };
    let places = places as usize;
    if places >= frac_part.len() {
        return value;
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part[..places].bytes())
        .collect();
    if frac_part.as_bytes()[places] >= b'5' {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - places;
    let mut text: String = digits.iter().map(|&d| char::from(d)).collect();
    text.insert(split, '.');
    text.parse::<f64>()
        .map_or(value, |rounded| rounded.copysign(value))
}
