//! # Reserve Aggregation
//!
//! Produces the reserve summary for a vault. The authoritative figure is the
//! ounce total published by the on-chain reserve contract; when that read
//! fails, the summary is synthesised instead and flagged as such. Both
//! outcomes are ordinary values of [`Reserve`], so callers branch on data
//! rather than on errors.
//!
//! ```text
//!             ┌─────────────┐  Ok(oz)   ┌──────────────────────┐
//! vault_id ──▶│  OunceFeed  │──────────▶│ Reserve::Live        │
//!             └─────────────┘           └──────────────────────┘
//!                    │ Err(e)           ┌──────────────────────┐
//!                    └─────────────────▶│ Reserve::Synthetic   │
//!                                       └──────────────────────┘
//! ```
//!
//! The contract does not publish a bar count, so `total_bars` is a random
//! placeholder on both branches. Randomness comes from an injected
//! [`StdRng`]; seed it to make the placeholders reproducible.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::config::{
    round_to, troy_ounces_to_grams, FALLBACK_GRAMS, FALLBACK_MESSAGE, FALLBACK_OZ_PER_GRAM,
    GRAMS_DECIMALS, OUNCES_DECIMALS, PLACEHOLDER_BAR_COUNT,
};
use crate::dataset::BarDataset;
use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// Source of the live reserve figure.
#[async_trait]
pub trait OunceFeed: Send + Sync {
    /// Total troy ounces in reserve, as a decimal string.
    async fn total_ounces(&self) -> anyhow::Result<String>;
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rounded reserve numbers for one vault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveFigures {
    pub total_bars: u32,
    pub total_weight_grams: f64,
    pub total_weight_oz: f64,
}

/// Where a reserve summary came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Reserve {
    /// Ounces read from the contract.
    Live(ReserveFigures),
    /// Contract unavailable; figures are placeholders.
    Synthetic {
        figures: ReserveFigures,
        /// Why the live read failed.
        reason: String,
    },
}

impl Reserve {
    pub fn figures(&self) -> &ReserveFigures {
        match self {
            Reserve::Live(figures) => figures,
            Reserve::Synthetic { figures, .. } => figures,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Reserve::Live(_))
    }
}

/// Reserve summary for a vault.
///
/// Serializes to the flat shape the API returns: the three figures,
/// `contract_source`, and on the synthetic branch an `error` message.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultReserve {
    pub vault_id: String,
    pub reserve: Reserve,
}

#[derive(Serialize)]
struct VaultReserveWire<'a> {
    vault_id: &'a str,
    total_bars: u32,
    total_weight_grams: f64,
    total_weight_oz: f64,
    contract_source: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

impl Serialize for VaultReserve {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let figures = self.reserve.figures();
        VaultReserveWire {
            vault_id: &self.vault_id,
            total_bars: figures.total_bars,
            total_weight_grams: figures.total_weight_grams,
            total_weight_oz: figures.total_weight_oz,
            contract_source: self.reserve.is_live(),
            error: (!self.reserve.is_live()).then_some(FALLBACK_MESSAGE),
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Builds reserve summaries against a fixed dataset.
pub struct ReserveAggregator {
    dataset: Arc<BarDataset>,
    rng: Mutex<StdRng>,
}

impl ReserveAggregator {
    pub fn new(dataset: Arc<BarDataset>, rng: StdRng) -> Self {
        Self {
            dataset,
            rng: Mutex::new(rng),
        }
    }

    /// Placeholders seeded from OS entropy.
    pub fn from_entropy(dataset: Arc<BarDataset>) -> Self {
        Self::new(dataset, StdRng::from_entropy())
    }

    /// Reproducible placeholders.
    pub fn with_seed(dataset: Arc<BarDataset>, seed: u64) -> Self {
        Self::new(dataset, StdRng::seed_from_u64(seed))
    }

    /// Summarises the reserve of `vault_id`.
    ///
    /// Fails only for an unknown vault, and does so before touching the
    /// feed. Any feed failure, including an unparseable ounce figure, lands
    /// on the synthetic branch. There is no retry.
    pub async fn vault_reserve(
        &self,
        vault_id: &str,
        feed: &dyn OunceFeed,
    ) -> Result<VaultReserve, LedgerError> {
        self.dataset.require_vault(vault_id)?;

        let reserve = match feed.total_ounces().await.and_then(|raw| parse_ounces(&raw)) {
            Ok(ounces) => Reserve::Live(self.live_figures(ounces)),
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(vault_id, reason = %reason, "reserve feed unavailable, using fallback");
                Reserve::Synthetic {
                    figures: self.synthetic_figures(),
                    reason,
                }
            }
        };

        Ok(VaultReserve {
            vault_id: vault_id.to_string(),
            reserve,
        })
    }

    fn live_figures(&self, ounces: f64) -> ReserveFigures {
        let total_bars = self.rng.lock().gen_range(PLACEHOLDER_BAR_COUNT);
        ReserveFigures {
            total_bars,
            total_weight_grams: round_to(troy_ounces_to_grams(ounces), GRAMS_DECIMALS),
            total_weight_oz: round_to(ounces, OUNCES_DECIMALS),
        }
    }

    fn synthetic_figures(&self) -> ReserveFigures {
        let (total_bars, grams) = {
            let mut rng = self.rng.lock();
            (
                rng.gen_range(PLACEHOLDER_BAR_COUNT),
                rng.gen_range(FALLBACK_GRAMS),
            )
        };
        let grams = f64::from(grams);
        ReserveFigures {
            total_bars,
            total_weight_grams: grams,
            total_weight_oz: round_to(grams * FALLBACK_OZ_PER_GRAM, OUNCES_DECIMALS),
        }
    }
}

fn parse_ounces(raw: &str) -> anyhow::Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => anyhow::bail!("reserve feed returned a non-numeric ounce figure: {raw:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFeed(&'static str);

    #[async_trait]
    impl OunceFeed for FixedFeed {
        async fn total_ounces(&self) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct DownFeed;

    #[async_trait]
    impl OunceFeed for DownFeed {
        async fn total_ounces(&self) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    fn aggregator(seed: u64) -> ReserveAggregator {
        ReserveAggregator::with_seed(Arc::new(BarDataset::builtin()), seed)
    }

    #[tokio::test]
    async fn test_live_branch_converts_ounces() {
        let agg = aggregator(1);
        let res = agg.vault_reserve("ZH-001", &FixedFeed("1500.0")).await.unwrap();
        assert_eq!(res.vault_id, "ZH-001");
        assert!(res.reserve.is_live());

        let f = res.reserve.figures();
        assert_eq!(f.total_weight_oz, 1500.0);
        assert_eq!(f.total_weight_grams, 46655.22);
        assert!(PLACEHOLDER_BAR_COUNT.contains(&f.total_bars));
    }

    #[tokio::test]
    async fn test_live_branch_rounds() {
        let agg = aggregator(2);
        let res = agg
            .vault_reserve("NY-001", &FixedFeed("0.123456789"))
            .await
            .unwrap();
        let f = res.reserve.figures();
        assert_eq!(f.total_weight_oz, 0.1235);
        assert_eq!(f.total_weight_grams, 3.84);
    }

    #[tokio::test]
    async fn test_feed_failure_falls_back() {
        let agg = aggregator(3);
        let res = agg.vault_reserve("ZH-002", &DownFeed).await.unwrap();

        match &res.reserve {
            Reserve::Synthetic { figures, reason } => {
                assert!(reason.contains("connection refused"));
                assert!(FALLBACK_GRAMS.contains(&(figures.total_weight_grams as u32)));
                assert_eq!(figures.total_weight_grams.fract(), 0.0);
                assert_eq!(
                    figures.total_weight_oz,
                    round_to(figures.total_weight_grams * 0.035274, 4)
                );
                assert!(PLACEHOLDER_BAR_COUNT.contains(&figures.total_bars));
            }
            other => panic!("expected synthetic reserve, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_ounces_fall_back() {
        let agg = aggregator(4);
        let res = agg.vault_reserve("ZH-001", &FixedFeed("NaN")).await.unwrap();
        assert!(!res.reserve.is_live());
    }

    #[tokio::test]
    async fn test_unknown_vault_skips_feed() {
        struct PanickingFeed;

        #[async_trait]
        impl OunceFeed for PanickingFeed {
            async fn total_ounces(&self) -> anyhow::Result<String> {
                panic!("feed must not be called for unknown vaults")
            }
        }

        let agg = aggregator(5);
        let err = agg.vault_reserve("XX-999", &PanickingFeed).await.unwrap_err();
        assert_eq!(err, LedgerError::VaultNotFound("XX-999".into()));
    }

    #[tokio::test]
    async fn test_seeded_placeholders_are_reproducible() {
        let a = aggregator(42).vault_reserve("ZH-001", &DownFeed).await.unwrap();
        let b = aggregator(42).vault_reserve("ZH-001", &DownFeed).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_fallback_stays_in_bounds_over_many_draws() {
        let agg = aggregator(7);
        for _ in 0..500 {
            let res = agg.vault_reserve("ZH-001", &DownFeed).await.unwrap();
            let f = res.reserve.figures();
            assert!((1..=100).contains(&f.total_bars));
            assert!((1000.0..=100_999.0).contains(&f.total_weight_grams));
        }
    }

    #[tokio::test]
    async fn test_wire_shape() {
        let agg = aggregator(8);

        let live = agg.vault_reserve("ZH-001", &FixedFeed("10")).await.unwrap();
        let json = serde_json::to_value(&live).unwrap();
        assert_eq!(json["contract_source"], true);
        assert!(json.get("error").is_none());
        assert_eq!(json["total_weight_oz"], 10.0);

        let synthetic = agg.vault_reserve("ZH-001", &DownFeed).await.unwrap();
        let json = serde_json::to_value(&synthetic).unwrap();
        assert_eq!(json["contract_source"], false);
        assert_eq!(json["error"], FALLBACK_MESSAGE);
        assert_eq!(json["vault_id"], "ZH-001");
    }
}
