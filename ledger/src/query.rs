//! # Vault Queries
//!
//! Listing vaults and pulling a filtered, paginated page of bars out of one.
//!
//! Query parameters arrive exactly as the client typed them. Nothing here
//! rejects a request for a malformed parameter: a purity bound that is not a
//! number is dropped, a pagination value that is not a number falls back to
//! its default. The only failure is asking for a vault that does not exist.
//!
//! Pagination follows array slice rules: a negative offset or limit counts
//! back from the end of the filtered set.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::{grams_to_troy_ounces, round_to, GRAMS_DECIMALS, OUNCES_DECIMALS};
use crate::dataset::{Bar, BarDataset};
use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Raw filter and pagination parameters for a bar listing.
///
/// All fields are the untouched query-string values. Empty strings are
/// treated the same as absent ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarQuery {
    /// Exact owner match.
    pub owner_id: Option<String>,
    /// Exact match on the status wire name.
    pub owner_status: Option<String>,
    /// Inclusive lower purity bound.
    pub purity_min: Option<String>,
    /// Inclusive upper purity bound.
    pub purity_max: Option<String>,
    /// Maximum bars in the page.
    pub limit: Option<String>,
    /// Bars to skip before the page starts.
    pub offset: Option<String>,
}

impl BarQuery {
    /// Builds a query from raw `key=value` pairs in request order.
    ///
    /// Each key is taken on its own: unknown keys are ignored and a repeated
    /// key keeps its first value, so one odd parameter never drops the rest.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "owner_id" => &mut query.owner_id,
                "owner_status" => &mut query.owner_status,
                "purity_min" => &mut query.purity_min,
                "purity_max" => &mut query.purity_max,
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// One row of the vault listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultSummary {
    pub vault_id: String,
    pub total_bars: usize,
    /// Unrounded.
    pub total_weight_grams: f64,
}

/// A page of bars from one vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPage {
    pub vault_id: String,
    /// Bars matching the filters, before pagination.
    pub total_bars: usize,
    /// Weight of the bars in this page, 2 decimals.
    pub total_weight_grams: f64,
    /// Troy ounces of the bars in this page, 4 decimals.
    pub total_oz: f64,
    pub bars: Vec<Bar>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Summarises every vault in declaration order.
pub fn list_vaults(dataset: &BarDataset) -> Vec<VaultSummary> {
    dataset
        .vaults()
        .iter()
        .map(|v| VaultSummary {
            vault_id: v.vault_id.clone(),
            total_bars: v.bar_count(),
            total_weight_grams: v.total_weight_grams(),
        })
        .collect()
}

/// Returns the bars of `vault_id` that pass every supplied filter, sliced to
/// the requested page.
///
/// Filters are conjunctive and applied in a fixed order: owner, status,
/// minimum purity, maximum purity. `total_bars` counts the filtered set;
/// the weight and ounce totals only cover the returned page.
pub fn vault_bars(
    dataset: &BarDataset,
    vault_id: &str,
    query: &BarQuery,
) -> Result<BarPage, LedgerError> {
    let vault = dataset.require_vault(vault_id)?;

    let owner_id = non_empty(&query.owner_id);
    let owner_status = non_empty(&query.owner_status);
    let purity_min = non_empty(&query.purity_min).and_then(parse_decimal);
    let purity_max = non_empty(&query.purity_max).and_then(parse_decimal);

    let filtered: Vec<&Bar> = vault
        .bars
        .iter()
        .filter(|b| owner_id.map_or(true, |id| b.owner_id.as_deref() == Some(id)))
        .filter(|b| owner_status.map_or(true, |s| b.owner_status.as_str() == s))
        .filter(|b| purity_min.map_or(true, |min| b.purity >= min))
        .filter(|b| purity_max.map_or(true, |max| b.purity <= max))
        .collect();

    let total_bars = filtered.len();
    let window = page_window(
        non_empty(&query.offset),
        non_empty(&query.limit),
        total_bars,
    );

    let bars: Vec<Bar> = filtered[window.clone()]
        .iter()
        .map(|&b| b.clone())
        .collect();

    let grams: f64 = bars.iter().map(|b| b.weight_grams).sum();

    tracing::debug!(
        vault_id,
        total_bars,
        returned = bars.len(),
        start = window.start,
        end = window.end,
        "vault bars queried"
    );

    Ok(BarPage {
        vault_id: vault_id.to_string(),
        total_bars,
        total_weight_grams: round_to(grams, GRAMS_DECIMALS),
        total_oz: round_to(grams_to_troy_ounces(grams), OUNCES_DECIMALS),
        bars,
    })
}

// ---------------------------------------------------------------------------
// Lenient Parameter Parsing
// ---------------------------------------------------------------------------

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Parses the longest decimal prefix of `raw`, so `"0.9995abc"` is 0.9995.
/// Accepts a sign, digits with an optional fraction, an exponent and
/// `Infinity`. A string with no leading number yields `None`, which disables
/// the filter.
fn parse_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        let inf = if bytes[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some(inf);
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if frac_digits > 0 || int_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp..]);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Parses the leading integer of `raw`: optional sign, then digits.
/// `"2.7"` is 2 and `"3abc"` is 3; a string with no leading digits is `None`.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate instead of failing on absurdly long digit runs.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Resolves the page as the slice `[offset, offset + limit)` of a list of
/// `len` items.
///
/// A missing, zero or non-numeric offset is 0, and the same for a limit is
/// `len`. Negative bounds count back from the end. The range is clamped to
/// the list and is empty when the end falls before the start.
fn page_window(offset: Option<&str>, limit: Option<&str>, len: usize) -> Range<usize> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let offset = offset
        .and_then(parse_leading_int)
        .filter(|n| *n != 0)
        .unwrap_or(0);
    let limit = limit
        .and_then(parse_leading_int)
        .filter(|n| *n != 0)
        .unwrap_or(len_i);

    let start = clamp_index(offset, len);
    let end = clamp_index(offset.saturating_add(limit), len);
    start..end.max(start)
}

fn clamp_index(index: i64, len: usize) -> usize {
    if index < 0 {
        let back = usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(back)
    } else {
        usize::try_from(index).map_or(len, |i| i.min(len))
    }
}
