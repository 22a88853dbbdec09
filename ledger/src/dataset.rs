//! # Bar Dataset
//!
//! The compiled-in book of physical bars, grouped by the vault that holds
//! them. Built once at startup and shared behind an `Arc`; there is no API
//! that mutates it after [`BarDataset::new`] returns.
//!
//! Vault order is declaration order and is what `GET /vaults` reports. Bar
//! order inside a vault is also preserved verbatim, since pagination offsets
//! are only meaningful against a stable order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Custody state of a bar with respect to its beneficial owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerStatus {
    /// Allocated to an owner and settled.
    Assigned,
    /// Sitting in the vault with no owner.
    Unassigned,
    /// Delivered by a refiner, waiting for the matching token mint.
    AwaitingMint,
    /// Owner requested physical delivery; bar is leaving the vault.
    PendingDelivery,
}

impl OwnerStatus {
    /// Every status, in the order the API documents them.
    pub const ALL: [OwnerStatus; 4] = [
        OwnerStatus::Assigned,
        OwnerStatus::Unassigned,
        OwnerStatus::AwaitingMint,
        OwnerStatus::PendingDelivery,
    ];

    /// The wire name used in JSON and in the `owner_status` query filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerStatus::Assigned => "assigned",
            OwnerStatus::Unassigned => "unassigned",
            OwnerStatus::AwaitingMint => "awaiting_mint",
            OwnerStatus::PendingDelivery => "pending_delivery",
        }
    }
}

impl std::fmt::Display for OwnerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical gold bar as recorded by the custodian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Ledger record number, unique across all vaults.
    pub record_id: u64,
    /// Refiner serial stamped on the bar, unique across all vaults.
    pub serial_number: String,
    /// Gross weight in grams.
    pub weight_grams: f64,
    /// Fineness as a fraction, e.g. `0.9999` for four nines.
    pub purity: f64,
    /// Date the bar entered the vault.
    pub delivery_date: NaiveDate,
    /// Beneficial owner, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Custody state.
    pub owner_status: OwnerStatus,
}

/// A named storage location and the bars it holds, in ledger order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vault {
    /// Location code, e.g. `ZH-001`.
    pub vault_id: String,
    /// Bars held, in ledger order.
    pub bars: Vec<Bar>,
}

impl Vault {
    /// Number of bars held.
    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    /// Unrounded sum of bar weights in grams.
    pub fn total_weight_grams(&self) -> f64 {
        self.bars.iter().map(|b| b.weight_grams).sum()
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The read-only collection of vaults.
#[derive(Debug, Clone)]
pub struct BarDataset {
    vaults: Vec<Vault>,
}

impl BarDataset {
    /// Builds a dataset after checking it against the ledger invariants:
    ///
    /// - vault ids are unique,
    /// - `record_id` and `serial_number` are unique across all vaults,
    /// - weights are positive and finite,
    /// - purity lies in `(0, 1]`,
    /// - an `unassigned` bar carries no `owner_id`.
    pub fn new(vaults: Vec<Vault>) -> Result<Self, LedgerError> {
        let mut vault_ids = HashSet::new();
        let mut record_ids = HashSet::new();
        let mut serials = HashSet::new();

        for vault in &vaults {
            if !vault_ids.insert(vault.vault_id.as_str()) {
                return Err(LedgerError::InvalidDataset(format!(
                    "duplicate vault id {}",
                    vault.vault_id
                )));
            }

            for bar in &vault.bars {
                if !record_ids.insert(bar.record_id) {
                    return Err(LedgerError::InvalidDataset(format!(
                        "duplicate record_id {}",
                        bar.record_id
                    )));
                }
                if !serials.insert(bar.serial_number.as_str()) {
                    return Err(LedgerError::InvalidDataset(format!(
                        "duplicate serial_number {}",
                        bar.serial_number
                    )));
                }
                if !(bar.weight_grams.is_finite() && bar.weight_grams > 0.0) {
                    return Err(LedgerError::InvalidDataset(format!(
                        "bar {} has non-positive weight {}",
                        bar.record_id, bar.weight_grams
                    )));
                }
                if !(bar.purity > 0.0 && bar.purity <= 1.0) {
                    return Err(LedgerError::InvalidDataset(format!(
                        "bar {} has purity {} outside (0, 1]",
                        bar.record_id, bar.purity
                    )));
                }
                if bar.owner_status == OwnerStatus::Unassigned && bar.owner_id.is_some() {
                    return Err(LedgerError::InvalidDataset(format!(
                        "bar {} is unassigned but has an owner",
                        bar.record_id
                    )));
                }
            }
        }

        Ok(Self { vaults })
    }

    /// The dataset shipped with the service.
    pub fn builtin() -> Self {
        // Checked by `test_builtin_dataset_is_valid`.
        Self {
            vaults: builtin_vaults(),
        }
    }

    /// All vaults in declaration order.
    pub fn vaults(&self) -> &[Vault] {
        &self.vaults
    }

    /// Looks up a vault by id.
    pub fn vault(&self, vault_id: &str) -> Option<&Vault> {
        self.vaults.iter().find(|v| v.vault_id == vault_id)
    }

    /// Like [`BarDataset::vault`] but fails with [`LedgerError::VaultNotFound`].
    pub fn require_vault(&self, vault_id: &str) -> Result<&Vault, LedgerError> {
        self.vault(vault_id)
            .ok_or_else(|| LedgerError::VaultNotFound(vault_id.to_string()))
    }

    /// Whether `vault_id` names a known vault.
    pub fn contains(&self, vault_id: &str) -> bool {
        self.vault(vault_id).is_some()
    }
}

// ---------------------------------------------------------------------------
// Built-in Data
// ---------------------------------------------------------------------------

fn bar(
    record_id: u64,
    serial_number: &str,
    weight_grams: f64,
    purity: f64,
    (y, m, d): (i32, u32, u32),
    owner_id: Option<&str>,
    owner_status: OwnerStatus,
) -> Bar {
    Bar {
        record_id,
        serial_number: serial_number.to_string(),
        weight_grams,
        purity,
        delivery_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        owner_id: owner_id.map(str::to_string),
        owner_status,
    }
}

fn builtin_vaults() -> Vec<Vault> {
    use OwnerStatus::*;

    vec![
        Vault {
            vault_id: "ZH-001".into(),
            bars: vec![
                bar(1045, "LMBA99873", 1000.0, 0.9999, (2025, 10, 1), Some("refiner_abc"), AwaitingMint),
                bar(1046, "LMBA99874", 1000.0, 0.9999, (2025, 10, 1), None, Unassigned),
                bar(1047, "LMBA99875", 1000.0, 0.9999, (2025, 10, 2), Some("client_999"), PendingDelivery),
                bar(1048, "LMBA99876", 500.0, 0.999, (2025, 10, 3), Some("refiner_abc"), Assigned),
                bar(1049, "LMBA99877", 1000.0, 0.9995, (2025, 10, 4), Some("client_888"), Assigned),
            ],
        },
        Vault {
            vault_id: "ZH-002".into(),
            bars: vec![
                bar(2001, "LMBA88001", 1000.0, 0.9999, (2025, 9, 15), Some("client_777"), Assigned),
                bar(2002, "LMBA88002", 1000.0, 0.999, (2025, 9, 16), None, Unassigned),
            ],
        },
        Vault {
            vault_id: "NY-001".into(),
            bars: vec![
                bar(3001, "LMBA77001", 1000.0, 0.9999, (2025, 8, 20), Some("refiner_xyz"), AwaitingMint),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar(record_id: u64, serial: &str) -> Bar {
        bar(record_id, serial, 1000.0, 0.9999, (2025, 1, 1), Some("owner"), OwnerStatus::Assigned)
    }

    #[test]
    fn test_builtin_dataset_is_valid() {
        let builtin = BarDataset::builtin();
        let checked = BarDataset::new(builtin.vaults().to_vec()).expect("builtin must validate");
        assert_eq!(checked.vaults().len(), 3);
    }

    #[test]
    fn test_builtin_vault_order() {
        let ds = BarDataset::builtin();
        let ids: Vec<_> = ds.vaults().iter().map(|v| v.vault_id.as_str()).collect();
        assert_eq!(ids, vec!["ZH-001", "ZH-002", "NY-001"]);
    }

    #[test]
    fn test_builtin_totals() {
        let ds = BarDataset::builtin();
        let zh1 = ds.vault("ZH-001").unwrap();
        assert_eq!(zh1.bar_count(), 5);
        assert_eq!(zh1.total_weight_grams(), 4500.0);
        assert_eq!(ds.vault("ZH-002").unwrap().total_weight_grams(), 2000.0);
        assert_eq!(ds.vault("NY-001").unwrap().bar_count(), 1);
    }

    #[test]
    fn test_lookup_unknown_vault() {
        let ds = BarDataset::builtin();
        assert!(ds.vault("XX-999").is_none());
        assert!(!ds.contains("XX-999"));
        assert_eq!(
            ds.require_vault("XX-999").unwrap_err(),
            LedgerError::VaultNotFound("XX-999".into())
        );
    }

    #[test]
    fn test_vault_ids_are_case_sensitive() {
        let ds = BarDataset::builtin();
        assert!(ds.contains("ZH-001"));
        assert!(!ds.contains("zh-001"));
    }

    #[test]
    fn test_rejects_duplicate_vault() {
        let v = Vault { vault_id: "A".into(), bars: vec![] };
        let err = BarDataset::new(vec![v.clone(), v]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDataset(_)));
    }

    #[test]
    fn test_rejects_duplicate_record_id_across_vaults() {
        let a = Vault { vault_id: "A".into(), bars: vec![sample_bar(1, "S1")] };
        let b = Vault { vault_id: "B".into(), bars: vec![sample_bar(1, "S2")] };
        assert!(BarDataset::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_serial() {
        let a = Vault {
            vault_id: "A".into(),
            bars: vec![sample_bar(1, "S1"), sample_bar(2, "S1")],
        };
        assert!(BarDataset::new(vec![a]).is_err());
    }

    #[test]
    fn test_rejects_bad_weight_and_purity() {
        let mut light = sample_bar(1, "S1");
        light.weight_grams = 0.0;
        assert!(BarDataset::new(vec![Vault { vault_id: "A".into(), bars: vec![light] }]).is_err());

        let mut impure = sample_bar(1, "S1");
        impure.purity = 1.01;
        assert!(BarDataset::new(vec![Vault { vault_id: "A".into(), bars: vec![impure] }]).is_err());

        let mut worthless = sample_bar(1, "S1");
        worthless.purity = 0.0;
        assert!(BarDataset::new(vec![Vault { vault_id: "A".into(), bars: vec![worthless] }]).is_err());
    }

    #[test]
    fn test_rejects_owned_unassigned_bar() {
        let mut b = sample_bar(1, "S1");
        b.owner_status = OwnerStatus::Unassigned;
        let err = BarDataset::new(vec![Vault { vault_id: "A".into(), bars: vec![b] }]).unwrap_err();
        assert!(err.to_string().contains("unassigned"));
    }

    #[test]
    fn test_bar_serialization_omits_missing_owner() {
        let ds = BarDataset::builtin();
        let unassigned = &ds.vault("ZH-001").unwrap().bars[1];
        let json = serde_json::to_value(unassigned).unwrap();
        assert!(json.get("owner_id").is_none());
        assert_eq!(json["owner_status"], "unassigned");
        assert_eq!(json["delivery_date"], "2025-10-01");
    }

    #[test]
    fn test_owner_status_wire_names() {
        for status in OwnerStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
    }
}
