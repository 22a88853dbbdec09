//! Error types for the vault ledger.

use thiserror::Error;

/// Errors returned by ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The requested vault id is not part of the dataset.
    #[error("vault not found: {0}")]
    VaultNotFound(String),

    /// The dataset handed to [`crate::BarDataset::new`] broke an invariant.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
}
