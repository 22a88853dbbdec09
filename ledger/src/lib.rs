// Copyright (c) 2026 Aurum Custody Engineering. MIT License.
// See LICENSE for details.

//! # Aurum Ledger Core Library
//!
//! The custodial book of record for physical gold bars held in Aurum vaults.
//! Everything the HTTP node serves about bars comes out of this crate; the
//! only thing it does not own is the wire protocol to the on-chain reserve
//! contract, which lives in `aurum-contracts` and plugs in through the
//! [`reserve::OunceFeed`] trait.
//!
//! ## Architecture
//!
//! - **config**: Unit conversions, contract defaults, placeholder ranges.
//! - **dataset**: The compiled-in, read-only bar dataset.
//! - **query**: Vault listing, bar filtering and pagination.
//! - **reserve**: Reserve summaries: live from the contract, or synthetic.
//! - **error**: The crate's error taxonomy.
//!
//! ## Design Philosophy
//!
//! 1. The dataset is immutable after construction. Nothing hands out `&mut`.
//! 2. Bad query input is never an error; it is ignored or defaulted.
//! 3. Degraded reserve data is a first-class branch, not a caught exception.

pub mod config;
pub mod dataset;
pub mod error;
pub mod query;
pub mod reserve;

pub use dataset::{Bar, BarDataset, OwnerStatus, Vault};
pub use error::LedgerError;
pub use query::{BarPage, BarQuery, VaultSummary};
pub use reserve::{OunceFeed, Reserve, ReserveAggregator, ReserveFigures, VaultReserve};
