//! # rateaudit
//!
//! A rate-card audit engine for freight invoices: it reconstructs the
//! *expected* charge breakdown for an invoice from carrier rate data,
//! compares it against what was actually billed, and emits a per-invoice
//! verdict (`Approved` / `ReviewRequired` / `Rejected` / `NoRateCard` /
//! `Error`) with a line-item variance breakdown.
//!
//! Five audit flavors share one core: ocean freight, air freight, DHL
//! Express international (import/export), DHL Express third-party, DHL
//! Express Australia domestic, and DGF spot-quote auditing.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//!
//! This crate is a pure computation library. It never touches a database,
//! a file, or the network — callers implement [`core::RateStore`] and
//! [`batch::AuditResultStore`] against whatever storage they already have,
//! and the engine only ever sees Rust types.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `air` (default) | Air freight pricing calculator |
//! | `ocean` (default) | Ocean FCL/LCL pricing calculator and fuzzy lane matcher |
//! | `express` (default) | DHL Express international/3rd-party/AU domestic calculators |
//! | `dgf` (default) | DGF spot-quote calculator |
//! | `batch` (default) | Batch coordinator, result persistence trait, `tracing` logging |
//! | `parallel` | `rayon`-backed parallel batch execution (implies `batch`) |
//! | `all` | Everything |

#![forbid(unsafe_code)]

pub mod core;

#[cfg(feature = "air")]
pub mod air;

#[cfg(feature = "ocean")]
pub mod ocean;

#[cfg(feature = "express")]
pub mod express;

#[cfg(feature = "dgf")]
pub mod dgf;

#[cfg(feature = "batch")]
pub mod batch;

// Re-export core types at crate root for convenience.
pub use crate::core::*;
