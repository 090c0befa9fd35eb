//! Settlement rule engine: asset catalogs, the built-in core content set,
//! and the settlement aggregate with its command surface and normalization
//! pipeline. Pure and synchronous; persistence lives in settlement-store.

use std::fmt;

pub mod catalog;
pub mod content;
pub mod settlement;

pub use catalog::{AssetCatalog, AssetLibrary, GameContent};
pub use settlement::{AttributeOp, Settlement};

#[derive(Debug)]
pub enum SettlementError {
    /// Malformed or out-of-range command input.
    Validation(String),
    /// A handle or name that resolves against no catalog.
    UnknownAsset(String),
    /// Timeline structure violated: missing year, no matching record.
    TimelineConsistency(String),
    /// Legacy document could not be normalized; the load is aborted.
    Migration(String),
}

impl fmt::Display for SettlementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
            Self::UnknownAsset(msg) => write!(f, "unknown asset: {msg}"),
            Self::TimelineConsistency(msg) => write!(f, "timeline consistency error: {msg}"),
            Self::Migration(msg) => write!(f, "migration error: {msg}"),
        }
    }
}

impl std::error::Error for SettlementError {}
