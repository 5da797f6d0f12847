//! # Limelight Core Types
//!
//! This crate defines the shared data model for the analysis pipeline: market
//! quotes, normalized provider records, merged per-show records and the
//! immutable snapshot that wraps one complete analysis pass.
//!
//! As a Layer 0 crate it carries no I/O and depends only on serde, chrono and
//! rust_decimal.

pub mod canonical;
pub mod enums;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use canonical::canonical_show_title;
pub use enums::{ProviderKind, Recommendation};
pub use structs::{
    Headline, MarketQuote, MergedRecord, PageViewPoint, ProviderRecord, ScoreBreakdown, ScoreCard,
    Snapshot,
};
