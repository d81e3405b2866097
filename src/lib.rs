//! Reina - postal-code investment ranking
//!
//! Joins per-ZIP market statistics (median price, inventory, days on market,
//! homes sold) with a ZIP → coordinate reference table, scores each ZIP with a
//! batch-relative composite, and ranks the best ZIPs near a center ZIP or
//! inside a city/state.
//!
//! # Architecture
//!
//! ```text
//! Query (zip / city / state)
//!     ↓
//! ReferenceDirectory + GeoFilter → candidate ZIPs
//!     ↓
//! MarketDataGateway (SQLite zip_data) → MarketRecord batch
//!     ↓
//! ScoreEngine → Ranker (top-K + pinned center ZIP)
//!     ↓
//! Report (table + bar chart)
//! ```

pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod market;
pub mod postal;
pub mod query;
pub mod scoring;
pub mod ui;

pub use config::ReinaConfig;
pub use directory::{GeoFilter, PostalLocation, ReferenceDirectory, RegionKind};
pub use error::QueryError;
pub use market::{MarketDataGateway, MarketRecord, SqliteMarketGateway};
pub use postal::PostalCode;
pub use query::{Query, QueryEngine, QueryOutcome};
pub use scoring::{RankedList, Ranker, ScoreEngine, ScoreWeights, ScoredRecord};
