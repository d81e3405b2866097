//! Scoring Core - batch-relative investment score and ranking
//!
//! ```text
//! Vec<MarketRecord> → ScoreEngine (fill nulls, sub-scores, composite)
//!     ↓
//! Ranker (dedupe, sort, top-K, percent of max)
//!     ↓
//! RankedList (+ optional pinned reference entry)
//! ```

pub mod engine;
pub mod ranker;

pub use engine::{median, ScoreEngine, ScoreWeights, ScoredRecord};
pub use ranker::{RankedList, Ranker, DEFAULT_TOP_K};
