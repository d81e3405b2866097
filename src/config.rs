//! Runtime configuration from environment variables

use crate::directory::DEFAULT_RADIUS_MILES;
use crate::market::DEFAULT_TABLE;
use crate::scoring::DEFAULT_TOP_K;
use std::env;

/// Configuration for the query CLI
///
/// Loaded from environment variables (after `.env`) with sensible defaults.
#[derive(Debug, Clone)]
pub struct ReinaConfig {
    /// SQLite database holding the imported market table
    pub db_path: String,

    /// Market table name inside the database
    pub table: String,

    /// Reference CSV mapping ZIP → coordinates and labels
    pub zips_path: String,

    /// Entries shown per result (before the pinned reference ZIP)
    pub top_k: usize,

    /// Radius used when the `zip` prompt is left blank
    pub default_radius_miles: f64,
}

impl ReinaConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `REINA_DB_PATH` (default: reina_redfinzipdata.db)
    /// - `REINA_TABLE` (default: zip_data)
    /// - `REINA_ZIPS_PATH` (default: uszips.csv)
    /// - `REINA_TOP_K` (default: 5)
    /// - `REINA_DEFAULT_RADIUS_MILES` (default: 20)
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("REINA_DB_PATH")
                .unwrap_or_else(|_| "reina_redfinzipdata.db".to_string()),

            table: env::var("REINA_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),

            zips_path: env::var("REINA_ZIPS_PATH").unwrap_or_else(|_| "uszips.csv".to_string()),

            top_k: env::var("REINA_TOP_K")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|k| *k > 0)
                .unwrap_or(DEFAULT_TOP_K),

            default_radius_miles: env::var("REINA_DEFAULT_RADIUS_MILES")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|r: &f64| r.is_finite() && *r > 0.0)
                .unwrap_or(DEFAULT_RADIUS_MILES),
        }
    }
}
