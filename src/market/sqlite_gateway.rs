//! SQLite-backed market data gateway
//!
//! Reads the `zip_data` table produced by the Redfin TSV import. The table is
//! opened read-only and its columns are checked against [`MARKET_COLUMNS`]
//! before the first query runs.

use super::record::{MarketField, MarketRecord, MARKET_COLUMNS};
use super::MarketDataGateway;
use crate::error::QueryError;
use crate::postal::PostalCode;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::Path;

/// Default table name written by the TSV importer
pub const DEFAULT_TABLE: &str = "zip_data";

/// Upper bound on bound parameters per SELECT
const FETCH_CHUNK_SIZE: usize = 500;

pub struct SqliteMarketGateway {
    conn: Connection,
    select_prefix: String,
    table: String,
}

impl SqliteMarketGateway {
    /// Open an existing database read-only and validate the table schema
    pub fn open(db_path: impl AsRef<Path>, table: &str) -> Result<Self, QueryError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        log::info!("📥 Market database opened read-only: {}", db_path.display());
        Self::from_connection(conn, table)
    }

    /// Wrap an already-open connection (used by tests with in-memory databases)
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self, QueryError> {
        validate_identifier(table)?;
        validate_schema(&conn, table)?;

        let columns = MARKET_COLUMNS
            .iter()
            .map(|(name, _)| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ");
        let select_prefix = format!(
            "SELECT {} FROM \"{}\" WHERE CAST(\"ZIP\" AS INTEGER) IN ",
            columns, table
        );

        Ok(Self {
            conn,
            select_prefix,
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Total rows in the market table (logged at startup)
    pub fn row_count(&self) -> Result<i64, QueryError> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn fetch_chunk(&self, codes: &[PostalCode]) -> Result<Vec<MarketRecord>, QueryError> {
        let placeholders = vec!["?"; codes.len()].join(",");
        // Insertion order decides which duplicate row is kept downstream
        let sql = format!("{}({}) ORDER BY rowid", self.select_prefix, placeholders);

        // Matching on the integer value finds ZIPs stored as padded text,
        // unpadded text or integers alike.
        let params: Vec<i64> = codes
            .iter()
            .filter_map(|code| code.as_str().parse::<i64>().ok())
            .collect();

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            match row? {
                Some(record) => records.push(record),
                None => log::warn!("⚠️  Skipped market row with unparseable ZIP"),
            }
        }
        Ok(records)
    }
}

impl MarketDataGateway for SqliteMarketGateway {
    fn fetch(&self, codes: &[PostalCode]) -> Result<Vec<MarketRecord>, QueryError> {
        let mut records = Vec::new();
        for chunk in codes.chunks(FETCH_CHUNK_SIZE) {
            records.extend(self.fetch_chunk(chunk)?);
        }

        let before = records.len();
        records.retain(MarketRecord::is_scorable);
        if records.len() < before {
            log::debug!(
                "🧹 Dropped {} market rows without MEDIAN_SALE_PRICE",
                before - records.len()
            );
        }

        log::debug!(
            "📥 Fetched {} market rows for {} ZIPs",
            records.len(),
            codes.len()
        );
        Ok(records)
    }
}

fn validate_identifier(table: &str) -> Result<(), QueryError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(QueryError::Schema(format!("invalid table name '{}'", table)))
    }
}

/// Fail fast when the table or any mapped column is missing
fn validate_schema(conn: &Connection, table: &str) -> Result<(), QueryError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
    let present: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<_, _>>()?;

    if present.is_empty() {
        return Err(QueryError::Schema(format!("table '{}' not found", table)));
    }

    let missing: Vec<&str> = MARKET_COLUMNS
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !present.iter().any(|col| col.eq_ignore_ascii_case(name)))
        .collect();

    if !missing.is_empty() {
        return Err(QueryError::Schema(format!(
            "table '{}' is missing columns: {}",
            table,
            missing.join(", ")
        )));
    }

    Ok(())
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Option<MarketRecord>> {
    let code = match code_from_value(row.get::<_, Value>(0)?) {
        Some(code) => code,
        None => return Ok(None),
    };

    let mut record = MarketRecord::empty(code);
    for (idx, (_, field)) in MARKET_COLUMNS.iter().enumerate().skip(1) {
        let value = row.get::<_, Value>(idx)?;
        match field {
            MarketField::StateCode => {
                record.state_code = match value {
                    Value::Text(s) => s.trim().to_string(),
                    _ => String::new(),
                };
            }
            _ => record.set_metric(*field, number_from_value(value)),
        }
    }

    Ok(Some(record))
}

fn code_from_value(value: Value) -> Option<PostalCode> {
    match value {
        Value::Integer(n) => PostalCode::from_number(n).ok(),
        Value::Real(f) if f.fract() == 0.0 => PostalCode::from_number(f as i64).ok(),
        Value::Text(s) => PostalCode::parse(&s).ok(),
        _ => None,
    }
}

fn number_from_value(value: Value) -> Option<f64> {
    let number = match value {
        Value::Integer(n) => n as f64,
        Value::Real(f) => f,
        Value::Text(s) => s.trim().parse().ok()?,
        Value::Null | Value::Blob(_) => return None,
    };
    number.is_finite().then_some(number)
}
