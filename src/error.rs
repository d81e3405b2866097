//! Error types for the query pipeline

use thiserror::Error;

/// Errors surfaced by the reference directory, the market gateway and the
/// query engine.
///
/// `NotFound`, `NoData` and `InvalidInput` are per-query failures: the command
/// loop reports them and keeps going. The remaining variants come from the
/// backing stores.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("ZIP {0} not found in reference directory")]
    NotFound(String),

    #[error("{0}")]
    NoData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Reference data error: {0}")]
    Reference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl QueryError {
    /// True for errors that end one query but leave the session usable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            QueryError::NotFound(_) | QueryError::NoData(_) | QueryError::InvalidInput(_)
        )
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
