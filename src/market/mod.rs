//! Market Data Gateway - per-ZIP market statistics from the persistent store

pub mod record;
pub mod sqlite_gateway;

pub use record::{MarketField, MarketRecord, MARKET_COLUMNS};
pub use sqlite_gateway::{SqliteMarketGateway, DEFAULT_TABLE};

use crate::error::QueryError;
use crate::postal::PostalCode;

/// Read side of the market statistics store
///
/// Returns the rows matching `codes`; codes with no row are simply absent.
/// Rows without a median sale price are never returned.
pub trait MarketDataGateway {
    fn fetch(&self, codes: &[PostalCode]) -> Result<Vec<MarketRecord>, QueryError>;
}

impl<G: MarketDataGateway + ?Sized> MarketDataGateway for &G {
    fn fetch(&self, codes: &[PostalCode]) -> Result<Vec<MarketRecord>, QueryError> {
        (**self).fetch(codes)
    }
}
