//! Market statistics rows and the source-column mapping

use crate::postal::PostalCode;

/// One row of market statistics for a postal code
///
/// Every numeric field may be missing in the source data. Only
/// `median_sale_price` is mandatory for scoring; the rest are filled per batch
/// by the score engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRecord {
    pub code: PostalCode,
    pub state_code: String,
    pub median_sale_price: Option<f64>,
    pub median_list_price: Option<f64>,
    pub homes_sold: Option<f64>,
    pub inventory: Option<f64>,
    pub months_of_supply: Option<f64>,
    pub days_on_market: Option<f64>,
}

impl MarketRecord {
    /// Record with only the code set, for building rows field by field
    pub fn empty(code: PostalCode) -> Self {
        Self {
            code,
            state_code: String::new(),
            median_sale_price: None,
            median_list_price: None,
            homes_sold: None,
            inventory: None,
            months_of_supply: None,
            days_on_market: None,
        }
    }

    pub fn is_scorable(&self) -> bool {
        self.median_sale_price.is_some()
    }
}

/// Canonical field a source column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketField {
    Code,
    StateCode,
    MedianSalePrice,
    MedianListPrice,
    HomesSold,
    Inventory,
    MonthsOfSupply,
    DaysOnMarket,
}

/// Source column name → canonical field, in SELECT order
///
/// The gateway checks every column listed here against the table schema when
/// it opens, so a renamed export column fails at startup instead of turning
/// into silently missing values.
pub const MARKET_COLUMNS: &[(&str, MarketField)] = &[
    ("ZIP", MarketField::Code),
    ("STATE_CODE", MarketField::StateCode),
    ("MEDIAN_SALE_PRICE", MarketField::MedianSalePrice),
    ("MEDIAN_LIST_PRICE", MarketField::MedianListPrice),
    ("HOMES_SOLD", MarketField::HomesSold),
    ("INVENTORY", MarketField::Inventory),
    ("MONTHS_OF_SUPPLY", MarketField::MonthsOfSupply),
    ("MEDIAN_DOM", MarketField::DaysOnMarket),
];

impl MarketRecord {
    /// Assign a numeric value to the field it maps to
    pub(crate) fn set_metric(&mut self, field: MarketField, value: Option<f64>) {
        match field {
            MarketField::MedianSalePrice => self.median_sale_price = value,
            MarketField::MedianListPrice => self.median_list_price = value,
            MarketField::HomesSold => self.homes_sold = value,
            MarketField::Inventory => self.inventory = value,
            MarketField::MonthsOfSupply => self.months_of_supply = value,
            MarketField::DaysOnMarket => self.days_on_market = value,
            MarketField::Code | MarketField::StateCode => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_mapping_covers_every_field_once() {
        let fields: Vec<MarketField> = MARKET_COLUMNS.iter().map(|(_, f)| *f).collect();
        assert_eq!(fields.len(), 8);
        for (i, field) in fields.iter().enumerate() {
            assert!(!fields[i + 1..].contains(field), "{:?} mapped twice", field);
        }
        assert_eq!(MARKET_COLUMNS[0], ("ZIP", MarketField::Code));
    }

    #[test]
    fn test_set_metric() {
        let mut record = MarketRecord::empty(PostalCode::parse("20164").unwrap());
        assert!(!record.is_scorable());

        record.set_metric(MarketField::MedianSalePrice, Some(550_000.0));
        record.set_metric(MarketField::DaysOnMarket, Some(12.0));
        assert!(record.is_scorable());
        assert_eq!(record.days_on_market, Some(12.0));
        assert_eq!(record.inventory, None);
    }
}
