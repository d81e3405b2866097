//! Query orchestration for region and proximity searches
//!
//! Both query kinds resolve to a candidate ZIP set through the reference
//! directory, fetch market rows for that set, score the batch and rank it.
//! Proximity queries additionally pin the center ZIP when it falls outside
//! the top-K.

use crate::directory::{GeoFilter, ReferenceDirectory, RegionKind};
use crate::error::QueryError;
use crate::market::{MarketDataGateway, MarketRecord};
use crate::postal::PostalCode;
use crate::scoring::{RankedList, Ranker, ScoreEngine};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// One user query
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Proximity { center: PostalCode, radius_miles: f64 },
    Region { kind: RegionKind, value: String },
}

impl Query {
    /// Center ZIP to pin, for proximity queries
    pub fn pin_code(&self) -> Option<&PostalCode> {
        match self {
            Query::Proximity { center, .. } => Some(center),
            Query::Region { .. } => None,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Proximity {
                center,
                radius_miles,
            } => write!(f, "ZIPs within {} mi of {}", radius_miles, center),
            Query::Region { kind, value } => write!(f, "{} = {}", kind.title(), value),
        }
    }
}

/// Result of one successful query
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query: Query,
    /// ZIPs selected from the directory before the market join
    pub candidate_count: usize,
    /// Market rows that survived the join and were scored
    pub scored_count: usize,
    pub ranked: RankedList,
}

pub struct QueryEngine<'a, G> {
    directory: &'a ReferenceDirectory,
    gateway: G,
    scorer: ScoreEngine,
    ranker: Ranker,
}

impl<'a, G: MarketDataGateway> QueryEngine<'a, G> {
    pub fn new(directory: &'a ReferenceDirectory, gateway: G) -> Self {
        Self {
            directory,
            gateway,
            scorer: ScoreEngine::default(),
            ranker: Ranker::default(),
        }
    }

    pub fn with_scorer(mut self, scorer: ScoreEngine) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn directory(&self) -> &ReferenceDirectory {
        self.directory
    }

    pub fn run(&self, query: Query) -> Result<QueryOutcome, QueryError> {
        log::info!("🔍 Query: {}", query);
        let (candidates, no_data) = match &query {
            Query::Region { kind, value } => {
                let candidates = self.directory.filter_by_region(*kind, value);
                if candidates.is_empty() {
                    return Err(QueryError::NoData(format!(
                        "No ZIP codes found for {} = {}",
                        kind.title(),
                        value
                    )));
                }
                let no_data = format!(
                    "No real estate data found for ZIPs in {} {}",
                    kind.title(),
                    value
                );
                (candidates, no_data)
            }
            Query::Proximity {
                center,
                radius_miles,
            } => {
                let candidates = GeoFilter::new(self.directory).nearby(center, *radius_miles)?;
                (candidates, "No real estate data found for nearby ZIPs".to_string())
            }
        };

        self.rank_candidates(query, candidates, no_data)
    }

    fn rank_candidates(
        &self,
        query: Query,
        candidates: BTreeSet<PostalCode>,
        no_data: String,
    ) -> Result<QueryOutcome, QueryError> {
        let codes: Vec<PostalCode> = candidates.into_iter().collect();
        let rows = self.gateway.fetch(&codes)?;
        if rows.is_empty() {
            return Err(QueryError::NoData(no_data));
        }

        // Batch medians and maxima must only see one row per ZIP
        let rows = dedupe_by_code(rows);
        let scored = self.scorer.score(rows);
        if scored.is_empty() {
            return Err(QueryError::NoData(no_data));
        }
        let scored_count = scored.len();

        let mut ranked = self.ranker.rank(scored);
        if let Some(center) = query.pin_code() {
            if !ranked.contains(center) {
                self.pin_reference(&mut ranked, center)?;
            }
        }

        log::info!(
            "✅ Ranked {} of {} scored ZIPs ({} candidates)",
            ranked.len(),
            scored_count,
            codes.len()
        );

        Ok(QueryOutcome {
            query,
            candidate_count: codes.len(),
            scored_count,
            ranked,
        })
    }

    /// Score the reference ZIP on its own and pin it ahead of the top-K
    fn pin_reference(
        &self,
        ranked: &mut RankedList,
        center: &PostalCode,
    ) -> Result<(), QueryError> {
        let rows = self.gateway.fetch(std::slice::from_ref(center))?;
        // Duplicate rows for the center keep the first, as the main batch does
        let first = rows.into_iter().next();
        let Some(row) = first else {
            log::info!("ℹ️  Center ZIP {} has no market data; not pinned", center);
            return Ok(());
        };

        if let Some(reference) = self.scorer.score(vec![row]).into_iter().next() {
            log::info!("📌 Including center ZIP {} in results", center);
            ranked.pin(reference);
        }
        Ok(())
    }
}

/// Keep the first row seen for each ZIP, preserving gateway order
fn dedupe_by_code(rows: Vec<MarketRecord>) -> Vec<MarketRecord> {
    let total = rows.len();
    let mut seen = HashSet::new();
    let rows: Vec<MarketRecord> = rows
        .into_iter()
        .filter(|r| seen.insert(r.code.clone()))
        .collect();
    if rows.len() < total {
        log::debug!("🧹 Dropped {} duplicate market rows", total - rows.len());
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::tests::location;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory gateway that records every fetch
    #[derive(Default)]
    struct MockGateway {
        rows: HashMap<String, Vec<MarketRecord>>,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl MockGateway {
        fn with_row(mut self, code: &str, price: f64, sold: f64, inventory: f64, dom: f64) -> Self {
            let record = MarketRecord {
                median_sale_price: Some(price),
                homes_sold: Some(sold),
                inventory: Some(inventory),
                days_on_market: Some(dom),
                ..MarketRecord::empty(PostalCode::parse(code).unwrap())
            };
            self.rows
                .entry(record.code.to_string())
                .or_default()
                .push(record);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl MarketDataGateway for MockGateway {
        fn fetch(&self, codes: &[PostalCode]) -> Result<Vec<MarketRecord>, QueryError> {
            self.calls
                .borrow_mut()
                .push(codes.iter().map(|c| c.to_string()).collect());
            Ok(codes
                .iter()
                .flat_map(|c| self.rows.get(c.as_str()).cloned().unwrap_or_default())
                .collect())
        }
    }

    fn directory() -> ReferenceDirectory {
        ReferenceDirectory::from_locations(vec![
            location("20164", 39.0022, -77.3981, "Sterling", "Virginia"),
            location("20165", 39.0490, -77.3920, "Sterling", "Virginia"),
            location("20166", 38.9800, -77.4500, "Dulles", "Virginia"),
            location("20170", 38.9800, -77.3800, "Herndon", "Virginia"),
            location("90210", 34.0901, -118.4065, "Beverly Hills", "California"),
        ])
    }

    fn proximity(center: &str) -> Query {
        Query::Proximity {
            center: PostalCode::parse(center).unwrap(),
            radius_miles: 20.0,
        }
    }

    #[test]
    fn test_unknown_center_never_touches_gateway() {
        let directory = directory();
        let gateway = MockGateway::default().with_row("20164", 500_000.0, 5.0, 10.0, 20.0);
        let engine = QueryEngine::new(&directory, &gateway);

        let err = engine.run(proximity("11111")).unwrap_err();

        assert!(matches!(err, QueryError::NotFound(code) if code == "11111"));
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_region_without_matches_is_no_data() {
        let directory = directory();
        let gateway = MockGateway::default();
        let engine = QueryEngine::new(&directory, &gateway);

        let err = engine
            .run(Query::Region {
                kind: RegionKind::City,
                value: "Reston".to_string(),
            })
            .unwrap_err();

        assert!(matches!(err, QueryError::NoData(_)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_region_without_market_rows_is_no_data() {
        let directory = directory();
        let gateway = MockGateway::default().with_row("90210", 3_000_000.0, 2.0, 10.0, 40.0);
        let engine = QueryEngine::new(&directory, &gateway);

        let err = engine
            .run(Query::Region {
                kind: RegionKind::City,
                value: "sterling".to_string(),
            })
            .unwrap_err();

        assert!(matches!(err, QueryError::NoData(_)));
    }

    #[test]
    fn test_region_query_ranks_without_pin() {
        let directory = directory();
        let gateway = MockGateway::default()
            .with_row("20164", 500_000.0, 5.0, 10.0, 20.0)
            .with_row("20165", 400_000.0, 9.0, 4.0, 10.0)
            .with_row("90210", 3_000_000.0, 2.0, 10.0, 40.0);
        let engine = QueryEngine::new(&directory, &gateway);

        let outcome = engine
            .run(Query::Region {
                kind: RegionKind::State,
                value: "Virginia".to_string(),
            })
            .unwrap();

        assert_eq!(outcome.candidate_count, 4);
        assert_eq!(outcome.scored_count, 2);
        let codes: Vec<&str> = outcome
            .ranked
            .entries()
            .iter()
            .map(|e| e.code().as_str())
            .collect();
        assert_eq!(codes, vec!["20165", "20164"]);
        assert!(outcome.ranked.pinned().is_none());
        assert_eq!(outcome.ranked.entries()[0].score_pct, 100.0);
    }

    #[test]
    fn test_duplicate_rows_removed_before_scoring() {
        let directory = directory();
        let gateway = MockGateway::default()
            .with_row("20164", 100.0, 0.0, 0.0, 10.0)
            .with_row("20164", 1000.0, 0.0, 0.0, 100.0)
            .with_row("20165", 200.0, 0.0, 0.0, 20.0);
        let engine = QueryEngine::new(&directory, &gateway);

        let outcome = engine
            .run(Query::Region {
                kind: RegionKind::City,
                value: "Sterling".to_string(),
            })
            .unwrap();

        assert_eq!(outcome.scored_count, 2);
        let first = outcome
            .ranked
            .entries()
            .iter()
            .find(|e| e.code().as_str() == "20164")
            .unwrap();
        // maxima come from {100/10, 200/20}, not the dropped 1000/100 row
        assert!((first.dom_score - 0.5).abs() < 1e-9);
        assert!((first.price_score - 0.5).abs() < 1e-9);
        assert_eq!(first.record.median_sale_price, Some(100.0));
    }

    #[test]
    fn test_proximity_pins_center_outside_top_k() {
        let directory = directory();
        let gateway = MockGateway::default()
            .with_row("20164", 900_000.0, 1.0, 30.0, 60.0)
            .with_row("20165", 400_000.0, 9.0, 4.0, 10.0)
            .with_row("20166", 450_000.0, 8.0, 5.0, 12.0)
            .with_row("20170", 420_000.0, 7.0, 6.0, 15.0);
        let engine = QueryEngine::new(&directory, &gateway).with_ranker(Ranker::new(2));

        let outcome = engine.run(proximity("20164")).unwrap();
        let entries = outcome.ranked.entries();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].code().as_str(), "20164");
        assert!(entries[0].pinned);
        assert_eq!(entries[1].score_pct, 100.0);
        // batch fetch + single-ZIP fetch for the pin
        assert_eq!(gateway.call_count(), 2);
        assert_eq!(gateway.calls.borrow()[1], vec!["20164".to_string()]);

        // single-record batch: only the demand term survives
        let expected = 0.4 * (1.0 / 31.0);
        assert!((entries[0].investment_score - expected).abs() < 1e-9);
        let pct = expected / outcome.ranked.max_score() * 100.0;
        assert!((entries[0].score_pct - pct).abs() < 1e-9);
    }

    #[test]
    fn test_proximity_center_in_top_k_not_duplicated() {
        let directory = directory();
        let gateway = MockGateway::default()
            .with_row("20164", 400_000.0, 9.0, 4.0, 10.0)
            .with_row("20165", 900_000.0, 1.0, 30.0, 60.0);
        let engine = QueryEngine::new(&directory, &gateway);

        let outcome = engine.run(proximity("20164")).unwrap();

        assert_eq!(outcome.ranked.len(), 2);
        assert!(outcome.ranked.pinned().is_none());
        assert_eq!(gateway.call_count(), 1);
    }

    #[test]
    fn test_proximity_without_market_rows_is_no_data() {
        let directory = directory();
        let gateway = MockGateway::default().with_row("90210", 3_000_000.0, 2.0, 10.0, 40.0);
        let engine = QueryEngine::new(&directory, &gateway);

        assert!(matches!(
            engine.run(proximity("20164")),
            Err(QueryError::NoData(_))
        ));
    }

    #[test]
    fn test_invalid_radius_rejected_before_fetch() {
        let directory = directory();
        let gateway = MockGateway::default();
        let engine = QueryEngine::new(&directory, &gateway);

        let query = Query::Proximity {
            center: PostalCode::parse("20164").unwrap(),
            radius_miles: -3.0,
        };
        assert!(matches!(engine.run(query), Err(QueryError::InvalidInput(_))));
        assert_eq!(gateway.call_count(), 0);
    }
}
