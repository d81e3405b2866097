//! Investment scoring over one candidate batch
//!
//! Every statistic used here (fill medians, maxima) is computed over the batch
//! passed to [`ScoreEngine::score`], never over the whole market table. Scores
//! are therefore only comparable within one query's result.

use crate::market::MarketRecord;

/// Weights of the three sub-scores in the composite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub dom: f64,
    pub demand: f64,
    pub price: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            dom: 0.4,
            demand: 0.4,
            price: 0.2,
        }
    }
}

/// A market record after null filling and scoring
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    /// Source row with `homes_sold`, `inventory` and `days_on_market` filled
    pub record: MarketRecord,
    pub dom_score: f64,
    pub demand_score: f64,
    pub price_score: f64,
    /// Raw weighted composite
    pub investment_score: f64,
    /// Composite as a percentage of the displayed maximum (set by the ranker)
    pub score_pct: f64,
    /// Reference entry added outside the top-K
    pub pinned: bool,
}

impl ScoredRecord {
    pub fn code(&self) -> &crate::postal::PostalCode {
        &self.record.code
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    weights: ScoreWeights,
}

impl ScoreEngine {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Score one batch of market rows
    ///
    /// # Null handling
    /// - rows without `median_sale_price` are dropped
    /// - `inventory` → batch median of present values
    /// - `homes_sold` → 0 (no recorded sales)
    /// - `days_on_market` → batch median of present values
    ///
    /// A median over zero present values falls back to 0.
    ///
    /// # Sub-scores
    /// - dom: `1 - dom / max(dom)` (faster selling is better)
    /// - demand: `homes_sold / (inventory + 1)` (sell-through)
    /// - price: `1 - price / max(price)` (cheaper is better)
    pub fn score(&self, records: Vec<MarketRecord>) -> Vec<ScoredRecord> {
        let total = records.len();
        let mut batch: Vec<MarketRecord> = records
            .into_iter()
            .filter(|r| r.is_scorable())
            .collect();
        if batch.len() < total {
            log::debug!(
                "🧹 Dropped {} rows without median sale price before scoring",
                total - batch.len()
            );
        }
        if batch.is_empty() {
            return Vec::new();
        }

        let inventory_fill = median(batch.iter().filter_map(|r| r.inventory)).unwrap_or(0.0);
        let dom_fill = median(batch.iter().filter_map(|r| r.days_on_market)).unwrap_or(0.0);

        for record in &mut batch {
            record.inventory.get_or_insert(inventory_fill);
            record.homes_sold.get_or_insert(0.0);
            record.days_on_market.get_or_insert(dom_fill);
        }

        let max_dom = max(batch.iter().filter_map(|r| r.days_on_market));
        let max_price = max(batch.iter().filter_map(|r| r.median_sale_price));

        batch
            .into_iter()
            .map(|record| {
                let dom = record.days_on_market.unwrap_or(dom_fill);
                let sold = record.homes_sold.unwrap_or(0.0);
                let inventory = record.inventory.unwrap_or(inventory_fill);
                let price = record.median_sale_price.unwrap_or(0.0);

                let dom_score = 1.0 - ratio(dom, max_dom);
                let demand_score = sold / (inventory + 1.0);
                let price_score = 1.0 - ratio(price, max_price);

                let investment_score = self.weights.dom * dom_score
                    + self.weights.demand * demand_score
                    + self.weights.price * price_score;

                ScoredRecord {
                    record,
                    dom_score,
                    demand_score,
                    price_score,
                    investment_score,
                    score_pct: 0.0,
                    pinned: false,
                }
            })
            .collect()
    }
}

/// `value / max`, or 0 when the batch maximum is not positive
fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

fn max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

/// Median with the even-count convention of averaging the middle pair
pub fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
