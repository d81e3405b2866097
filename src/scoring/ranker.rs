//! Top-K selection with an optional pinned reference entry

use super::engine::ScoredRecord;
use crate::postal::PostalCode;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Standard result size
pub const DEFAULT_TOP_K: usize = 5;

pub struct Ranker {
    k: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl Ranker {
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Dedupe (first row per code wins), sort by score descending with ties
    /// broken by code ascending, keep the top `k`, then express each score as
    /// a percentage of the top score.
    pub fn rank(&self, scored: Vec<ScoredRecord>) -> RankedList {
        let mut seen = HashSet::new();
        let mut entries: Vec<ScoredRecord> = scored
            .into_iter()
            .filter(|s| seen.insert(s.code().clone()))
            .collect();

        entries.sort_by(compare_ranked);
        entries.truncate(self.k);

        let max_score = entries
            .iter()
            .map(|s| s.investment_score)
            .fold(f64::NEG_INFINITY, f64::max);

        for entry in &mut entries {
            entry.score_pct = percent_of(entry.investment_score, max_score);
            entry.pinned = false;
        }

        RankedList { entries, max_score }
    }
}

fn compare_ranked(a: &ScoredRecord, b: &ScoredRecord) -> Ordering {
    b.investment_score
        .total_cmp(&a.investment_score)
        .then_with(|| a.code().cmp(b.code()))
}

/// `score / max * 100`, or 0 when there is no positive maximum to scale by
fn percent_of(score: f64, max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        score / max * 100.0
    } else {
        0.0
    }
}

/// Ranked result, top entry first (or the pinned entry, when present)
#[derive(Debug, Clone)]
pub struct RankedList {
    entries: Vec<ScoredRecord>,
    max_score: f64,
}

impl RankedList {
    /// Insert a separately scored reference entry at the front
    ///
    /// The percentage is computed against the top-K maximum fixed by
    /// [`Ranker::rank`], so the existing entries keep their percentages.
    /// Returns false (and changes nothing) when the code is already listed or
    /// an entry is already pinned.
    pub fn pin(&mut self, mut record: ScoredRecord) -> bool {
        if self.contains(record.code()) || self.pinned().is_some() {
            return false;
        }

        record.score_pct = percent_of(record.investment_score, self.max_score);
        record.pinned = true;
        self.entries.insert(0, record);
        true
    }

    pub fn contains(&self, code: &PostalCode) -> bool {
        self.entries.iter().any(|e| e.code() == code)
    }

    pub fn pinned(&self) -> Option<&ScoredRecord> {
        self.entries.iter().find(|e| e.pinned)
    }

    /// Highest raw score among the top-K (the percentage denominator)
    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    pub fn entries(&self) -> &[ScoredRecord] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ScoredRecord> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketRecord;

    fn scored(code: &str, score: f64) -> ScoredRecord {
        ScoredRecord {
            record: MarketRecord {
                median_sale_price: Some(500_000.0),
                ..MarketRecord::empty(PostalCode::parse(code).unwrap())
            },
            dom_score: 0.0,
            demand_score: 0.0,
            price_score: 0.0,
            investment_score: score,
            score_pct: 0.0,
            pinned: false,
        }
    }

    fn codes(list: &RankedList) -> Vec<&str> {
        list.entries().iter().map(|e| e.code().as_str()).collect()
    }

    #[test]
    fn test_sort_truncate_and_tie_break() {
        let ranker = Ranker::new(3);
        let list = ranker.rank(vec![
            scored("20170", 0.2),
            scored("20166", 0.5),
            scored("20165", 0.5),
            scored("20164", 0.9),
            scored("20190", 0.1),
        ]);

        assert_eq!(codes(&list), vec!["20164", "20165", "20166"]);
    }

    #[test]
    fn test_dedupe_keeps_first_seen() {
        let ranker = Ranker::default();
        let list = ranker.rank(vec![
            scored("20164", 0.3),
            scored("20164", 0.9),
            scored("20165", 0.5),
        ]);

        assert_eq!(codes(&list), vec!["20165", "20164"]);
        assert_eq!(list.entries()[1].investment_score, 0.3);
    }

    #[test]
    fn test_top_entry_is_exactly_100_percent() {
        let list = Ranker::default().rank(vec![
            scored("20164", 0.37),
            scored("20165", 0.12),
            scored("20166", 0.29),
        ]);

        assert_eq!(list.entries()[0].score_pct, 100.0);
        assert!(list.entries().iter().all(|e| e.score_pct <= 100.0));
    }

    #[test]
    fn test_non_positive_max_gives_zero_percent() {
        let list = Ranker::default().rank(vec![scored("20164", 0.0), scored("20165", -0.1)]);
        assert!(list.entries().iter().all(|e| e.score_pct == 0.0));
    }

    #[test]
    fn test_pin_prepends_without_rescaling() {
        let mut list = Ranker::new(2).rank(vec![
            scored("20164", 0.8),
            scored("20165", 0.4),
            scored("20166", 0.1),
        ]);
        let before: Vec<f64> = list.entries().iter().map(|e| e.score_pct).collect();

        assert!(list.pin(scored("20166", 1.6)));

        assert_eq!(codes(&list), vec!["20166", "20164", "20165"]);
        let pinned = list.pinned().unwrap();
        assert_eq!(pinned.score_pct, 200.0);
        let after: Vec<f64> = list.entries()[1..].iter().map(|e| e.score_pct).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_pin_is_noop_when_already_in_top_k() {
        let mut list = Ranker::new(2).rank(vec![scored("20164", 0.8), scored("20165", 0.4)]);

        assert!(!list.pin(scored("20165", 0.4)));
        assert_eq!(list.len(), 2);
        assert!(list.pinned().is_none());
    }

    #[test]
    fn test_output_bounded_and_unique() {
        let ranker = Ranker::new(5);
        let batch: Vec<ScoredRecord> = (0..20)
            .map(|i| scored(&format!("{:05}", 20100 + (i % 12)), i as f64 / 20.0))
            .collect();
        let mut list = ranker.rank(batch);

        list.pin(scored("99999", 0.01));
        list.pin(scored("88888", 0.02));

        assert!(list.len() <= ranker.k() + 1);
        let mut seen = HashSet::new();
        assert!(list.entries().iter().all(|e| seen.insert(e.code().clone())));
    }
}
