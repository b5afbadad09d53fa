//! Parse statistics
//!
//! Counters collected while a parse runs: how many expressions were
//! evaluated, how effective the memo table was, and which ordered-choice
//! alternatives matched in each rule.

use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket used for choices where no alternative matched.
pub const NO_MATCH: &str = "no match";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseStats {
    /// Number of expressions evaluated, memo hits excluded
    pub expressions: u64,

    /// Number of memo table hits
    pub memo_hits: u64,

    /// Number of memo table misses
    pub memo_misses: u64,

    /// Rule name to matching alternative (1-based, or [`NO_MATCH`]) to count.
    /// Choices inside the same rule share the rule's buckets.
    pub choice_alternatives: BTreeMap<String, BTreeMap<String, u64>>,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one evaluation and return the new total
    pub fn record_expression(&mut self) -> u64 {
        self.expressions += 1;
        self.expressions
    }

    pub fn record_hit(&mut self) {
        self.memo_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.memo_misses += 1;
    }

    /// Record which alternative of a choice matched, `None` if none did
    pub fn record_choice(&mut self, rule: &str, alternative: Option<usize>) {
        let bucket = match alternative {
            Some(index) => (index + 1).to_string(),
            None => NO_MATCH.to_string(),
        };
        *self
            .choice_alternatives
            .entry(rule.to_string())
            .or_default()
            .entry(bucket)
            .or_insert(0) += 1;
    }

    /// Get memo hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memo_hits as f64;
        let total = hits + self.memo_misses as f64;

        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let mut stats = ParseStats::new();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.25);
    }

    #[test]
    fn test_choice_buckets() {
        let mut stats = ParseStats::new();
        stats.record_choice("Block", Some(0));
        stats.record_choice("Block", Some(0));
        stats.record_choice("Block", None);
        let block = &stats.choice_alternatives["Block"];
        assert_eq!(block["1"], 2);
        assert_eq!(block[NO_MATCH], 1);
    }

    #[test]
    fn test_record_expression_returns_total() {
        let mut stats = ParseStats::new();
        assert_eq!(stats.record_expression(), 1);
        assert_eq!(stats.record_expression(), 2);
        assert_eq!(stats.expressions, 2);
    }
}
