//! Historical query execution statistics
//!
//! The statistics collector polls the database (e.g. `pg_stat_statements`)
//! and hands the engine one snapshot per query. The engine only reads these
//! values; it never refreshes them itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observed execution statistics for a single recorded query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Mean execution time in milliseconds
    pub mean_exec_time_ms: f64,
    /// Cumulative execution time in milliseconds across all calls
    pub total_exec_time_ms: f64,
    /// Number of recorded executions
    pub calls: u64,
    /// When the collector captured this snapshot
    pub captured_at: Option<DateTime<Utc>>,
}

impl QueryStats {
    /// Create empty QueryStats
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the mean execution time
    pub fn with_mean_exec_time_ms(mut self, time_ms: f64) -> Self {
        self.mean_exec_time_ms = time_ms;
        self
    }

    /// Builder method: set the cumulative execution time
    pub fn with_total_exec_time_ms(mut self, time_ms: f64) -> Self {
        self.total_exec_time_ms = time_ms;
        self
    }

    /// Builder method: set the call count
    pub fn with_calls(mut self, calls: u64) -> Self {
        self.calls = calls;
        self
    }

    /// Builder method: set the capture timestamp
    pub fn with_captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }

    /// True when the query has been observed at least once
    pub fn has_observations(&self) -> bool {
        self.calls > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder() {
        let stats = QueryStats::new()
            .with_mean_exec_time_ms(120.5)
            .with_total_exec_time_ms(6025.0)
            .with_calls(50);

        assert_eq!(stats.mean_exec_time_ms, 120.5);
        assert_eq!(stats.total_exec_time_ms, 6025.0);
        assert_eq!(stats.calls, 50);
        assert!(stats.captured_at.is_none());
        assert!(stats.has_observations());
    }

    #[test]
    fn test_empty_snapshot_has_no_observations() {
        assert!(!QueryStats::new().has_observations());
    }

    #[test]
    fn test_serialization_round_trip() {
        let stats = QueryStats::new().with_mean_exec_time_ms(3.25).with_calls(7);
        let json = serde_json::to_string(&stats).unwrap();
        let parsed: QueryStats = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stats);
    }
}
