//! Plan Metrics - derived summary of a parsed execution plan
//!
//! `PlanMetrics` is the only view of the plan the downstream stages see.
//! When the plan is missing or malformed the engine substitutes
//! `PlanMetrics::unknown()` and analysis continues on lexical features alone.

use crate::explain::plan::{NodeType, ScanKind};
use crate::explain::postgres::ParsedPlan;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable summary metrics for one execution plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    /// Root total cost
    pub total_cost: Option<f64>,
    /// Root actual execution time in milliseconds, when the plan was analyzed
    pub actual_time_ms: Option<f64>,
    /// Maximum root-to-leaf edge count (a lone root has depth 0)
    pub depth: Option<u32>,
    /// Occurrences of each scan kind across the entire tree
    pub scan_type_counts: BTreeMap<ScanKind, u32>,
    /// Number of join nodes in the tree
    pub join_count: u32,
    /// True when any sequential scan reads past the large-relation threshold
    pub has_seq_scan_on_large_relation: bool,
    /// Relations hit by such large sequential scans, sorted and deduplicated
    pub large_scan_relations: Vec<String>,
    /// True when the parser dropped part of an over-deep or over-wide plan
    pub truncated: bool,
}

impl PlanMetrics {
    /// The degraded all-unknown value used when no plan is available or the
    /// plan input was malformed.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Returns true when these metrics carry no plan information
    pub fn is_unknown(&self) -> bool {
        self.depth.is_none()
    }

    /// Total number of scan-classified nodes
    pub fn scan_count(&self) -> u32 {
        self.scan_type_counts.values().sum()
    }

    /// Fraction of scans that go through an index structure.
    ///
    /// Defined as 1.0 when there are no scan nodes at all: a plan that scans
    /// nothing is vacuously well-indexed, and the ratio stays in [0, 1].
    pub fn indexed_scan_ratio(&self) -> f64 {
        let total = self.scan_count();
        if total == 0 {
            return 1.0;
        }
        let indexed: u32 = self
            .scan_type_counts
            .iter()
            .filter(|(kind, _)| kind.uses_index())
            .map(|(_, count)| count)
            .sum();
        f64::from(indexed) / f64::from(total)
    }
}

/// Derives summary metrics from a parsed plan.
///
/// The traversal is iterative (explicit stack), so plan depth never
/// translates into call-stack depth.
pub fn compute_metrics(plan: &ParsedPlan, large_relation_row_threshold: f64) -> PlanMetrics {
    let mut metrics = PlanMetrics {
        total_cost: Some(plan.root.cost.total),
        actual_time_ms: plan.root.actual_time_ms,
        depth: Some(0),
        truncated: plan.truncated,
        ..PlanMetrics::default()
    };

    let mut max_depth = 0u32;
    let mut stack = vec![(&plan.root, 0u32)];
    while let Some((node, depth)) = stack.pop() {
        max_depth = max_depth.max(depth);

        if let Some(kind) = node.node_type.scan_kind() {
            *metrics.scan_type_counts.entry(kind).or_insert(0) += 1;
        }
        if node.node_type.is_join() {
            metrics.join_count += 1;
        }
        if node.node_type == NodeType::SeqScan
            && node.effective_rows() > large_relation_row_threshold
        {
            metrics.has_seq_scan_on_large_relation = true;
            if let Some(relation) = &node.relation {
                metrics.large_scan_relations.push(relation.clone());
            }
        }

        for child in &node.children {
            stack.push((child, depth + 1));
        }
    }

    metrics.depth = Some(max_depth);
    metrics.large_scan_relations.sort();
    metrics.large_scan_relations.dedup();
    metrics
}
