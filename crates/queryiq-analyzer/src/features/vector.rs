//! Feature vector construction
//!
//! The `FeatureVector` is the fixed-shape summary of one query that every
//! downstream consumer (rules, predictor) reads. It is built fresh per
//! analysis and never mutated afterwards; when plan metrics are unknown the
//! plan-derived fields take their neutral values.

use crate::explain::PlanMetrics;
use crate::features::lexical::LexicalFeatures;
use queryiq_core::QueryStats;
use serde::{Deserialize, Serialize};

/// Number of entries in the model input layout produced by
/// [`FeatureVector::as_model_inputs`]
pub const MODEL_INPUT_LEN: usize = 14;

/// Weights for the complexity score linear combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityWeights {
    /// Weight per JOIN keyword
    pub joins: f64,
    /// Weight per subquery
    pub subqueries: f64,
    /// Weight per level of plan depth
    pub plan_depth: f64,
    /// Weight per character of query text
    pub query_length: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            joins: 2.0,
            subqueries: 3.0,
            plan_depth: 1.5,
            query_length: 0.01,
        }
    }
}

/// Canonical per-query feature record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    // Lexical fields
    pub num_select: u32,
    pub num_join: u32,
    pub num_subqueries: u32,
    pub num_group_by: u32,
    pub num_order_by: u32,
    pub num_distinct: u32,
    pub num_limit: u32,
    pub query_length: u32,
    pub has_select_star: bool,
    pub has_where_clause: bool,

    // Plan-derived fields (neutral when no plan metrics are available)
    pub plan_depth: u32,
    /// Fraction of scan nodes going through an index, in [0, 1].
    /// 1.0 when the plan has no scans at all (or is unknown).
    pub indexed_scan_ratio: f64,
    pub complexity_score: f64,

    /// True when the observed mean execution time exceeds the slow-query
    /// threshold
    pub is_slow_query: bool,
}

impl FeatureVector {
    /// Flattens the vector into the fixed numeric layout the prediction
    /// model consumes. Booleans become 0.0/1.0. The order here is the model
    /// artifact contract; trained weights are positional.
    pub fn as_model_inputs(&self) -> [f64; MODEL_INPUT_LEN] {
        [
            f64::from(self.num_select),
            f64::from(self.num_join),
            f64::from(self.num_subqueries),
            f64::from(self.num_group_by),
            f64::from(self.num_order_by),
            f64::from(self.num_distinct),
            f64::from(self.num_limit),
            f64::from(self.query_length),
            f64::from(u8::from(self.has_select_star)),
            f64::from(u8::from(self.has_where_clause)),
            f64::from(self.plan_depth),
            self.indexed_scan_ratio,
            self.complexity_score,
            f64::from(u8::from(self.is_slow_query)),
        ]
    }
}

/// Builds feature vectors from query text, plan metrics, and historical
/// statistics
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    weights: ComplexityWeights,
    slow_query_threshold_ms: f64,
}

impl FeatureExtractor {
    /// Creates an extractor with default complexity weights
    pub fn new(slow_query_threshold_ms: f64) -> Self {
        Self {
            weights: ComplexityWeights::default(),
            slow_query_threshold_ms,
        }
    }

    /// Builder method: override the complexity weights
    pub fn with_weights(mut self, weights: ComplexityWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Extracts the full feature vector for one query.
    ///
    /// Lexical fields come from the text alone; plan fields fall back to
    /// neutral values when `metrics` carries no plan information.
    pub fn extract(
        &self,
        query_text: &str,
        metrics: &PlanMetrics,
        stats: Option<&QueryStats>,
    ) -> FeatureVector {
        let lexical = LexicalFeatures::scan(query_text);

        let plan_depth = metrics.depth.unwrap_or(0);
        let indexed_scan_ratio = metrics.indexed_scan_ratio();
        let complexity_score = self.weights.joins * f64::from(lexical.num_join)
            + self.weights.subqueries * f64::from(lexical.num_subqueries)
            + self.weights.plan_depth * f64::from(plan_depth)
            + self.weights.query_length * f64::from(lexical.query_length);

        let is_slow_query = stats
            .map(|s| s.mean_exec_time_ms > self.slow_query_threshold_ms)
            .unwrap_or(false);

        FeatureVector {
            num_select: lexical.num_select,
            num_join: lexical.num_join,
            num_subqueries: lexical.num_subqueries,
            num_group_by: lexical.num_group_by,
            num_order_by: lexical.num_order_by,
            num_distinct: lexical.num_distinct,
            num_limit: lexical.num_limit,
            query_length: lexical.query_length,
            has_select_star: lexical.has_select_star,
            has_where_clause: lexical.has_where_clause,
            plan_depth,
            indexed_scan_ratio,
            complexity_score,
            is_slow_query,
        }
    }
}
