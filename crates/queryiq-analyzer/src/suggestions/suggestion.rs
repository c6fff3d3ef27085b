//! Suggestion data model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of optimization suggestion
///
/// The derived ordering is the final presentation tiebreak, so the variant
/// order here is part of the output contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    /// Replace SELECT * with an explicit column list
    NarrowProjection,
    /// Unfiltered access to a large relation
    MissingFilter,
    /// A sequential scan that an index could serve
    IndexRecommendation,
    /// Too many joins in one statement
    JoinComplexity,
    /// Subqueries that could be rewritten as joins
    SubqueryFlattening,
    /// Observed mean execution time over the slow-query threshold
    SlowExecution,
    /// Hot query worth caching
    CachingCandidate,
    /// Execution plan nested deeper than the advisory threshold
    DeepPlan,
    /// Predicted and observed execution times disagree
    PerformanceDeviation,
}

impl SuggestionType {
    /// Returns a short human-readable description of this suggestion type
    pub fn description(&self) -> &'static str {
        match self {
            Self::NarrowProjection => "Replace SELECT * with specific columns",
            Self::MissingFilter => "Full-table access without a filter",
            Self::IndexRecommendation => "Consider adding an index",
            Self::JoinComplexity => "Query joins many relations",
            Self::SubqueryFlattening => "Subqueries could be rewritten as joins",
            Self::SlowExecution => "Query exceeds the slow-query threshold",
            Self::CachingCandidate => "Frequently executed query",
            Self::DeepPlan => "Execution plan is deeply nested",
            Self::PerformanceDeviation => "Predicted and observed times diverge",
        }
    }
}

/// Which engine produced a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Deterministic heuristic rule
    Rule,
    /// Prediction model
    Model,
}

/// Effort bucket for acting on a suggestion
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationCost {
    Low,
    Medium,
    High,
}

/// A single optimization suggestion
///
/// Identity for deduplication is `(query_id, suggestion_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Query this suggestion belongs to
    pub query_id: Uuid,
    /// Type of suggestion
    pub suggestion_type: SuggestionType,
    /// Human-readable message explaining the issue
    pub message: String,
    /// Reliability estimate in [0, 1] (clamped on construction)
    pub confidence: f64,
    /// Which engine produced this suggestion
    pub source: SuggestionSource,
    /// Estimated saving in milliseconds, when a cost basis exists
    pub estimated_improvement_ms: Option<f64>,
    /// Effort bucket for acting on the suggestion
    pub implementation_cost: ImplementationCost,
}

impl Suggestion {
    /// Creates a new suggestion with no improvement estimate
    pub fn new(
        query_id: Uuid,
        suggestion_type: SuggestionType,
        source: SuggestionSource,
        message: impl Into<String>,
        confidence: f64,
        implementation_cost: ImplementationCost,
    ) -> Self {
        Self {
            query_id,
            suggestion_type,
            message: message.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source,
            estimated_improvement_ms: None,
            implementation_cost,
        }
    }

    /// Builder method: set the estimated improvement (clamped non-negative)
    pub fn with_improvement_ms(mut self, ms: f64) -> Self {
        self.estimated_improvement_ms = Some(ms.max(0.0));
        self
    }

    /// Builder method: set an optional improvement estimate
    pub fn with_improvement(mut self, ms: Option<f64>) -> Self {
        self.estimated_improvement_ms = ms.map(|v| v.max(0.0));
        self
    }
}
