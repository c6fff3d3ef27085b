//! Query Analyzer - the analysis entry point
//!
//! Wires the pipeline together: plan parsing, metric derivation, feature
//! extraction, rule evaluation, prediction, and suggestion synthesis.
//! Analysis is stateless per invocation; the only shared state is the
//! read-mostly model registry, so distinct queries can be analyzed from
//! any number of threads concurrently.
//!
//! # Example
//!
//! ```
//! use queryiq_analyzer::{QueryAnalyzer, SuggestionType};
//! use serde_json::json;
//!
//! let analyzer = QueryAnalyzer::new();
//! let plan = json!([{"Plan": {"Node Type": "Seq Scan", "Relation Name": "users",
//!     "Startup Cost": 0.0, "Total Cost": 1200.0, "Plan Rows": 50000}}]);
//!
//! let suggestions = analyzer
//!     .analyze("SELECT * FROM users WHERE age > 25", Some(&plan), None)
//!     .unwrap();
//! assert!(suggestions.iter().any(|s| s.suggestion_type == SuggestionType::NarrowProjection));
//! ```

use crate::explain::{self, PlanMetrics};
use crate::features::{ComplexityWeights, FeatureExtractor, FeatureVector};
use crate::prediction::{ModelRegistry, PredictionEngine, PredictionModel, PredictionResult};
use crate::rules::{self, RuleContext};
use crate::suggestions::{Suggestion, synthesize};
use queryiq_core::{QueryIqError, QueryStats, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Configuration for the query analyzer
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalyzerConfig {
    /// Mean execution time above which a query counts as slow (ms)
    pub slow_query_threshold_ms: f64,
    /// Row count above which a sequentially scanned relation counts as large
    pub large_relation_row_threshold: f64,
    /// Weights for the complexity score
    pub complexity_weights: ComplexityWeights,
    /// Maximum number of suggestions returned per analysis
    pub max_suggestions: usize,
    /// Predicted/observed ratio beyond which a deviation is reported
    pub deviation_ratio_threshold: f64,
    /// Call count above which a query counts as hot
    pub high_call_count_threshold: u64,
    /// Plan depth above which the plan counts as deep
    pub deep_plan_threshold: u32,
    /// Fallback estimator: base latency (ms)
    pub fallback_base_latency_ms: f64,
    /// Fallback estimator: milliseconds per complexity unit
    pub fallback_scaling_factor: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 1000.0,
            large_relation_row_threshold: 10_000.0,
            complexity_weights: ComplexityWeights::default(),
            max_suggestions: 10,
            deviation_ratio_threshold: 2.0,
            high_call_count_threshold: 1000,
            deep_plan_threshold: 5,
            fallback_base_latency_ms: 50.0,
            fallback_scaling_factor: 20.0,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the slow-query threshold
    pub fn with_slow_query_threshold_ms(mut self, ms: f64) -> Self {
        self.slow_query_threshold_ms = ms;
        self
    }

    /// Builder method: set the large-relation row threshold
    pub fn with_large_relation_row_threshold(mut self, rows: f64) -> Self {
        self.large_relation_row_threshold = rows;
        self
    }

    /// Builder method: set the complexity weights
    pub fn with_complexity_weights(mut self, weights: ComplexityWeights) -> Self {
        self.complexity_weights = weights;
        self
    }

    /// Builder method: set the maximum suggestion count
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Builder method: set the deviation ratio threshold
    pub fn with_deviation_ratio_threshold(mut self, ratio: f64) -> Self {
        self.deviation_ratio_threshold = ratio;
        self
    }

    /// Builder method: set the hot-query call count threshold
    pub fn with_high_call_count_threshold(mut self, calls: u64) -> Self {
        self.high_call_count_threshold = calls;
        self
    }

    /// Builder method: set the deep-plan threshold
    pub fn with_deep_plan_threshold(mut self, depth: u32) -> Self {
        self.deep_plan_threshold = depth;
        self
    }
}

/// The query analysis and suggestion engine
pub struct QueryAnalyzer {
    config: AnalyzerConfig,
    extractor: FeatureExtractor,
    registry: Arc<ModelRegistry>,
    prediction: PredictionEngine,
}

impl Default for QueryAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryAnalyzer {
    /// Creates an analyzer with default config and an empty model registry
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Creates an analyzer with a custom config
    pub fn with_config(config: AnalyzerConfig) -> Self {
        let registry = Arc::new(ModelRegistry::new());
        Self::with_registry(config, registry)
    }

    /// Creates an analyzer sharing an existing model registry
    pub fn with_registry(config: AnalyzerConfig, registry: Arc<ModelRegistry>) -> Self {
        let extractor = FeatureExtractor::new(config.slow_query_threshold_ms)
            .with_weights(config.complexity_weights);
        let prediction = PredictionEngine::new(Arc::clone(&registry))
            .with_fallback(config.fallback_base_latency_ms, config.fallback_scaling_factor)
            .with_deviation_ratio(config.deviation_ratio_threshold);
        Self {
            config,
            extractor,
            registry,
            prediction,
        }
    }

    /// Returns the analyzer config
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Returns the model registry for lifecycle management
    pub fn model_registry(&self) -> Arc<ModelRegistry> {
        Arc::clone(&self.registry)
    }

    /// Validates and installs a prediction model. On failure the previous
    /// model (or the fallback estimator) stays active.
    pub fn load_model(&self, model: Arc<dyn PredictionModel>) -> Result<()> {
        self.registry
            .load(model)
            .map_err(|err| QueryIqError::Model(err.to_string()))
    }

    /// Predicts the execution time for an already-extracted feature vector.
    /// Never fails.
    pub fn predict(&self, features: &FeatureVector) -> PredictionResult {
        self.prediction.predict(features)
    }

    /// Analyzes one query under a fresh query id
    pub fn analyze(
        &self,
        query_text: &str,
        plan_json: Option<&Value>,
        stats: Option<&QueryStats>,
    ) -> Result<Vec<Suggestion>> {
        self.analyze_with_id(Uuid::new_v4(), query_text, plan_json, stats)
    }

    /// Analyzes one query under a caller-supplied query id.
    ///
    /// Fails only on empty query text. A missing or malformed plan degrades
    /// to lexical-only analysis; model faults degrade to the fallback
    /// estimator.
    pub fn analyze_with_id(
        &self,
        query_id: Uuid,
        query_text: &str,
        plan_json: Option<&Value>,
        stats: Option<&QueryStats>,
    ) -> Result<Vec<Suggestion>> {
        if query_text.trim().is_empty() {
            return Err(QueryIqError::InvalidQuery(
                "query text is empty".to_string(),
            ));
        }

        let metrics = self.plan_metrics(query_id, plan_json);
        let features = self.extractor.extract(query_text, &metrics, stats);

        let ctx = RuleContext {
            query_id,
            query_text,
            features: &features,
            metrics: &metrics,
            stats,
            config: &self.config,
        };
        let mut candidates = rules::evaluate(&ctx);

        let (prediction, model_suggestions) = self.prediction.suggest(query_id, &features, stats);
        debug!(
            %query_id,
            predicted_time_ms = prediction.predicted_time_ms,
            model_version = %prediction.model_version,
            candidates = candidates.len() + model_suggestions.len(),
            "query analyzed"
        );
        candidates.extend(model_suggestions);

        Ok(synthesize(candidates, self.config.max_suggestions))
    }

    fn plan_metrics(&self, query_id: Uuid, plan_json: Option<&Value>) -> PlanMetrics {
        let Some(value) = plan_json else {
            return PlanMetrics::unknown();
        };
        match explain::parse_plan(value) {
            Ok(plan) => {
                if plan.truncated {
                    warn!(%query_id, "execution plan exceeded traversal limits, metrics truncated");
                }
                explain::compute_metrics(&plan, self.config.large_relation_row_threshold)
            }
            Err(err) => {
                warn!(%query_id, error = %err, "malformed execution plan, continuing without plan metrics");
                PlanMetrics::unknown()
            }
        }
    }
}

impl std::fmt::Debug for QueryAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryAnalyzer")
            .field("config", &self.config)
            .field("model_loaded", &self.registry.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests;
