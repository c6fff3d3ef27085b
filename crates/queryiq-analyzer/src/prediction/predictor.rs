//! Prediction engine
//!
//! Wraps the model registry with the never-fails prediction contract and
//! the deviation check against historically observed execution times.

use crate::features::FeatureVector;
use crate::prediction::registry::ModelRegistry;
use crate::suggestions::{ImplementationCost, Suggestion, SuggestionSource, SuggestionType};
use queryiq_core::QueryStats;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Version tag reported when the heuristic estimator answered
pub const FALLBACK_MODEL_VERSION: &str = "heuristic-fallback";

/// Confidence reported by the heuristic estimator
const FALLBACK_CONFIDENCE: f64 = 0.25;

/// Outcome of one execution-time prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted execution time in milliseconds (non-negative)
    pub predicted_time_ms: f64,
    /// Reliability estimate in [0, 1]
    pub confidence: f64,
    /// Identifier of the artifact that answered
    pub model_version: String,
}

impl PredictionResult {
    fn new(predicted_time_ms: f64, confidence: f64, model_version: impl Into<String>) -> Self {
        Self {
            predicted_time_ms: predicted_time_ms.max(0.0),
            confidence: confidence.clamp(0.0, 1.0),
            model_version: model_version.into(),
        }
    }

    /// True when the heuristic estimator produced this result
    pub fn is_fallback(&self) -> bool {
        self.model_version == FALLBACK_MODEL_VERSION
    }
}

/// Execution-time predictor with heuristic fallback
pub struct PredictionEngine {
    registry: Arc<ModelRegistry>,
    base_latency_ms: f64,
    scaling_factor: f64,
    deviation_ratio_threshold: f64,
}

impl PredictionEngine {
    /// Creates an engine over the given registry with default fallback
    /// constants
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            base_latency_ms: 50.0,
            scaling_factor: 20.0,
            deviation_ratio_threshold: 2.0,
        }
    }

    /// Builder method: override the fallback estimator constants
    pub fn with_fallback(mut self, base_latency_ms: f64, scaling_factor: f64) -> Self {
        self.base_latency_ms = base_latency_ms;
        self.scaling_factor = scaling_factor;
        self
    }

    /// Builder method: override the deviation ratio threshold
    pub fn with_deviation_ratio(mut self, ratio: f64) -> Self {
        self.deviation_ratio_threshold = ratio;
        self
    }

    /// Returns the registry this engine reads from
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Predicts the execution time for one feature vector. Never fails:
    /// a missing or misbehaving model falls back to the heuristic estimator.
    pub fn predict(&self, features: &FeatureVector) -> PredictionResult {
        if let Some(model) = self.registry.snapshot() {
            match model.evaluate(features) {
                Ok(ms) => {
                    return PredictionResult::new(ms, model.confidence(), model.version());
                }
                Err(err) => {
                    warn!(
                        model = model.version(),
                        error = %err,
                        "model evaluation failed, using heuristic fallback"
                    );
                }
            }
        }
        self.fallback(features)
    }

    /// Predicts and, when the result disagrees with the observed mean by
    /// more than the configured ratio, emits a deviation suggestion.
    pub fn suggest(
        &self,
        query_id: Uuid,
        features: &FeatureVector,
        stats: Option<&QueryStats>,
    ) -> (PredictionResult, Vec<Suggestion>) {
        let prediction = self.predict(features);
        let mut suggestions = Vec::new();
        if let Some(suggestion) = self.deviation_suggestion(query_id, &prediction, stats) {
            suggestions.push(suggestion);
        }
        (prediction, suggestions)
    }

    fn fallback(&self, features: &FeatureVector) -> PredictionResult {
        PredictionResult::new(
            self.base_latency_ms + features.complexity_score * self.scaling_factor,
            FALLBACK_CONFIDENCE,
            FALLBACK_MODEL_VERSION,
        )
    }

    fn deviation_suggestion(
        &self,
        query_id: Uuid,
        prediction: &PredictionResult,
        stats: Option<&QueryStats>,
    ) -> Option<Suggestion> {
        let stats = stats?;
        if !stats.has_observations() || stats.mean_exec_time_ms <= 0.0 {
            return None;
        }

        let observed = stats.mean_exec_time_ms;
        let predicted = prediction.predicted_time_ms.max(f64::EPSILON);
        let ratio = (predicted / observed).max(observed / predicted);
        if ratio <= self.deviation_ratio_threshold {
            return None;
        }

        Some(
            Suggestion::new(
                query_id,
                SuggestionType::PerformanceDeviation,
                SuggestionSource::Model,
                format!(
                    "Observed mean execution time {:.1} ms diverges from the predicted {:.1} ms ({}); statistics or plan may be stale",
                    observed,
                    prediction.predicted_time_ms,
                    prediction.model_version
                ),
                prediction.confidence,
                ImplementationCost::Low,
            )
            .with_improvement_ms((observed - prediction.predicted_time_ms).abs()),
        )
    }
}

impl std::fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("base_latency_ms", &self.base_latency_ms)
            .field("scaling_factor", &self.scaling_factor)
            .field("deviation_ratio_threshold", &self.deviation_ratio_threshold)
            .field("model_loaded", &self.registry.is_loaded())
            .finish()
    }
}
