//! Prediction model contract
//!
//! The engine consumes trained artifacts through the `PredictionModel`
//! trait; training them is someone else's job. `LinearModel` is the shipped
//! artifact format: a regression over the fixed feature layout of
//! [`FeatureVector::as_model_inputs`].

use crate::features::{FeatureVector, MODEL_INPUT_LEN};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by model validation or evaluation
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Weight shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Non-finite model parameter: {0}")]
    NonFiniteParameter(&'static str),

    #[error("Model produced a non-finite prediction")]
    NonFiniteOutput,

    #[error("Confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// A trained execution-time predictor
///
/// Implementations must be cheap to evaluate and free of interior mutability;
/// the registry shares one instance across all concurrent analyses.
pub trait PredictionModel: Send + Sync {
    /// Identifier of this artifact (training run, version tag, ...)
    fn version(&self) -> &str;

    /// The model's own reliability estimate in [0, 1]
    fn confidence(&self) -> f64;

    /// Checks the artifact is structurally sound before it is installed
    fn validate(&self) -> Result<(), ModelError>;

    /// Predicts the execution time in milliseconds for one feature vector
    fn evaluate(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

/// Linear regression artifact over the fixed feature layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One weight per entry of the model input layout
    pub weights: Vec<f64>,
    /// Intercept in milliseconds
    pub bias: f64,
    /// Artifact identifier
    pub version: String,
    /// Reliability reported with every prediction
    pub confidence: f64,
}

impl LinearModel {
    /// Creates a new linear artifact
    pub fn new(weights: Vec<f64>, bias: f64, version: impl Into<String>, confidence: f64) -> Self {
        Self {
            weights,
            bias,
            version: version.into(),
            confidence,
        }
    }
}

impl PredictionModel for LinearModel {
    fn version(&self) -> &str {
        &self.version
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.weights.len() != MODEL_INPUT_LEN {
            return Err(ModelError::ShapeMismatch {
                expected: MODEL_INPUT_LEN,
                actual: self.weights.len(),
            });
        }
        if !self.weights.iter().all(|w| w.is_finite()) {
            return Err(ModelError::NonFiniteParameter("weights"));
        }
        if !self.bias.is_finite() {
            return Err(ModelError::NonFiniteParameter("bias"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ModelError::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }

    fn evaluate(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let inputs = features.as_model_inputs();
        if self.weights.len() != inputs.len() {
            return Err(ModelError::ShapeMismatch {
                expected: inputs.len(),
                actual: self.weights.len(),
            });
        }

        let dot: f64 = self
            .weights
            .iter()
            .zip(inputs.iter())
            .map(|(w, x)| w * x)
            .sum();
        let predicted = dot + self.bias;
        if !predicted.is_finite() {
            return Err(ModelError::NonFiniteOutput);
        }
        Ok(predicted.max(0.0))
    }
}
