//! Prediction Module
//!
//! Estimates query execution time from the feature vector. A trained model
//! artifact can be hot-swapped into the registry at any time; when none is
//! loaded (or the loaded one misbehaves) a deterministic heuristic estimator
//! answers instead, so prediction never fails.

pub mod model;
pub mod predictor;
pub mod registry;

pub use model::{LinearModel, ModelError, PredictionModel};
pub use predictor::{FALLBACK_MODEL_VERSION, PredictionEngine, PredictionResult};
pub use registry::ModelRegistry;
