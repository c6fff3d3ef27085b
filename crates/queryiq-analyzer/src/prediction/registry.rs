//! Model registry with atomic hot-swap
//!
//! Single-writer/many-readers: `load` replaces the shared `Arc` under a
//! brief write lock, `snapshot` clones it under a read lock. Evaluation
//! happens on the clone, so predictions in flight keep the artifact they
//! started with and never block a load (or vice versa).

use crate::prediction::model::{ModelError, PredictionModel};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared holder for the currently active prediction model
#[derive(Default)]
pub struct ModelRegistry {
    current: RwLock<Option<Arc<dyn PredictionModel>>>,
}

impl ModelRegistry {
    /// Creates an empty registry (fallback estimator answers predictions)
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and installs a model, replacing the previous one.
    ///
    /// On validation failure the previous model (or the fallback) stays
    /// active.
    pub fn load(&self, model: Arc<dyn PredictionModel>) -> Result<(), ModelError> {
        model.validate()?;
        *self.current.write() = Some(model);
        Ok(())
    }

    /// Removes the active model; the fallback estimator takes over
    pub fn unload(&self) {
        *self.current.write() = None;
    }

    /// Returns the active model, if any. The clone is independent of later
    /// swaps.
    pub fn snapshot(&self) -> Option<Arc<dyn PredictionModel>> {
        self.current.read().clone()
    }

    /// Returns true when a trained model is installed
    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Version of the active model, if any
    pub fn active_version(&self) -> Option<String> {
        self.current.read().as_ref().map(|m| m.version().to_string())
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("active_version", &self.active_version())
            .finish()
    }
}
