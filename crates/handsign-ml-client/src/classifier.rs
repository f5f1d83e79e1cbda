//! Prediction seam and the shared model slot.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{MlError, MlResult};
use crate::forest::RandomForest;

/// Maps a feature vector to a class index.
///
/// Implementations are immutable once constructed and may be called from
/// many tasks at once.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f32]) -> MlResult<i64>;

    /// Expected feature vector length, if the model declares one.
    fn n_features(&self) -> Option<usize> {
        None
    }
}

/// Classifier loaded at start-up, or nothing if loading failed.
///
/// There is no reload: a failed load leaves the slot empty for the process
/// lifetime and every prediction reports [`MlError::ModelUnavailable`].
#[derive(Clone, Default)]
pub struct ClassifierHandle {
    inner: Option<Arc<dyn Classifier>>,
}

impl ClassifierHandle {
    pub fn new<C: Classifier + 'static>(classifier: C) -> Self {
        Self {
            inner: Some(Arc::new(classifier)),
        }
    }

    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    /// Load a random forest artifact, logging and swallowing failures.
    pub fn load_or_unavailable(path: &Path) -> Self {
        match RandomForest::from_file(path) {
            Ok(model) => {
                info!(
                    path = %path.display(),
                    trees = model.tree_count(),
                    features = model.feature_count(),
                    "Loaded sign classifier"
                );
                Self::new(model)
            }
            Err(e) => {
                error!("Error loading model: {}", e);
                Self::unavailable()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.is_some()
    }

    pub fn predict(&self, features: &[f32]) -> MlResult<i64> {
        match &self.inner {
            Some(classifier) => classifier.predict(features),
            None => Err(MlError::ModelUnavailable),
        }
    }
}

impl std::fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierHandle")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
