//! Application state.

use std::sync::Arc;

use handsign_ml_client::{ClassifierHandle, LandmarkClient, LandmarkProvider};
use handsign_storage::{LocalStorage, StorageError};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::services::SignRecognizer;
use crate::session_log::SessionLog;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Landmarks(#[from] handsign_ml_client::MlError),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<LocalStorage>,
    pub recognizer: SignRecognizer,
    pub session_log: Arc<SessionLog>,
}

impl AppState {
    /// Create directories, load the classifier and build the landmark client.
    ///
    /// A classifier that fails to load is not fatal; recognition requests
    /// report it until the process is restarted with a valid artifact.
    pub async fn new(config: ApiConfig) -> Result<Self, StateError> {
        let landmarks = LandmarkClient::new(config.landmark_service.clone())?;
        let model_path = config.model_path.clone();
        let classifier =
            tokio::task::spawn_blocking(move || ClassifierHandle::load_or_unavailable(&model_path))
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("Error loading model: {}", e);
                    ClassifierHandle::unavailable()
                });

        Self::from_parts(config, Arc::new(landmarks), classifier).await
    }

    /// Assemble state from already-built collaborators.
    pub async fn from_parts(
        config: ApiConfig,
        landmarks: Arc<dyn LandmarkProvider>,
        classifier: ClassifierHandle,
    ) -> Result<Self, StateError> {
        let storage = LocalStorage::new(config.upload_dir.clone(), config.processed_dir.clone());
        storage.init().await?;

        let recognizer =
            SignRecognizer::new(landmarks, classifier).with_jpeg_quality(config.jpeg_quality);
        let session_log = SessionLog::new(config.session_log_capacity);

        Ok(Self {
            config,
            storage: Arc::new(storage),
            recognizer,
            session_log: Arc::new(session_log),
        })
    }
}
