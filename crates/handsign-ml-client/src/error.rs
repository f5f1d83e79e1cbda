//! ML error types.

use std::path::PathBuf;

use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("Landmark service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Classifier model is not loaded")]
    ModelUnavailable,

    #[error("Feature vector has {actual} values, model expects {expected}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Feature vector contains non-finite values")]
    NonFiniteFeatures,
}

impl MlError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, MlError::ServiceUnavailable(_) | MlError::Network(_))
    }

    /// Whether the error came from the landmark service rather than the
    /// classifier.
    pub fn is_landmark_error(&self) -> bool {
        matches!(
            self,
            MlError::ServiceUnavailable(_)
                | MlError::RequestFailed(_)
                | MlError::InvalidResponse(_)
                | MlError::Network(_)
                | MlError::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(MlError::ServiceUnavailable("503".into()).is_retryable());
        assert!(!MlError::RequestFailed("400".into()).is_retryable());
        assert!(!MlError::ModelUnavailable.is_retryable());
    }

    #[test]
    fn test_error_origin() {
        assert!(MlError::InvalidResponse("x".into()).is_landmark_error());
        assert!(!MlError::FeatureMismatch { expected: 42, actual: 10 }.is_landmark_error());
    }
}
