//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::services::RecognitionError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Public text for an upload whose extension is not an accepted image type.
pub const INVALID_FILE_TYPE: &str = "Invalid file type";
/// Public text for an upload that cannot be decoded.
pub const ERROR_LOADING_IMAGE: &str = "Error loading image.";
/// Public text for a server error in production.
pub const INTERNAL_ERROR: &str = "An internal error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] handsign_storage::StorageError),

    /// A server-side failure whose detail is kept out of the response.
    #[error(transparent)]
    Redacted(Box<ApiError>),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Hide the detail of internal errors when `production` is set.
    pub fn redact_if(self, production: bool) -> Self {
        if production && self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            match self {
                ApiError::Redacted(_) => self,
                other => ApiError::Redacted(Box::new(other)),
            }
        } else {
            self
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Redacted(inner) => inner.status_code(),
            ApiError::Recognition(err) => match err {
                RecognitionError::InvalidImage(_)
                | RecognitionError::Protocol(_)
                | RecognitionError::NoHands => StatusCode::BAD_REQUEST,
                RecognitionError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                RecognitionError::Landmarks(_)
                | RecognitionError::Prediction(_)
                | RecognitionError::Encode(_)
                | RecognitionError::Storage(_)
                | RecognitionError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Text safe to return to the client.
    fn public_detail(&self) -> String {
        match self {
            ApiError::Recognition(RecognitionError::InvalidImage(_)) => {
                ERROR_LOADING_IMAGE.to_string()
            }
            ApiError::Recognition(RecognitionError::ModelUnavailable) => {
                "Model not loaded".to_string()
            }
            ApiError::Redacted(_) => INTERNAL_ERROR.to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            detail: self.public_detail(),
        };
        (status, Json(body)).into_response()
    }
}
