//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while decoding or encoding images.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Malformed data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Error loading image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl MediaError {
    /// Whether the failure came from the client-supplied bytes rather than
    /// from re-encoding on our side.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MediaError::InvalidDataUrl(_)
                | MediaError::Base64(_)
                | MediaError::Decode(_)
                | MediaError::UnsupportedFormat(_)
        )
    }
}
