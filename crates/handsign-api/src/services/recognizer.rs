//! Sign recognition pipeline.
//!
//! decode → landmarks → normalize → classify → label → annotate → encode.
//! Image work and prediction run on the blocking pool so a slow frame only
//! delays the request or stream that submitted it.

use std::sync::Arc;
use std::time::Instant;

use handsign_media::{
    decode_image, draw_hand, draw_label, encode_image, encode_jpeg_base64, ImageKind, LabelStyle,
    MediaError,
};
use handsign_ml_client::{ClassifierHandle, LandmarkProvider, MlError};
use handsign_models::{label_for_index, normalize, Hand, StreamReply};
use handsign_storage::StorageError;
use thiserror::Error;
use tracing::{debug, info};

use crate::metrics;

/// Where the label is drawn on uploaded images.
const LABEL_ORIGIN: (i32, i32) = (50, 50);

/// Failure of one recognition, tagged by cause.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Error loading image: {0}")]
    InvalidImage(#[source] MediaError),

    #[error("Malformed frame: {0}")]
    Protocol(String),

    #[error("No hands detected in the image.")]
    NoHands,

    #[error("Classifier model is not loaded")]
    ModelUnavailable,

    #[error("Landmark detection failed: {0}")]
    Landmarks(#[source] MlError),

    #[error("Error during model prediction: {0}")]
    Prediction(#[source] MlError),

    #[error("Failed to encode annotated image: {0}")]
    Encode(#[source] MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Processing task failed: {0}")]
    Task(String),
}

impl RecognitionError {
    /// Stable name of the failure kind, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RecognitionError::InvalidImage(_) => "invalid_image",
            RecognitionError::Protocol(_) => "protocol",
            RecognitionError::NoHands => "no_hands",
            RecognitionError::ModelUnavailable => "model_unavailable",
            RecognitionError::Landmarks(_) => "landmarks",
            RecognitionError::Prediction(_) => "prediction",
            RecognitionError::Encode(_) => "encode",
            RecognitionError::Storage(_) => "storage",
            RecognitionError::Task(_) => "task",
        }
    }

    /// Whether the caller's input caused the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecognitionError::InvalidImage(_)
                | RecognitionError::Protocol(_)
                | RecognitionError::NoHands
        )
    }

    fn from_prediction(err: MlError) -> Self {
        match err {
            MlError::ModelUnavailable => RecognitionError::ModelUnavailable,
            other => RecognitionError::Prediction(other),
        }
    }
}

impl From<tokio::task::JoinError> for RecognitionError {
    fn from(err: tokio::task::JoinError) -> Self {
        RecognitionError::Task(err.to_string())
    }
}

/// Result of classifying an uploaded image.
#[derive(Debug, Clone)]
pub struct UploadRecognition {
    pub label: String,
    /// Annotated image encoded in the upload's own format
    pub annotated: Vec<u8>,
    /// Hands found, of which only the first was classified
    pub hands_detected: usize,
}

/// Result of classifying one stream frame.
#[derive(Debug, Clone, Default)]
pub struct FrameRecognition {
    /// One label per detected hand, in detector order
    pub labels: Vec<String>,
    /// Annotated frame as base64 JPEG; `None` when no hand was found
    pub image: Option<String>,
}

impl FrameRecognition {
    /// Reply for the client. Carries the label of the last hand only.
    pub fn reply(&self) -> StreamReply {
        match (&self.image, self.labels.last()) {
            (Some(image), Some(label)) => StreamReply::detected(image.clone(), label.clone()),
            _ => StreamReply::no_hands(),
        }
    }
}

/// Orchestrates landmark detection and classification.
#[derive(Clone)]
pub struct SignRecognizer {
    landmarks: Arc<dyn LandmarkProvider>,
    classifier: ClassifierHandle,
    jpeg_quality: u8,
}

impl SignRecognizer {
    pub fn new(landmarks: Arc<dyn LandmarkProvider>, classifier: ClassifierHandle) -> Self {
        Self {
            landmarks,
            classifier,
            jpeg_quality: 80,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn landmarks(&self) -> &Arc<dyn LandmarkProvider> {
        &self.landmarks
    }

    pub fn classifier(&self) -> &ClassifierHandle {
        &self.classifier
    }

    /// Normalize, predict and map one hand to its label.
    pub fn classify_hand(classifier: &ClassifierHandle, hand: &Hand) -> Result<String, RecognitionError> {
        let features = normalize(hand);
        let index = classifier
            .predict(features.as_slice())
            .map_err(RecognitionError::from_prediction)?;
        Ok(label_for_index(index))
    }

    async fn detect(&self, bytes: &[u8]) -> Result<Vec<Hand>, RecognitionError> {
        let hands = self
            .landmarks
            .detect(bytes)
            .await
            .map_err(RecognitionError::Landmarks)?;
        debug!(provider = self.landmarks.name(), hands = hands.len(), "Landmarks detected");
        metrics::record_hands_detected(hands.len());
        Ok(hands)
    }

    /// Classify an uploaded image using its first hand and draw the label.
    pub async fn recognize_upload(
        &self,
        bytes: Vec<u8>,
        kind: ImageKind,
    ) -> Result<UploadRecognition, RecognitionError> {
        let start = Instant::now();

        let (frame, bytes) = tokio::task::spawn_blocking(move || {
            decode_image(&bytes).map(|frame| (frame, bytes))
        })
        .await?
        .map_err(RecognitionError::InvalidImage)?;

        let hands = self.detect(&bytes).await?;
        let hands_detected = hands.len();
        let Some(hand) = hands.into_iter().next() else {
            return Err(RecognitionError::NoHands);
        };
        if hands_detected > 1 {
            debug!(hands_detected, "Only the first hand of an upload is classified");
        }

        let classifier = self.classifier.clone();
        let (label, annotated) = tokio::task::spawn_blocking(move || {
            let label = Self::classify_hand(&classifier, &hand)?;
            let mut frame = frame;
            let (x, y) = LABEL_ORIGIN;
            draw_label(&mut frame, &label, x, y, LabelStyle::default());
            let annotated = encode_image(&frame, kind.format()).map_err(RecognitionError::Encode)?;
            Ok::<_, RecognitionError>((label, annotated))
        })
        .await??;

        metrics::record_prediction(&label, "upload");
        metrics::record_recognition_duration("upload", start.elapsed().as_secs_f64());
        info!(label = %label, hands_detected, "Upload classified");

        Ok(UploadRecognition {
            label,
            annotated,
            hands_detected,
        })
    }

    /// Classify every hand in a stream frame and draw their skeletons.
    pub async fn recognize_frame(&self, bytes: Vec<u8>) -> Result<FrameRecognition, RecognitionError> {
        let start = Instant::now();

        let (frame, bytes) = tokio::task::spawn_blocking(move || {
            decode_image(&bytes).map(|frame| (frame, bytes))
        })
        .await?
        .map_err(RecognitionError::InvalidImage)?;

        let hands = self.detect(&bytes).await?;
        if hands.is_empty() {
            return Ok(FrameRecognition::default());
        }

        let classifier = self.classifier.clone();
        let quality = self.jpeg_quality;
        let recognition = tokio::task::spawn_blocking(move || {
            let mut frame = frame;
            let mut labels = Vec::with_capacity(hands.len());
            for hand in &hands {
                draw_hand(&mut frame, hand);
                labels.push(Self::classify_hand(&classifier, hand)?);
            }
            let image = encode_jpeg_base64(&frame, quality).map_err(RecognitionError::Encode)?;
            Ok::<_, RecognitionError>(FrameRecognition {
                labels,
                image: Some(image),
            })
        })
        .await??;

        for label in &recognition.labels {
            metrics::record_prediction(label, "stream");
        }
        metrics::record_recognition_duration("stream", start.elapsed().as_secs_f64());

        Ok(recognition)
    }
}
