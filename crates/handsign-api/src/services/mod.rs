//! Business logic services.

pub mod recognizer;

pub use recognizer::{FrameRecognition, RecognitionError, SignRecognizer, UploadRecognition};
