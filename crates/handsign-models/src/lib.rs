//! Shared data models for the HandSign backend.
//!
//! This crate provides Serde-serializable types for:
//! - Hand landmarks and the 21-point hand topology
//! - Feature vectors and landmark normalization
//! - The sign vocabulary and class-index label mapping
//! - HTTP response bodies and WebSocket frame replies

pub mod features;
pub mod landmark;
pub mod response;
pub mod sign;
pub mod ws;

// Re-export common types
pub use features::{normalize, FeatureVector};
pub use landmark::{Hand, Landmark, LandmarkIdx, HAND_CONNECTIONS, HAND_LANDMARK_COUNT};
pub use response::{DetectedSignsResponse, UploadResponse, WelcomeResponse, WELCOME_MESSAGE};
pub use sign::{collapse_adjacent, label_for_index, Sign, SignParseError, UNKNOWN_LABEL};
pub use ws::{StreamReply, NO_HANDS_DETECTED};
