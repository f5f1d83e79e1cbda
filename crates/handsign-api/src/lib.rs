//! Axum HTTP/WebSocket API server for sign detection.
//!
//! This crate provides:
//! - Image upload classification with annotated copies
//! - Live frame-by-frame detection over WebSocket
//! - The session log of stream detections
//! - Rate limiting, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod session_log;
pub mod state;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{RecognitionError, SignRecognizer};
pub use session_log::SessionLog;
pub use state::{AppState, StateError};
