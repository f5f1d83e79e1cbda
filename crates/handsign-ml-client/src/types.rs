//! Landmark service request/response types.

use handsign_models::Hand;
use serde::{Deserialize, Serialize};

/// Response from `POST /landmarks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkResponse {
    /// Detected hands, in detector order. Empty when nothing was found.
    #[serde(default)]
    pub hands: Vec<Hand>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" || self.status == "ok"
    }
}
