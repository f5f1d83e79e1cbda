//! HTTP response bodies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const WELCOME_MESSAGE: &str = "Welcome to the Sign Language Detection API";

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

impl Default for WelcomeResponse {
    fn default() -> Self {
        Self {
            message: WELCOME_MESSAGE.to_string(),
        }
    }
}

/// Body of a successful `POST /uploadfile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UploadResponse {
    pub label: String,
    /// URL path of the annotated copy, e.g. `/processed/processed_hand.jpg`
    pub image_path: String,
}

/// Body of `GET /detected_signs/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectedSignsResponse {
    pub signs: Vec<String>,
}
