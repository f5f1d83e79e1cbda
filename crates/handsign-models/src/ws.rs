//! WebSocket message types for the live detection stream.
//!
//! The field names match what the browser client reads: `image` and `label`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label sent back for frames without a detectable hand.
pub const NO_HANDS_DETECTED: &str = "No hands detected.";

/// Reply to one streamed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StreamReply {
    /// Annotated frame plus the label of the last hand processed
    Detected {
        /// Base64-encoded JPEG
        image: String,
        label: String,
    },
    /// Nothing found in the frame
    NoHands { label: String },
}

impl StreamReply {
    pub fn detected(image: impl Into<String>, label: impl Into<String>) -> Self {
        StreamReply::Detected {
            image: image.into(),
            label: label.into(),
        }
    }

    pub fn no_hands() -> Self {
        StreamReply::NoHands {
            label: NO_HANDS_DETECTED.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StreamReply::Detected { label, .. } | StreamReply::NoHands { label } => label,
        }
    }

    /// Message type name for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamReply::Detected { .. } => "detected",
            StreamReply::NoHands { .. } => "no_hands",
        }
    }
}
