//! Landmark detection seam.

use async_trait::async_trait;
use handsign_models::Hand;

use crate::error::MlResult;

/// Hand landmark detection provider.
///
/// Implementations receive the encoded image exactly as the client sent it
/// (PNG or JPEG bytes) and return one keypoint set per detected hand.
#[async_trait]
pub trait LandmarkProvider: Send + Sync {
    /// Detect hands in an encoded image. An empty vector means no hands.
    async fn detect(&self, image: &[u8]) -> MlResult<Vec<Hand>>;

    /// Whether the provider is able to serve requests.
    async fn health_check(&self) -> MlResult<bool>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
