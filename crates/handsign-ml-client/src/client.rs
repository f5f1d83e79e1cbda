//! Landmark service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use handsign_models::Hand;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::error::{MlError, MlResult};
use crate::provider::LandmarkProvider;
use crate::types::{HealthResponse, LandmarkResponse};

/// Configuration for the landmark client.
#[derive(Debug, Clone)]
pub struct LandmarkClientConfig {
    /// Base URL of the landmark service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
}

impl Default for LandmarkClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }
}

impl LandmarkClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("LANDMARK_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                std::env::var("LANDMARK_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            max_retries: std::env::var("LANDMARK_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

/// Client for the hand landmark service.
pub struct LandmarkClient {
    http: Client,
    config: LandmarkClientConfig,
    landmarks_url: Url,
    health_url: Url,
}

impl LandmarkClient {
    /// Create a new landmark client.
    pub fn new(config: LandmarkClientConfig) -> MlResult<Self> {
        let base = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| MlError::InvalidConfig(format!("{}: {}", config.base_url, e)))?;
        let join = |path: &str| {
            let mut url = base.clone();
            url.path_segments_mut()
                .map_err(|_| MlError::InvalidConfig(format!("{} cannot be a base URL", base)))?
                .pop_if_empty()
                .push(path);
            Ok::<_, MlError>(url)
        };
        let landmarks_url = join("landmarks")?;
        let health_url = join("health")?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self {
            http,
            config,
            landmarks_url,
            health_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(LandmarkClientConfig::from_env())
    }

    pub fn config(&self) -> &LandmarkClientConfig {
        &self.config
    }

    async fn post_image(&self, image: &[u8]) -> MlResult<LandmarkResponse> {
        let response = self
            .http
            .post(self.landmarks_url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::BAD_GATEWAY {
            return Err(MlError::ServiceUnavailable(format!(
                "landmark service returned {}",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::RequestFailed(format!(
                "landmark service returned {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| MlError::InvalidResponse(e.to_string()))
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(100 * 2u64.pow(attempt));
                    warn!(
                        "Landmark request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl LandmarkProvider for LandmarkClient {
    async fn detect(&self, image: &[u8]) -> MlResult<Vec<Hand>> {
        debug!(bytes = image.len(), url = %self.landmarks_url, "Requesting hand landmarks");

        let response = self.with_retry(|| self.post_image(image)).await?;
        let total = response.hands.len();
        let hands: Vec<Hand> = response
            .hands
            .into_iter()
            .filter(|hand| !hand.is_empty())
            .collect();
        if hands.len() != total {
            debug!("Dropped {} hands without landmarks", total - hands.len());
        }
        Ok(hands)
    }

    async fn health_check(&self) -> MlResult<bool> {
        match self.http.get(self.health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.is_healthy())
            }
            Ok(response) => {
                warn!("Landmark service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Landmark service health check error: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &'static str {
        "landmark-http"
    }
}
