//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

use handsign_ml_client::LandmarkClientConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second (upload route)
    pub rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Directory for raw uploads
    pub upload_dir: PathBuf,
    /// Directory for annotated copies, served under `/processed`
    pub processed_dir: PathBuf,
    /// Classifier artifact
    pub model_path: PathBuf,
    /// Maximum number of labels kept in the session log
    pub session_log_capacity: usize,
    /// Close a stream after this long without a frame
    pub ws_idle_timeout: Duration,
    /// JPEG quality of annotated stream frames
    pub jpeg_quality: u8,
    /// Landmark service client
    pub landmark_service: LandmarkClientConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            rate_limit_rps: 10,
            max_body_size: 10 * 1024 * 1024, // 10MB
            environment: "development".to_string(),
            upload_dir: PathBuf::from("uploads"),
            processed_dir: PathBuf::from("processed"),
            model_path: PathBuf::from("sign_language_model/model.json"),
            session_log_capacity: 1000,
            ws_idle_timeout: Duration::from_secs(300),
            jpeg_quality: 80,
            landmark_service: LandmarkClientConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_parse("API_PORT").unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: env_parse("RATE_LIMIT_RPS").unwrap_or(defaults.rate_limit_rps),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            processed_dir: std::env::var("PROCESSED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.processed_dir),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            session_log_capacity: env_parse("SESSION_LOG_CAPACITY")
                .unwrap_or(defaults.session_log_capacity),
            ws_idle_timeout: env_parse("WS_IDLE_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.ws_idle_timeout),
            jpeg_quality: env_parse::<u8>("JPEG_QUALITY")
                .map(|q| q.clamp(1, 100))
                .unwrap_or(defaults.jpeg_quality),
            landmark_service: LandmarkClientConfig::from_env(),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
