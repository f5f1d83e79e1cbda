//! API integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use handsign_api::{create_router, ApiConfig, AppState};
use handsign_ml_client::{Classifier, ClassifierHandle, LandmarkProvider, MlError, MlResult};
use handsign_models::{Hand, Landmark, HAND_LANDMARK_COUNT};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "handsign-test-boundary";

/// Returns the same hands for every image.
struct FixedLandmarks(Vec<Hand>);

#[async_trait]
impl LandmarkProvider for FixedLandmarks {
    async fn detect(&self, _image: &[u8]) -> MlResult<Vec<Hand>> {
        Ok(self.0.clone())
    }

    async fn health_check(&self) -> MlResult<bool> {
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct DownLandmarks;

#[async_trait]
impl LandmarkProvider for DownLandmarks {
    async fn detect(&self, _image: &[u8]) -> MlResult<Vec<Hand>> {
        Err(MlError::ServiceUnavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> MlResult<bool> {
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

/// Always predicts class 1 ("I Love You").
struct Constant;

impl Classifier for Constant {
    fn predict(&self, _features: &[f32]) -> MlResult<i64> {
        Ok(1)
    }
}

fn hand() -> Hand {
    Hand::new(
        (0..HAND_LANDMARK_COUNT)
            .map(|i| Landmark::new(0.3 + i as f32 * 0.01, 0.4 + i as f32 * 0.01))
            .collect(),
    )
}

struct TestApp {
    router: Router,
    dir: TempDir,
}

impl TestApp {
    async fn new(landmarks: Arc<dyn LandmarkProvider>, classifier: ClassifierHandle) -> Self {
        Self::with_config(landmarks, classifier, |_| {}).await
    }

    async fn with_config(
        landmarks: Arc<dyn LandmarkProvider>,
        classifier: ClassifierHandle,
        customize: impl FnOnce(&mut ApiConfig),
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ApiConfig {
            upload_dir: dir.path().join("uploads"),
            processed_dir: dir.path().join("processed"),
            ..Default::default()
        };
        customize(&mut config);

        let state = AppState::from_parts(config, landmarks, classifier)
            .await
            .unwrap();
        Self {
            router: create_router(state, None),
            dir,
        }
    }

    async fn with_hands(hands: Vec<Hand>) -> Self {
        Self::new(Arc::new(FixedLandmarks(hands)), ClassifierHandle::new(Constant)).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn uploads(&self) -> Vec<String> {
        list(&self.dir.path().join("uploads"))
    }

    fn processed(&self) -> Vec<String> {
        list(&self.dir.path().join("processed"))
    }
}

fn list(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(120, 90, Rgb(color));
    handsign_media::encode_image(&img, ImageFormat::Png).unwrap()
}

fn upload_request(filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/uploadfile/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_returns_welcome() {
    let app = TestApp::with_hands(vec![]).await;

    let (status, body) = app.send_json(get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({ "message": "Welcome to the Sign Language Detection API" })
    );
    assert!(app.uploads().is_empty());
    assert!(app.processed().is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::with_hands(vec![]).await;
    let (status, body) = app.send_json(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_upload_classifies_and_stores_annotated_copy() {
    let app = TestApp::with_hands(vec![hand()]).await;

    let (status, body) = app
        .send_json(upload_request("hand.png", &png_bytes([200, 180, 160])))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "I Love You");
    assert_eq!(body["image_path"], "/processed/processed_hand.png");
    assert_eq!(app.uploads(), vec!["hand.png"]);
    assert_eq!(app.processed(), vec!["processed_hand.png"]);

    let stored = std::fs::read(app.dir.path().join("processed/processed_hand.png")).unwrap();
    assert_eq!(image::guess_format(&stored).unwrap(), ImageFormat::Png);

    // Annotated copy is served back
    let (status, served) = app.send(get("/processed/processed_hand.png")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, stored);
}

#[tokio::test]
async fn test_upload_rejects_wrong_extension_before_writing() {
    let app = TestApp::with_hands(vec![hand()]).await;

    let (status, body) = app
        .send_json(upload_request("notes.txt", b"hello"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid file type");
    assert!(app.uploads().is_empty());
    assert!(app.processed().is_empty());
}

#[tokio::test]
async fn test_upload_extension_is_case_insensitive() {
    let app = TestApp::with_hands(vec![hand()]).await;
    let (status, _) = app
        .send_json(upload_request("HAND.PNG", &png_bytes([1, 2, 3])))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_without_hands_has_no_label() {
    let app = TestApp::with_hands(vec![]).await;

    let (status, body) = app
        .send_json(upload_request("empty.png", &png_bytes([0, 0, 0])))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No hands detected in the image.");
    assert!(body.get("label").is_none());
    assert!(app.processed().is_empty());
}

#[tokio::test]
async fn test_upload_undecodable_image() {
    let app = TestApp::with_hands(vec![hand()]).await;

    let (status, body) = app
        .send_json(upload_request("broken.jpg", b"definitely not a jpeg"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Error loading image.");
}

#[tokio::test]
async fn test_upload_without_model_is_unavailable() {
    let app = TestApp::new(
        Arc::new(FixedLandmarks(vec![hand()])),
        ClassifierHandle::unavailable(),
    )
    .await;

    let (status, _) = app
        .send_json(upload_request("hand.png", &png_bytes([9, 9, 9])))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_upload_landmark_failure_is_internal_error() {
    let app = TestApp::new(Arc::new(DownLandmarks), ClassifierHandle::new(Constant)).await;

    let (status, body) = app
        .send_json(upload_request("hand.png", &png_bytes([9, 9, 9])))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_production_hides_internal_error_detail() {
    let app = TestApp::with_config(
        Arc::new(DownLandmarks),
        ClassifierHandle::new(Constant),
        |config| config.environment = "production".to_string(),
    )
    .await;

    let (status, body) = app
        .send_json(upload_request("hand.png", &png_bytes([9, 9, 9])))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "An internal error occurred");

    // Client errors keep their text
    let (status, body) = app
        .send_json(upload_request("notes.txt", b"hello"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid file type");
}

#[tokio::test]
async fn test_oversized_upload_is_payload_too_large() {
    let app = TestApp::with_config(
        Arc::new(FixedLandmarks(vec![hand()])),
        ClassifierHandle::new(Constant),
        |config| config.max_body_size = 1024,
    )
    .await;

    // No Content-Length header, so the limit trips while the form is read
    let request = upload_request("big.png", &vec![7u8; 8 * 1024]);
    assert!(!request.headers().contains_key(header::CONTENT_LENGTH));

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.uploads().is_empty());
}

#[tokio::test]
async fn test_same_filename_overwrites() {
    let app = TestApp::with_hands(vec![hand()]).await;

    let first = png_bytes([10, 10, 10]);
    let second = png_bytes([250, 250, 250]);
    app.send_json(upload_request("same.png", &first)).await;
    let (status, _) = app.send_json(upload_request("same.png", &second)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.uploads(), vec!["same.png"]);
    assert_eq!(app.processed(), vec!["processed_same.png"]);
    let stored = std::fs::read(app.dir.path().join("uploads/same.png")).unwrap();
    assert_eq!(stored, second);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = TestApp::with_hands(vec![hand()]).await;

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/uploadfile/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, _) = app.send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detected_signs_starts_empty() {
    let app = TestApp::with_hands(vec![]).await;
    let (status, body) = app.send_json(get("/detected_signs/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "signs": [] }));
}

#[tokio::test]
async fn test_detected_signs_collapses_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = ApiConfig {
        upload_dir: dir.path().join("uploads"),
        processed_dir: dir.path().join("processed"),
        ..Default::default()
    };
    let state = AppState::from_parts(
        config,
        Arc::new(FixedLandmarks(vec![])),
        ClassifierHandle::new(Constant),
    )
    .await
    .unwrap();
    state
        .session_log
        .extend(["Hello", "Hello", "Yes", "Hello"].map(String::from))
        .await;
    let router = create_router(state, None);

    let response = router.oneshot(get("/detected_signs/")).await.unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["signs"], serde_json::json!(["Hello", "Yes", "Hello"]));
}

#[tokio::test]
async fn test_uploads_do_not_touch_session_log() {
    let app = TestApp::with_hands(vec![hand()]).await;
    app.send_json(upload_request("hand.png", &png_bytes([5, 5, 5])))
        .await;

    let (_, body) = app.send_json(get("/detected_signs/")).await;
    assert_eq!(body["signs"], serde_json::json!([]));
}

#[tokio::test]
async fn test_ready_reports_missing_model() {
    let app = TestApp::new(
        Arc::new(FixedLandmarks(vec![])),
        ClassifierHandle::unavailable(),
    )
    .await;

    let (status, body) = app.send_json(get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["classifier"]["status"], "error");
    assert_eq!(body["checks"]["landmarks"]["status"], "ok");
}

#[tokio::test]
async fn test_upload_is_rate_limited_per_client() {
    let app = TestApp::with_config(
        Arc::new(FixedLandmarks(vec![])),
        ClassifierHandle::new(Constant),
        |config| config.rate_limit_rps = 1,
    )
    .await;

    let limited = |filename: &str| {
        let mut request = upload_request(filename, b"x");
        request
            .headers_mut()
            .insert("X-Forwarded-For", "192.0.2.10".parse().unwrap());
        request
    };

    let (first, _) = app.send(limited("a.txt")).await;
    let (second, _) = app.send(limited("b.txt")).await;

    assert_eq!(first, StatusCode::BAD_REQUEST);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_security_headers_allow_cross_origin_images() {
    let app = TestApp::with_hands(vec![]).await;
    let response = app.router.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(
        response.headers()["Cross-Origin-Resource-Policy"],
        "cross-origin"
    );
    assert!(response.headers().contains_key("X-Request-ID"));
}

#[test]
fn test_unknown_paths_share_one_metrics_series() {
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    metrics::with_local_recorder(&recorder, || {
        runtime.block_on(async {
            let app = TestApp::with_hands(vec![]).await;
            for i in 0..50 {
                let (status, _) = app.send(get(&format!("/scan-{i}"))).await;
                assert_eq!(status, StatusCode::NOT_FOUND);
            }
            app.send(get("/detected_signs/")).await;
            app.send(get("/processed/a.png")).await;
            app.send(get("/processed/b.png")).await;
        })
    });

    let rendered = handle.render();
    let series: Vec<&str> = rendered
        .lines()
        .filter(|line| line.starts_with("handsign_http_requests_total{"))
        .collect();

    assert_eq!(series.len(), 3, "{series:#?}");
    assert!(series
        .iter()
        .any(|s| s.contains(r#"path="unmatched""#) && s.ends_with(" 50")));
    assert!(series.iter().any(|s| s.contains(r#"path="/detected_signs/""#)));
    assert!(series
        .iter()
        .any(|s| s.contains(r#"path="/processed/:file""#) && s.ends_with(" 2")));
}
