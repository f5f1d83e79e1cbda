//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Method, Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Install the Prometheus recorder.
/// Returns a handle that renders the current metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "handsign_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "handsign_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "handsign_http_requests_in_flight";

    // WebSocket metrics
    pub const WS_CONNECTIONS_TOTAL: &str = "handsign_ws_connections_total";
    pub const WS_CONNECTIONS_ACTIVE: &str = "handsign_ws_connections_active";
    pub const WS_FRAMES_RECEIVED: &str = "handsign_ws_frames_received_total";
    pub const WS_MESSAGES_SENT: &str = "handsign_ws_messages_sent_total";

    // Recognition metrics
    pub const PREDICTIONS_TOTAL: &str = "handsign_predictions_total";
    pub const RECOGNITION_FAILURES_TOTAL: &str = "handsign_recognition_failures_total";
    pub const RECOGNITION_DURATION_SECONDS: &str = "handsign_recognition_duration_seconds";
    pub const HANDS_DETECTED: &str = "handsign_hands_detected";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "handsign_rate_limit_hits_total";
}

/// Path label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";
const PROCESSED_LABEL: &str = "/processed/:file";

/// Record an HTTP request. `path` is a route label from [`route_label`].
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record WebSocket connection.
pub fn record_ws_connection(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::WS_CONNECTIONS_TOTAL, &labels).increment(1);
}

/// Update active WebSocket connections gauge.
pub fn set_ws_active_connections(count: i64) {
    gauge!(names::WS_CONNECTIONS_ACTIVE).set(count as f64);
}

/// Record a frame received on a stream.
pub fn record_ws_frame_received(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::WS_FRAMES_RECEIVED, &labels).increment(1);
}

/// Record WebSocket message sent.
pub fn record_ws_message_sent(endpoint: &str, message_type: &str) {
    let labels = [
        ("endpoint", endpoint.to_string()),
        ("type", message_type.to_string()),
    ];
    counter!(names::WS_MESSAGES_SENT, &labels).increment(1);
}

/// Record a classified hand.
pub fn record_prediction(label: &str, source: &str) {
    let labels = [("label", label.to_string()), ("source", source.to_string())];
    counter!(names::PREDICTIONS_TOTAL, &labels).increment(1);
}

/// Record a failed recognition by error kind.
pub fn record_recognition_failure(kind: &str, source: &str) {
    let labels = [("kind", kind.to_string()), ("source", source.to_string())];
    counter!(names::RECOGNITION_FAILURES_TOTAL, &labels).increment(1);
}

/// Record end-to-end recognition time.
pub fn record_recognition_duration(source: &str, duration_secs: f64) {
    let labels = [("source", source.to_string())];
    histogram!(names::RECOGNITION_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record how many hands the landmark service found in one image.
pub fn record_hands_detected(count: usize) {
    histogram!(names::HANDS_DETECTED).record(count as f64);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

static PROCESSED_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/processed(/.*)?$").expect("valid regex"));

/// Label a request by the route template it matched, never the raw path.
///
/// Requests that hit no route share one label so scans cannot grow the
/// series set. Everything under `/processed` shares one label too, whether
/// or not the nested file service exposed a matched path.
pub fn route_label(matched: Option<&str>, path: &str) -> String {
    if PROCESSED_FILE.is_match(matched.unwrap_or(path)) {
        return PROCESSED_LABEL.to_string();
    }
    matched.unwrap_or(UNMATCHED_PATH).to_string()
}

/// Extension methods share one label.
fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        Method::PATCH => "PATCH",
        _ => "OTHER",
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = method_label(request.method()).to_string();
    let path = route_label(
        request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        request.uri().path(),
    );
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label() {
        assert_eq!(route_label(Some("/processed"), "/processed"), PROCESSED_LABEL);
        assert_eq!(route_label(None, "/processed/processed_hand.jpg"), PROCESSED_LABEL);
        assert_eq!(route_label(Some("/uploadfile/"), "/uploadfile/"), "/uploadfile/");
        assert_eq!(route_label(None, "/wp-admin/setup.php"), UNMATCHED_PATH);
        assert_eq!(route_label(None, "/processedx"), UNMATCHED_PATH);
    }

    #[test]
    fn test_method_label() {
        assert_eq!(method_label(&Method::POST), "POST");
        let custom = Method::from_bytes(b"PROPFIND").unwrap();
        assert_eq!(method_label(&custom), "OTHER");
    }
}
