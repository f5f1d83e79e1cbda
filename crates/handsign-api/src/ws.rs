//! Live sign detection over WebSocket.
//!
//! The client sends one text frame per camera frame, formatted as a data URL
//! (`data:image/jpeg;base64,<payload>`). Each frame gets exactly one reply,
//! either the annotated frame with the last hand's label or a "no hands"
//! notice. Frames from one connection are handled in order, one at a time.
//! Any failure closes the connection with code 1011.

use std::borrow::Cow;
use std::sync::atomic::{AtomicI64, Ordering};

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use handsign_media::{decode_data_url, MediaError};
use handsign_models::StreamReply;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::services::{RecognitionError, SignRecognizer};
use crate::session_log::SessionLog;
use crate::state::AppState;

/// Global counter for active WebSocket connections.
static ACTIVE_WS_CONNECTIONS: AtomicI64 = AtomicI64::new(0);

const WS_SEND_BUFFER_SIZE: usize = 32;
const ENDPOINT: &str = "stream";

/// `GET /ws`
pub async fn ws_stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    metrics::record_ws_connection(ENDPOINT);

    ws.on_upgrade(|socket| async move {
        let count = ACTIVE_WS_CONNECTIONS.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_ws_active_connections(count);
        let _guard = scopeguard::guard((), |_| {
            let count = ACTIVE_WS_CONNECTIONS.fetch_sub(1, Ordering::SeqCst) - 1;
            metrics::set_ws_active_connections(count);
        });

        handle_stream_socket(socket, state).await;
    })
}

/// Decode one frame, recognize it and record its labels.
///
/// Every hand's label is appended to the session log as one contiguous batch;
/// a frame without hands leaves the log untouched.
pub async fn handle_frame(
    text: &str,
    recognizer: &SignRecognizer,
    session_log: &SessionLog,
) -> Result<StreamReply, RecognitionError> {
    let bytes = decode_data_url(text).map_err(|e| match e {
        MediaError::InvalidDataUrl(msg) => RecognitionError::Protocol(msg),
        other => RecognitionError::InvalidImage(other),
    })?;

    let recognition = recognizer.recognize_frame(bytes).await?;
    if !recognition.labels.is_empty() {
        session_log.extend(recognition.labels.iter().cloned()).await;
    }
    Ok(recognition.reply())
}

async fn handle_stream_socket(socket: WebSocket, state: AppState) {
    let (ws_sender, mut receiver) = socket.split();

    // Bounded so a slow client holds up its own loop rather than buffering
    let (tx, mut rx) = mpsc::channel::<Message>(WS_SEND_BUFFER_SIZE);

    let send_task = tokio::spawn(async move {
        let mut ws_sender = ws_sender;
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if ws_sender.send(msg).await.is_err() || closing {
                break;
            }
        }
        ws_sender
    });

    let idle_timeout = state.config.ws_idle_timeout;
    info!("Stream connection opened");

    loop {
        let msg = match tokio::time::timeout(idle_timeout, receiver.next()).await {
            Err(_) => {
                info!(timeout_secs = idle_timeout.as_secs(), "Stream idle, closing");
                send_close(&tx, close_code::NORMAL, "idle timeout").await;
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                debug!("Stream receive error: {}", e);
                break;
            }
            Ok(Some(Ok(msg))) => msg,
        };

        match msg {
            Message::Text(text) => {
                metrics::record_ws_frame_received(ENDPOINT);
                match handle_frame(&text, &state.recognizer, &state.session_log).await {
                    Ok(reply) => {
                        if !send_reply(&tx, &reply).await {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(kind = e.kind(), "Stream frame failed: {}", e);
                        metrics::record_recognition_failure(e.kind(), ENDPOINT);
                        send_close(&tx, close_code::ERROR, e.kind()).await;
                        break;
                    }
                }
            }
            Message::Binary(_) => {
                let e = RecognitionError::Protocol("binary frames are not accepted".to_string());
                warn!(kind = e.kind(), "Stream frame failed: {}", e);
                metrics::record_recognition_failure(e.kind(), ENDPOINT);
                send_close(&tx, close_code::ERROR, e.kind()).await;
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => break,
        }
    }

    drop(tx);
    let _ = send_task.await;
    info!("Stream connection closed");
}

/// Queue a reply. Returns false once the client is gone.
async fn send_reply(tx: &mpsc::Sender<Message>, reply: &StreamReply) -> bool {
    let json = match serde_json::to_string(reply) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize stream reply: {}", e);
            return false;
        }
    };
    let sent = tx.send(Message::Text(json)).await.is_ok();
    if sent {
        metrics::record_ws_message_sent(ENDPOINT, reply.kind());
    }
    sent
}

async fn send_close(tx: &mpsc::Sender<Message>, code: u16, reason: &'static str) {
    let frame = CloseFrame {
        code,
        reason: Cow::Borrowed(reason),
    };
    let _ = tx.send(Message::Close(Some(frame))).await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use handsign_media::{encode_jpeg_base64, Frame};
    use handsign_ml_client::{Classifier, ClassifierHandle, LandmarkProvider, MlResult};
    use handsign_models::{Hand, Landmark, HAND_LANDMARK_COUNT, NO_HANDS_DETECTED};

    use super::*;

    struct StubLandmarks(Vec<Hand>);

    #[async_trait]
    impl LandmarkProvider for StubLandmarks {
        async fn detect(&self, _image: &[u8]) -> MlResult<Vec<Hand>> {
            Ok(self.0.clone())
        }

        async fn health_check(&self) -> MlResult<bool> {
            Ok(true)
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    /// "Yes" for narrow hands, "No" for wide ones.
    struct SpreadClassifier;

    impl Classifier for SpreadClassifier {
        fn predict(&self, features: &[f32]) -> MlResult<i64> {
            let spread = features.iter().step_by(2).copied().fold(0.0f32, f32::max);
            Ok(if spread < 0.15 { 2 } else { 3 })
        }
    }

    fn hand(spread: f32) -> Hand {
        Hand::new(
            (0..HAND_LANDMARK_COUNT)
                .map(|i| {
                    let t = i as f32 / (HAND_LANDMARK_COUNT - 1) as f32;
                    Landmark::new(0.1 + t * spread, 0.2 + t * spread)
                })
                .collect(),
        )
    }

    fn frame_text() -> String {
        let frame = Frame::from_pixel(32, 24, image::Rgb([10, 20, 30]));
        format!(
            "data:image/jpeg;base64,{}",
            encode_jpeg_base64(&frame, 90).unwrap()
        )
    }

    fn recognizer(hands: Vec<Hand>) -> SignRecognizer {
        SignRecognizer::new(
            Arc::new(StubLandmarks(hands)),
            ClassifierHandle::new(SpreadClassifier),
        )
    }

    #[tokio::test]
    async fn test_two_hands_append_twice_and_reply_with_second() {
        let log = SessionLog::new(10);
        let reply = handle_frame(&frame_text(), &recognizer(vec![hand(0.1), hand(0.5)]), &log)
            .await
            .unwrap();

        assert_eq!(log.snapshot().await, vec!["Yes", "No"]);
        assert_eq!(reply.kind(), "detected");
        assert_eq!(reply.label(), "No");
    }

    #[tokio::test]
    async fn test_no_hands_does_not_append() {
        let log = SessionLog::new(10);
        let reply = handle_frame(&frame_text(), &recognizer(vec![]), &log)
            .await
            .unwrap();

        assert!(log.is_empty().await);
        assert_eq!(reply.label(), NO_HANDS_DETECTED);
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({ "label": "No hands detected." })
        );
    }

    #[tokio::test]
    async fn test_frame_without_comma_is_protocol_error() {
        let log = SessionLog::new(10);
        let err = handle_frame("no-comma-here", &recognizer(vec![hand(0.1)]), &log)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "protocol");
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn test_bad_payload_is_invalid_image() {
        let log = SessionLog::new(10);
        let err = handle_frame("data:image/jpeg;base64,!!!", &recognizer(vec![]), &log)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_image");
    }

    #[tokio::test]
    async fn test_missing_model_fails_without_append() {
        let log = SessionLog::new(10);
        let recognizer = SignRecognizer::new(
            Arc::new(StubLandmarks(vec![hand(0.1)])),
            ClassifierHandle::unavailable(),
        );
        let err = handle_frame(&frame_text(), &recognizer, &log)
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionError::ModelUnavailable));
        assert!(log.is_empty().await);
    }
}
