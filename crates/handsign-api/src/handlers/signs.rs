//! Session log retrieval.

use axum::extract::State;
use axum::Json;
use handsign_models::DetectedSignsResponse;

use crate::state::AppState;

/// `GET /detected_signs/`
///
/// Labels detected on the live stream so far, oldest first, with runs of the
/// same label reported once.
pub async fn detected_signs(State(state): State<AppState>) -> Json<DetectedSignsResponse> {
    Json(DetectedSignsResponse {
        signs: state.session_log.collapsed().await,
    })
}
