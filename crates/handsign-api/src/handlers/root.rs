use axum::Json;
use handsign_models::WelcomeResponse;

/// `GET /`
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse::default())
}
