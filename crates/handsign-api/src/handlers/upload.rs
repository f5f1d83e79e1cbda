//! Upload-and-classify endpoint.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use handsign_media::ImageKind;
use handsign_models::UploadResponse;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult, INVALID_FILE_TYPE};
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// `POST /uploadfile/`
///
/// Stores the upload, classifies the first hand in it and stores a copy with
/// the label drawn on. The annotated copy is served under `/processed`.
/// In production, internal failures answer with a generic detail.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    process_upload(&state, multipart)
        .await
        .map(Json)
        .map_err(|e| e.redact_if(state.config.is_production()))
}

async fn process_upload(state: &AppState, mut multipart: Multipart) -> ApiResult<UploadResponse> {
    let (filename, bytes) = read_file_field(&mut multipart).await?;

    let kind = ImageKind::from_filename(&filename)
        .ok_or_else(|| ApiError::bad_request(INVALID_FILE_TYPE))?;

    let stored = state
        .storage
        .save_upload(&filename, &bytes)
        .await
        .map_err(|e| match e {
            handsign_storage::StorageError::InvalidFilename(_) => {
                ApiError::bad_request(INVALID_FILE_TYPE)
            }
            other => ApiError::from(other),
        })?;
    info!(file = %stored.name, size = bytes.len(), "Upload stored");

    let recognition = match state.recognizer.recognize_upload(bytes, kind).await {
        Ok(recognition) => recognition,
        Err(e) => {
            warn!(file = %stored.name, kind = e.kind(), "Upload recognition failed: {}", e);
            metrics::record_recognition_failure(e.kind(), "upload");
            return Err(e.into());
        }
    };

    let processed = state
        .storage
        .save_processed(&stored.name, &recognition.annotated)
        .await?;

    Ok(UploadResponse {
        label: recognition.label,
        image_path: format!("/processed/{}", processed.name),
    })
}

/// Pull the `file` field out of the form, skipping any other fields.
async fn read_file_field(multipart: &mut Multipart) -> ApiResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read upload", e))?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(ApiError::bad_request("Missing file field"))
}

/// A body cut off by the size limit is a 413, anything else is the client's
/// malformed form.
fn multipart_error(context: &str, err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE || is_length_limit(&err.body_text()) {
        ApiError::PayloadTooLarge
    } else {
        ApiError::bad_request(format!("{}: {}", context, err.body_text()))
    }
}

fn is_length_limit(text: &str) -> bool {
    text.to_ascii_lowercase().contains("length limit")
}
