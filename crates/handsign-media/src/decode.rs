//! Frame decoding.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::Frame;

/// Upload formats accepted by the classifier endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Classify a filename by extension, case-insensitively.
    ///
    /// Only `.png`, `.jpg` and `.jpeg` are accepted.
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            _ => None,
        }
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Extract the binary payload of a `"<prefix>,<base64>"` frame.
///
/// The payload is the segment after the first comma; the prefix is not
/// inspected.
pub fn decode_data_url(data: &str) -> MediaResult<Vec<u8>> {
    let payload = data
        .split(',')
        .nth(1)
        .ok_or_else(|| MediaError::InvalidDataUrl("missing ',' separator".to_string()))?;
    Ok(STANDARD.decode(payload.trim())?)
}

/// Decode encoded image bytes into an RGB frame.
pub fn decode_image(bytes: &[u8]) -> MediaResult<Frame> {
    let image = image::load_from_memory(bytes).map_err(MediaError::Decode)?;
    let frame = image.to_rgb8();
    debug!(width = frame.width(), height = frame.height(), "Decoded image");
    Ok(frame)
}
