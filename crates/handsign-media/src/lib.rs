//! Image handling for sign detection.
//!
//! This crate provides:
//! - Data-URL and raw byte decoding into RGB frames
//! - Overlay drawing (label text, hand skeletons)
//! - JPEG / PNG re-encoding and base64 output for the live stream

pub mod decode;
pub mod draw;
pub mod encode;
pub mod error;

pub use decode::{decode_data_url, decode_image, ImageKind};
pub use draw::{draw_hand, draw_label, LabelStyle};
pub use encode::{encode_image, encode_jpeg, encode_jpeg_base64, DEFAULT_JPEG_QUALITY};
pub use error::{MediaError, MediaResult};

/// Decoded RGB frame.
pub type Frame = image::RgbImage;
