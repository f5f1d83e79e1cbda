//! Frame encoding.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, ImageOutputFormat};

use crate::error::{MediaError, MediaResult};
use crate::Frame;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encode a frame as JPEG.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> MediaResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode(frame.as_raw(), frame.width(), frame.height(), ColorType::Rgb8)
        .map_err(MediaError::Encode)?;
    Ok(buf)
}

/// Encode a frame as JPEG and return it base64-encoded for the stream.
pub fn encode_jpeg_base64(frame: &Frame, quality: u8) -> MediaResult<String> {
    Ok(STANDARD.encode(encode_jpeg(frame, quality)?))
}

/// Encode a frame in the given container format.
pub fn encode_image(frame: &Frame, format: ImageFormat) -> MediaResult<Vec<u8>> {
    match format {
        ImageFormat::Jpeg => encode_jpeg(frame, DEFAULT_JPEG_QUALITY),
        ImageFormat::Png => {
            let mut cursor = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(frame.clone())
                .write_to(&mut cursor, ImageOutputFormat::Png)
                .map_err(MediaError::Encode)?;
            Ok(cursor.into_inner())
        }
        other => Err(MediaError::UnsupportedFormat(format!("{:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::from_fn(8, 8, |x, y| image::Rgb([(x * 30) as u8, (y * 30) as u8, 128]))
    }

    #[test]
    fn test_encode_jpeg_magic() {
        let bytes = encode_jpeg(&frame(), DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let original = frame();
        let bytes = encode_image(&original, ImageFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_base64_output_decodes_to_jpeg() {
        let encoded = encode_jpeg_base64(&frame(), 80).unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            encode_image(&frame(), ImageFormat::Gif),
            Err(MediaError::UnsupportedFormat(_))
        ));
    }
}
