// 背景画像 -> JPEG bytes (DCTDecode XObject 用)

use crate::error::OcrPdfError;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;

/// Encode a page raster to JPEG bytes.
///
/// Alpha is dropped (RGB only); `quality` is 1 (worst) to 100 (best).
pub fn encode_background_jpeg(image: &DynamicImage, quality: u8) -> crate::error::Result<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(OcrPdfError::image_encode(format!(
            "JPEG quality must be 1-100, got {}",
            quality
        )));
    }

    if image.width() == 0 || image.height() == 0 {
        return Err(OcrPdfError::image_encode(format!(
            "cannot encode empty {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let rgb = image.to_rgb8();
    encode_rgb_to_jpeg(&rgb, quality)
}

/// Encode an already-converted RGB image to JPEG bytes.
pub(crate) fn encode_rgb_to_jpeg(rgb: &RgbImage, quality: u8) -> crate::error::Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)?;

    Ok(buf.into_inner())
}
