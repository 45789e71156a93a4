use image::ImageEncoder;

use crate::foundation::error::{CardError, CardResult};
use crate::render::cpu::FrameRGBA;

/// Default JPEG quality for cards.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encode an opaque frame as baseline JPEG.
///
/// The alpha channel is dropped. Frames produced by [`crate::render::cpu::CpuRasterizer`] are
/// always opaque, so premultiplied and straight color are the same.
pub fn encode_jpeg(frame: &FrameRGBA, quality: u8) -> CardResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(CardError::encode(format!(
            "frame data length {} does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    if !(1..=100).contains(&quality) {
        return Err(CardError::validation("jpeg quality must be in 1..=100"));
    }

    let rgb: Vec<u8> = frame
        .data
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CardError::encode(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
