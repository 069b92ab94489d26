//! Bitmap resampling used when stretching the background onto the surface.
//!
//! All functions return new `Bitmap` instances without modifying the input.

use image::imageops::FilterType;

use super::{Bitmap, DecodeError};

/// Resize a bitmap to exact dimensions with bilinear filtering, ignoring its
/// aspect ratio.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for a zero target dimension and
/// `DecodeError::CorruptedFile` if the pixel buffer does not match the
/// declared dimensions.
pub fn resize(
    bitmap: &Bitmap,
    width: u32,
    height: u32,
) -> Result<Bitmap, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    // Fast path: if dimensions match, just clone
    if bitmap.width == width && bitmap.height == height {
        return Ok(bitmap.clone());
    }

    let rgba = bitmap
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))?;

    let resized = image::imageops::resize(&rgba, width, height, FilterType::Triangle);

    Ok(Bitmap::from_rgba_image(resized))
}
