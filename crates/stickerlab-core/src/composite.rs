//! Flatten the scene into an exportable PNG.
//!
//! # Algorithm
//!
//! 1. Allocate an RGBA surface of `canvas.to_pixels()` and fill it with the
//!    neutral backdrop.
//! 2. Stretch the background (if any) over the whole surface.
//! 3. Place the overlay: translate to the centre of its on-screen bounding
//!    box, rotate by θ, scale by s, and draw the square overlay centred there.
//! 4. Encode the surface as PNG.
//!
//! The overlay is rasterized by inverse mapping: every destination pixel
//! inside the placed square is mapped back into the overlay bitmap and
//! sampled bilinearly.
//!
//! ```text
//! placement = T(pivot) · R(θ) · S(s) · T(-size/2, -size/2)
//! src       = placement⁻¹ · (dst + 0.5)
//! ```

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::config::{EditorConfig, EXPORT_MIME_TYPE, MAX_SURFACE_PIXELS};
use crate::decode::{resize, Bitmap};
use crate::encode::{encode_png, EncodeError};
use crate::scene::SceneState;
use crate::transform::{decompose, AffineTransform2D, DecomposedTransform};

/// Errors produced while compositing an export.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// The background or overlay bitmap is missing or unusable.
    #[error("Asset failed to load: {0}")]
    AssetLoad(String),

    /// The canvas is too large to rasterize.
    #[error("Surface {width}x{height} exceeds the 8192x8192 pixel limit")]
    SurfaceTooLarge { width: u32, height: u32 },

    /// The flattened surface could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Settings the compositor takes from the editor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeOptions {
    /// Backdrop painted before the background.
    pub fill_color: [u8; 4],
    /// Download name attached to the result.
    pub file_name: String,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for CompositeOptions {
    fn from(config: &EditorConfig) -> Self {
        Self {
            fill_color: config.fill_color,
            file_name: config.export_file_name.clone(),
        }
    }
}

/// An encoded export ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub mime_type: String,
}

/// Composite the scene and encode it as PNG.
///
/// # Errors
///
/// Returns `CompositeError::AssetLoad` if the background or overlay bitmap is
/// empty or inconsistent, `CompositeError::SurfaceTooLarge` if the canvas
/// exceeds [`MAX_SURFACE_PIXELS`], and `CompositeError::Encode` if PNG
/// encoding fails.
/// No bytes are produced on failure.
#[tracing::instrument(skip_all, fields(generation = scene.layout_generation()))]
pub fn composite(
    scene: &SceneState,
    overlay: &Bitmap,
    options: &CompositeOptions,
) -> Result<ExportedImage, CompositeError> {
    let surface = render_surface(scene, overlay, options)?;
    let (width, height) = surface.dimensions();
    let bytes = encode_png(surface.as_raw(), width, height)?;

    tracing::debug!(width, height, bytes = bytes.len(), "composited export");
    Ok(ExportedImage {
        bytes,
        width,
        height,
        file_name: options.file_name.clone(),
        mime_type: EXPORT_MIME_TYPE.to_string(),
    })
}

/// Rasterize the scene into an RGBA surface without encoding it.
pub fn render_surface(
    scene: &SceneState,
    overlay: &Bitmap,
    options: &CompositeOptions,
) -> Result<RgbaImage, CompositeError> {
    if overlay.is_empty() {
        return Err(CompositeError::AssetLoad(format!(
            "overlay bitmap is empty ({}x{})",
            overlay.width, overlay.height
        )));
    }

    let (width, height) = scene.canvas().to_pixels();
    if u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
        return Err(CompositeError::SurfaceTooLarge { width, height });
    }
    let mut surface = RgbaImage::from_pixel(width, height, Rgba(options.fill_color));

    if let Some(background) = scene.background() {
        draw_background(&mut surface, background)?;
    }

    let rect = scene.current_overlay_screen_rect();
    let parts = decompose(&scene.overlay_transform());
    let (cx, cy) = rect.center();
    let half = scene.overlay_size() / 2.0;

    let pivoted = DecomposedTransform {
        translate_x: cx,
        translate_y: cy,
        ..parts
    };
    let placement = pivoted.to_matrix() * AffineTransform2D::translate(-half, -half);
    draw_overlay(&mut surface, overlay, &placement, scene.overlay_size());

    Ok(surface)
}

fn draw_background(surface: &mut RgbaImage, background: &Bitmap) -> Result<(), CompositeError> {
    if background.is_empty() {
        return Err(CompositeError::AssetLoad(format!(
            "background bitmap is empty ({}x{})",
            background.width, background.height
        )));
    }

    let (width, height) = surface.dimensions();
    let stretched = resize(background, width, height)
        .map_err(|e| CompositeError::AssetLoad(e.to_string()))?;

    for (dst, src) in surface
        .chunks_exact_mut(4)
        .zip(stretched.pixels.chunks_exact(4))
    {
        let out = over(
            [dst[0], dst[1], dst[2], dst[3]],
            [
                f64::from(src[0]),
                f64::from(src[1]),
                f64::from(src[2]),
                f64::from(src[3]),
            ],
        );
        dst.copy_from_slice(&out);
    }
    Ok(())
}

/// Draw `overlay` stretched to a `size`×`size` square placed by `placement`.
///
/// A singular placement (scale 0) draws nothing.
fn draw_overlay(
    surface: &mut RgbaImage,
    overlay: &Bitmap,
    placement: &AffineTransform2D,
    size: f64,
) {
    let Some(inverse) = placement.inverse() else {
        tracing::debug!("overlay collapsed to zero scale, nothing drawn");
        return;
    };

    let (width, height) = surface.dimensions();
    let corners = [
        placement.apply(0.0, 0.0),
        placement.apply(size, 0.0),
        placement.apply(0.0, size),
        placement.apply(size, size),
    ];
    let min_x = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let x0 = min_x.floor().clamp(0.0, f64::from(width)) as u32;
    let x1 = max_x.ceil().clamp(0.0, f64::from(width)) as u32;
    let y0 = min_y.floor().clamp(0.0, f64::from(height)) as u32;
    let y1 = max_y.ceil().clamp(0.0, f64::from(height)) as u32;

    // Overlay units to bitmap pixels
    let sx = f64::from(overlay.width) / size;
    let sy = f64::from(overlay.height) / size;

    for y in y0..y1 {
        for x in x0..x1 {
            let (u, v) = inverse.apply(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if u < 0.0 || u >= size || v < 0.0 || v >= size {
                continue;
            }

            let src = sample_bilinear(overlay, u * sx - 0.5, v * sy - 0.5);
            if src[3] <= 0.0 {
                continue;
            }

            let dst = surface.get_pixel_mut(x, y);
            dst.0 = over(dst.0, src);
        }
    }
}

/// Sample a pixel using bilinear interpolation in premultiplied space.
///
/// Coordinates are clamped to the bitmap edge. Returns straight-alpha RGBA
/// with channels in `0.0..=255.0`.
fn sample_bilinear(bitmap: &Bitmap, x: f64, y: f64) -> [f64; 4] {
    let max_x = f64::from(bitmap.width - 1);
    let max_y = f64::from(bitmap.height - 1);
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(bitmap.width - 1);
    let y1 = (y0 + 1).min(bitmap.height - 1);

    // Fractional distances
    let fx = x - f64::from(x0);
    let fy = y - f64::from(y0);

    let taps = [
        (bitmap.pixel(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (bitmap.pixel(x1, y0), fx * (1.0 - fy)),
        (bitmap.pixel(x0, y1), (1.0 - fx) * fy),
        (bitmap.pixel(x1, y1), fx * fy),
    ];

    let mut acc = [0.0f64; 4];
    for (p, w) in taps {
        let a = f64::from(p[3]) * w;
        acc[0] += f64::from(p[0]) * a;
        acc[1] += f64::from(p[1]) * a;
        acc[2] += f64::from(p[2]) * a;
        acc[3] += a;
    }

    if acc[3] <= 0.0 {
        return [0.0; 4];
    }
    [acc[0] / acc[3], acc[1] / acc[3], acc[2] / acc[3], acc[3]]
}

/// Straight-alpha source-over blend of `src` onto `dst`.
fn over(dst: [u8; 4], src: [f64; 4]) -> [u8; 4] {
    let sa = (src[3] / 255.0).clamp(0.0, 1.0);
    if sa >= 1.0 {
        return [to_u8(src[0]), to_u8(src[1]), to_u8(src[2]), 255];
    }
    if sa <= 0.0 {
        return dst;
    }

    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] * sa + f64::from(dst[i]) * da * (1.0 - sa)) / out_a;
        out[i] = to_u8(c);
    }
    out[3] = to_u8(out_a * 255.0);
    out
}

#[inline]
fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
