//! Canvas sizing: layout dimensions and the aspect-preserving fit.
//!
//! The canvas takes the aspect ratio of the uploaded background with its long
//! side pinned to a fixed target (500 layout units by default). Results stay
//! fractional; rounding to pixels happens only when the compositor allocates
//! its surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while sizing the canvas.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// A source or target dimension is zero, negative, or not finite.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
}

/// Canvas or bitmap size in layout units.
///
/// Both sides are always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    width: f64,
    height: f64,
}

impl Dimensions {
    /// Create validated dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self, FitError> {
        if !is_positive(width) || !is_positive(height) {
            return Err(FitError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Pixel size of a raster surface for these dimensions.
    ///
    /// Fractional sizes truncate toward zero, matching how a canvas element
    /// coerces its `width`/`height` attributes. Never returns a zero side.
    pub fn to_pixels(&self) -> (u32, u32) {
        let w = (self.width.trunc() as u32).max(1);
        let h = (self.height.trunc() as u32).max(1);
        (w, h)
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: crate::config::DEFAULT_CANVAS_SIZE,
            height: crate::config::DEFAULT_CANVAS_SIZE,
        }
    }
}

#[inline]
fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Fit a source of the given natural size into a box whose long side is
/// `target_long_side`, preserving aspect ratio.
///
/// Landscape sources (`width > height`) pin the width; portrait and exactly
/// square sources pin the height.
///
/// # Errors
///
/// Returns `FitError::InvalidDimensions` when any input is zero, negative or
/// not finite.
///
/// # Example
///
/// ```ignore
/// let dims = fit(1000.0, 400.0, 500.0)?;
/// assert_eq!((dims.width(), dims.height()), (500.0, 200.0));
/// ```
pub fn fit(
    natural_width: f64,
    natural_height: f64,
    target_long_side: f64,
) -> Result<Dimensions, FitError> {
    if !is_positive(natural_width) || !is_positive(natural_height) {
        return Err(FitError::InvalidDimensions {
            width: natural_width,
            height: natural_height,
        });
    }
    if !is_positive(target_long_side) {
        return Err(FitError::InvalidDimensions {
            width: target_long_side,
            height: target_long_side,
        });
    }

    if natural_width > natural_height {
        // Landscape: constrain by width
        let height = target_long_side * natural_height / natural_width;
        Dimensions::new(target_long_side, height)
    } else {
        // Portrait or square: constrain by height
        let width = target_long_side * natural_width / natural_height;
        Dimensions::new(width, target_long_side)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
