//! Recover translation, rotation and uniform scale from an affine transform.
//!
//! The manipulation surface keeps the aspect ratio locked, so the linear part
//! of every transform it emits is `R(θ) · s`. Under that invariant the first
//! column `(a, b)` is `(s·cos θ, s·sin θ)`, which gives both scale and angle.

use super::{AffineTransform2D, DecomposedTransform, TransformError};

/// Decompose a transform into rotation, uniform scale and translation.
///
/// A collapsed first column (`a == 0 && b == 0`) yields scale 0 and
/// rotation 0; drawing with it renders nothing, which is not an error.
/// The result is only meaningful for similarity transforms; see
/// [`decompose_checked`] to enforce that.
pub fn decompose(m: &AffineTransform2D) -> DecomposedTransform {
    DecomposedTransform {
        rotation_radians: m.b.atan2(m.a),
        uniform_scale: m.a.hypot(m.b),
        translate_x: m.tx,
        translate_y: m.ty,
    }
}

/// Decompose a transform after checking it is rotation times uniform scale.
///
/// # Errors
///
/// Returns `TransformError::NonFinite` for NaN/infinite coefficients and
/// `TransformError::NotSimilarity` when the matrix carries shear or
/// non-uniform scale beyond `tolerance`.
pub fn decompose_checked(
    m: &AffineTransform2D,
    tolerance: f64,
) -> Result<DecomposedTransform, TransformError> {
    if !m.is_finite() {
        return Err(TransformError::NonFinite);
    }
    if !m.is_similarity(tolerance) {
        return Err(TransformError::NotSimilarity(*m));
    }
    Ok(decompose(m))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
