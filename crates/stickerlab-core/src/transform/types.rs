//! Core types for 2D affine transforms.

use std::fmt;
use std::ops::Mul;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for transform parsing and validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The transform string is malformed.
    #[error("Invalid transform at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// The transform uses a function this editor does not understand.
    #[error("Unsupported transform function: {0}")]
    UnknownFunction(String),

    /// A transform function received the wrong number of arguments.
    #[error("{function}() expects {expected} argument(s), got {actual}")]
    Arity {
        function: String,
        expected: &'static str,
        actual: usize,
    },

    /// The matrix contains NaN or infinite coefficients.
    #[error("Transform has non-finite coefficients")]
    NonFinite,

    /// The linear part is not rotation times uniform scale.
    #[error("Transform contains shear or non-uniform scale: {0}")]
    NotSimilarity(AffineTransform2D),
}

/// A 2D affine transform in CSS `matrix(a, b, c, d, tx, ty)` order.
///
/// A point `(x, y)` maps to `(a*x + c*y + tx, b*x + d*y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform2D {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `radians`, clockwise on screen (y axis points down).
    pub fn rotate(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let a = self.d * inv;
        let b = -self.b * inv;
        let c = -self.c * inv;
        let d = self.a * inv;
        Some(Self {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }

    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Whether the linear part is a rotation times a uniform scale.
    ///
    /// Holds when `a == d` and `b == -c` within `tolerance`. The tolerance is
    /// multiplied by the scale when the scale exceeds 1 and used as an
    /// absolute bound otherwise.
    pub fn is_similarity(&self, tolerance: f64) -> bool {
        let scale = self.a.hypot(self.b).max(self.c.hypot(self.d)).max(1.0);
        let limit = tolerance * scale;
        (self.a - self.d).abs() <= limit && (self.b + self.c).abs() <= limit
    }
}

impl Mul for AffineTransform2D {
    type Output = Self;

    /// Matrix product `self · rhs`: `rhs` is applied first.
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            tx: self.a * rhs.tx + self.c * rhs.ty + self.tx,
            ty: self.b * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }
}

impl fmt::Display for AffineTransform2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matrix({}, {}, {}, {}, {}, {})",
            self.a, self.b, self.c, self.d, self.tx, self.ty
        )
    }
}

/// Translation, rotation and uniform scale recovered from a transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecomposedTransform {
    pub rotation_radians: f64,
    pub uniform_scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl DecomposedTransform {
    /// Rebuild `translate · rotate · scale`.
    pub fn to_matrix(&self) -> AffineTransform2D {
        AffineTransform2D::translate(self.translate_x, self.translate_y)
            * AffineTransform2D::rotate(self.rotation_radians)
            * AffineTransform2D::scale(self.uniform_scale, self.uniform_scale)
    }
}
