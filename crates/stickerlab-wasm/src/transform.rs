//! Stateless geometry helpers exposed to JavaScript.

use stickerlab_core::{canvas, transform, AffineTransform2D, DecomposedTransform};
use wasm_bindgen::prelude::*;

use crate::types::{js_error, to_js};

/// Fit a canvas to an image's natural size.
///
/// Returns `{ width, height }` with the long side equal to
/// `target_long_side`.
///
/// ```typescript
/// fit_canvas(1000, 400, 500); // { width: 500, height: 200 }
/// ```
#[wasm_bindgen]
pub fn fit_canvas(
    natural_width: f64,
    natural_height: f64,
    target_long_side: f64,
) -> Result<JsValue, JsValue> {
    let dims = canvas::fit(natural_width, natural_height, target_long_side).map_err(js_error)?;
    to_js(&dims)
}

/// Parse a CSS transform string into `[a, b, c, d, tx, ty]`.
#[wasm_bindgen]
pub fn parse_transform(css: &str) -> Result<Vec<f64>, JsValue> {
    transform::parse_transform(css)
        .map(matrix_to_array)
        .map_err(js_error)
}

/// Split a matrix into rotation, uniform scale and translation.
///
/// Returns `{ rotation_radians, uniform_scale, translate_x, translate_y }`.
#[wasm_bindgen]
pub fn decompose_transform(
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    tx: f64,
    ty: f64,
) -> Result<JsValue, JsValue> {
    to_js(&decompose_parts(a, b, c, d, tx, ty))
}

fn matrix_to_array(m: AffineTransform2D) -> Vec<f64> {
    vec![m.a, m.b, m.c, m.d, m.tx, m.ty]
}

fn decompose_parts(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> DecomposedTransform {
    transform::decompose(&AffineTransform2D::new(a, b, c, d, tx, ty))
}
