//! JavaScript-facing data shapes and error conversion.
//!
//! Plain structs here are serialized with `serde-wasm-bindgen`, so JavaScript
//! receives ordinary objects rather than wrapper classes.

use serde::Serialize;
use stickerlab_core::{LayoutChange, OverlayRect};
use wasm_bindgen::prelude::*;

/// Result of a background upload, as seen by the manipulation surface.
///
/// ```typescript
/// { generation: 1, width: 500, height: 200, overlay: { x: 186, y: 36, width: 128, height: 128 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub generation: u64,
    pub width: f64,
    pub height: f64,
    pub overlay: OverlayRect,
}

impl From<LayoutChange> for LayoutSummary {
    fn from(change: LayoutChange) -> Self {
        Self {
            generation: change.generation,
            width: change.canvas.width(),
            height: change.canvas.height(),
            overlay: change.overlay_rect,
        }
    }
}

/// Convert an error into a `JsValue` string and report it on the console.
pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    let message = JsValue::from_str(&err.to_string());
    web_sys::console::error_1(&message);
    message
}

/// Serialize a value into a plain JavaScript object.
pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}
