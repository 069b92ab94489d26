//! The `Editor` class: one editing session exposed to JavaScript.
//!
//! # Example
//!
//! ```typescript
//! import { Editor } from '@stickerlab/wasm';
//!
//! const editor = new Editor();
//! editor.load_overlay(new Uint8Array(await (await fetch('/crow.png')).arrayBuffer()));
//!
//! const layout = editor.upload_background(new Uint8Array(await file.arrayBuffer()));
//! moveable.updateRect(layout.overlay);
//!
//! moveable.on('drag', (e) => editor.apply_transform('drag', e.transform));
//!
//! const png = editor.export_png();
//! download(new Blob([png], { type: 'image/png' }), editor.export_file_name);
//! ```

use js_sys::Uint8Array;
use stickerlab_core::{
    EditorConfig, EditorSession, ExportedImage, ManipulationEvent, ManipulationKind, OverlayRect,
    SessionError,
};
use wasm_bindgen::prelude::*;

use crate::types::{js_error, to_js, LayoutSummary};

/// An editing session: background, overlay and the overlay's transform.
#[wasm_bindgen]
pub struct Editor {
    session: EditorSession,
}

#[wasm_bindgen]
impl Editor {
    /// Create an editor, optionally from a partial configuration object.
    ///
    /// Missing fields fall back to their defaults; `undefined` or `null`
    /// gives the default configuration. Out-of-range values are rejected.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Editor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| js_error(format!("Invalid editor config: {e}")))?
        };
        Self::with_config(config).map_err(js_error)
    }

    /// Decode and cache the overlay asset.
    pub fn load_overlay(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.session.load_overlay(bytes).map_err(js_error)
    }

    /// Decode an uploaded image and make it the background.
    ///
    /// Returns `{ generation, width, height, overlay: { x, y, width, height } }`
    /// so the manipulation surface can resync its bounds immediately.
    pub fn upload_background(&mut self, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let summary = self.upload(bytes).map_err(js_error)?;
        to_js(&summary)
    }

    /// Apply a transform string reported by a drag, scale or rotate gesture.
    pub fn apply_transform(&mut self, kind: &str, transform: &str) -> Result<(), JsValue> {
        self.apply(kind, transform).map_err(js_error)
    }

    /// Current on-screen bounding box of the overlay.
    pub fn overlay_rect(&self) -> Result<JsValue, JsValue> {
        to_js(&self.rect())
    }

    #[wasm_bindgen(getter)]
    pub fn canvas_width(&self) -> f64 {
        self.session.scene().canvas().width()
    }

    #[wasm_bindgen(getter)]
    pub fn canvas_height(&self) -> f64 {
        self.session.scene().canvas().height()
    }

    #[wasm_bindgen(getter)]
    pub fn has_background(&self) -> bool {
        self.session.has_background()
    }

    /// Composite the scene and return the PNG bytes.
    pub fn export_png(&self) -> Result<Uint8Array, JsValue> {
        let export = self.export().map_err(js_error)?;
        Ok(Uint8Array::from(export.bytes.as_slice()))
    }

    /// File name to offer for the download.
    #[wasm_bindgen(getter)]
    pub fn export_file_name(&self) -> String {
        self.session.config().export_file_name.clone()
    }
}

impl Editor {
    pub(crate) fn with_config(config: EditorConfig) -> Result<Self, SessionError> {
        Ok(Self {
            session: EditorSession::new(config)?,
        })
    }

    fn upload(&mut self, bytes: &[u8]) -> Result<LayoutSummary, String> {
        self.session
            .upload_background(bytes)
            .map(LayoutSummary::from)
            .map_err(|e| e.to_string())
    }

    fn apply(&mut self, kind: &str, transform: &str) -> Result<(), String> {
        let kind = ManipulationKind::from_name(kind)
            .ok_or_else(|| format!("Unknown manipulation kind: {kind}"))?;
        self.session
            .apply_event(&ManipulationEvent::new(kind, transform))
            .map_err(|e| e.to_string())
    }

    fn rect(&self) -> OverlayRect {
        self.session.overlay_rect()
    }

    fn export(&self) -> Result<ExportedImage, String> {
        self.session.export().map_err(|e| e.to_string())
    }
}
