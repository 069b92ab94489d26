//! Stickerlab WASM - WebAssembly bindings for the Stickerlab editor
//!
//! This crate exposes the stickerlab-core session to JavaScript/TypeScript.
//! The host does the asynchronous parts (reading the uploaded file, fetching
//! the overlay asset) and passes finished byte buffers in.
//!
//! # Module Structure
//!
//! - `editor` - The `Editor` class wrapping one editing session
//! - `transform` - Stateless helpers: canvas fit, transform parsing, decomposition
//! - `types` - Plain JS object shapes and error conversion
//!
//! # Usage
//!
//! ```typescript
//! import init, { Editor } from '@stickerlab/wasm';
//!
//! await init();
//!
//! const editor = new Editor({ target_long_side: 500 });
//! editor.load_overlay(overlayBytes);
//! const layout = editor.upload_background(new Uint8Array(await file.arrayBuffer()));
//! console.log(`Canvas ${layout.width}x${layout.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod transform;
mod types;

pub use editor::Editor;
pub use transform::{decompose_transform, fit_canvas, parse_transform};
pub use types::LayoutSummary;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
