//! Image encoding pipeline for Stickerlab.
//!
//! This module provides functionality for:
//! - Encoding the composited surface to lossless RGBA PNG
//!
//! # Architecture
//!
//! Encoding runs synchronously inside the export step; the caller hands the
//! resulting bytes to the browser download.
//!
//! # Examples
//!
//! ```ignore
//! use stickerlab_core::encode::encode_png;
//!
//! let pixels = vec![128u8; 100 * 100 * 4]; // Gray, half-transparent image
//! let png_bytes = encode_png(&pixels, 100, 100).unwrap();
//! println!("Encoded {} bytes", png_bytes.len());
//! ```

mod png;

pub use png::{encode_png, EncodeError};
