//! Image decoding pipeline for Stickerlab.
//!
//! This module provides functionality for:
//! - Decoding uploaded images (PNG, JPEG, GIF, WebP, BMP) to RGBA bitmaps
//! - Applying EXIF orientation so the canvas fit sees upright dimensions
//! - Resampling bitmaps when stretching the background onto the surface
//!
//! # Architecture
//!
//! Reading the file and fetching the overlay asset are asynchronous in the
//! browser; decoding itself is synchronous and single-threaded within WASM.
//! The compositor only accepts finished `Bitmap` values, so pixel data is never
//! read before its decode has completed.

mod resize;
mod types;
mod upload;

pub use resize::resize;
pub use types::{Bitmap, DecodeError, Orientation};
pub use upload::{decode_image, decode_image_no_orientation};
