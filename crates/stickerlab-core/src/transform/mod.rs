//! Overlay transforms: parsing, matrix algebra and decomposition.
//!
//! The manipulation surface reports the overlay's accumulated transform as a
//! CSS transform string. This module turns it into an [`AffineTransform2D`]
//! and recovers the rotation and uniform scale the compositor needs.
//!
//! # Coordinate System
//!
//! - Layout units, origin at the canvas top-left, y pointing down
//! - Positive rotation is clockwise on screen (CSS `rotate()`)
//! - Transforms act about the overlay frame's centre (`transform-origin: 50% 50%`)

mod decompose;
mod parse;
mod types;

pub use decompose::{decompose, decompose_checked};
pub use parse::parse_transform;
pub use types::{AffineTransform2D, DecomposedTransform, TransformError};
