//! Stickerlab Core - sticker overlay compositing library
//!
//! This crate provides the core of the Stickerlab editor: fitting the canvas
//! to an uploaded background, tracking the overlay's affine transform as the
//! user drags, scales and rotates it, and flattening the scene into a PNG.

pub mod canvas;
pub mod composite;
pub mod config;
pub mod decode;
pub mod encode;
pub mod scene;
pub mod session;
pub mod transform;

pub use canvas::{fit, Dimensions, FitError};
pub use composite::{composite, render_surface, CompositeError, CompositeOptions, ExportedImage};
pub use config::{ConfigError, EditorConfig};
pub use decode::{decode_image, Bitmap, DecodeError};
pub use encode::{encode_png, EncodeError};
pub use scene::{LayoutChange, ManipulationEvent, ManipulationKind, OverlayRect, SceneState};
pub use session::{EditorSession, SessionError};
pub use transform::{
    decompose, decompose_checked, parse_transform, AffineTransform2D, DecomposedTransform,
    TransformError,
};
