//! Editing session: scene state plus the cached overlay asset.
//!
//! The session implements the two user flows, uploading a background and
//! exporting the composite, and scopes their failures: every error is logged
//! and returned, and a failed action never leaves the scene half-updated.

use std::sync::Arc;

use thiserror::Error;

use crate::canvas::{fit, FitError};
use crate::composite::{composite, CompositeError, CompositeOptions, ExportedImage};
use crate::config::{ConfigError, EditorConfig};
use crate::decode::{decode_image, decode_image_no_orientation, Bitmap, DecodeError};
use crate::encode::EncodeError;
use crate::scene::{LayoutChange, ManipulationEvent, OverlayRect, SceneState};
use crate::transform::TransformError;

/// Errors surfaced by session actions. None of them are fatal.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Asset failed to load: {0}")]
    AssetLoad(String),

    #[error("Canvas {width}x{height} is too large to export")]
    SurfaceTooLarge { width: u32, height: u32 },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl From<DecodeError> for SessionError {
    fn from(err: DecodeError) -> Self {
        SessionError::AssetLoad(err.to_string())
    }
}

impl From<CompositeError> for SessionError {
    fn from(err: CompositeError) -> Self {
        match err {
            CompositeError::AssetLoad(message) => SessionError::AssetLoad(message),
            CompositeError::SurfaceTooLarge { width, height } => {
                SessionError::SurfaceTooLarge { width, height }
            }
            CompositeError::Encode(e) => SessionError::Encode(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    scene: SceneState,
    overlay: Option<Arc<Bitmap>>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::from_valid(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start a session from host-supplied settings.
    ///
    /// # Errors
    ///
    /// `SessionError::Config` when a setting is out of range.
    pub fn new(config: EditorConfig) -> Result<Self, SessionError> {
        config
            .validate()
            .inspect_err(|err| tracing::warn!(%err, "editor config rejected"))?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: EditorConfig) -> Self {
        let scene = SceneState::new(&config);
        Self {
            config,
            scene,
            overlay: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn has_background(&self) -> bool {
        self.scene.background().is_some()
    }

    pub fn overlay_loaded(&self) -> bool {
        self.overlay.is_some()
    }

    /// Decode and cache the overlay asset.
    ///
    /// On failure the previously cached overlay, if any, is kept.
    pub fn load_overlay(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let bitmap = decode_image_no_orientation(bytes)
            .map_err(SessionError::from)
            .inspect_err(|err| tracing::warn!(%err, "overlay asset failed to load"))?;
        self.set_overlay(Arc::new(bitmap));
        Ok(())
    }

    /// Cache an already decoded overlay.
    pub fn set_overlay(&mut self, bitmap: Arc<Bitmap>) {
        tracing::debug!(
            width = bitmap.width,
            height = bitmap.height,
            "overlay asset cached"
        );
        self.overlay = Some(bitmap);
    }

    /// Decode an upload, fit the canvas to it and make it the background.
    ///
    /// # Errors
    ///
    /// `SessionError::AssetLoad` when the bytes cannot be decoded and
    /// `SessionError::Fit` when the image has unusable dimensions. In both
    /// cases the canvas, background and overlay are left as they were.
    pub fn upload_background(&mut self, bytes: &[u8]) -> Result<LayoutChange, SessionError> {
        self.try_upload(bytes)
            .inspect_err(|err| tracing::warn!(%err, "background upload skipped"))
    }

    fn try_upload(&mut self, bytes: &[u8]) -> Result<LayoutChange, SessionError> {
        let bitmap = decode_image(bytes)?;
        let (natural_width, natural_height) = bitmap.natural_size();
        let dimensions = fit(natural_width, natural_height, self.config.target_long_side)?;
        Ok(self.scene.set_background(Arc::new(bitmap), dimensions))
    }

    /// Forward a manipulation event to the scene.
    pub fn apply_event(&mut self, event: &ManipulationEvent) -> Result<(), SessionError> {
        Ok(self.scene.apply_event(event)?)
    }

    pub fn overlay_rect(&self) -> OverlayRect {
        self.scene.current_overlay_screen_rect()
    }

    /// Composite the current scene into a PNG export.
    ///
    /// # Errors
    ///
    /// `SessionError::AssetLoad` when the overlay has not been loaded or a
    /// bitmap is unusable, `SessionError::SurfaceTooLarge` when the canvas is
    /// past the raster limit, `SessionError::Encode` when PNG encoding fails.
    pub fn export(&self) -> Result<ExportedImage, SessionError> {
        self.try_export()
            .inspect_err(|err| tracing::warn!(%err, "export aborted"))
    }

    fn try_export(&self) -> Result<ExportedImage, SessionError> {
        let overlay = self
            .overlay
            .as_ref()
            .ok_or_else(|| SessionError::AssetLoad("overlay asset not loaded".to_string()))?;
        let options = CompositeOptions::from(&self.config);
        Ok(composite(&self.scene, overlay, &options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_png;
    use crate::scene::ManipulationKind;

    fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let bitmap = Bitmap::solid(width, height, rgba);
        encode_png(&bitmap.pixels, width, height).unwrap()
    }

    fn loaded_session() -> EditorSession {
        let mut session = EditorSession::default();
        session.load_overlay(&png(64, 64, [255, 0, 0, 255])).unwrap();
        session
    }

    #[test]
    fn test_upload_landscape_fits_canvas() {
        let mut session = loaded_session();
        let change = session
            .upload_background(&png(1000, 400, [0, 128, 0, 255]))
            .unwrap();

        assert_eq!(change.generation, 1);
        assert_eq!(change.canvas.width(), 500.0);
        assert_eq!(change.canvas.height(), 200.0);
        assert_eq!(change.overlay_rect.x, 186.0);
        assert_eq!(change.overlay_rect.y, 36.0);
        assert!(session.has_background());
    }

    #[test]
    fn test_upload_portrait_fits_canvas() {
        let mut session = loaded_session();
        let change = session
            .upload_background(&png(300, 600, [0, 0, 0, 255]))
            .unwrap();
        assert_eq!(change.canvas.width(), 250.0);
        assert_eq!(change.canvas.height(), 500.0);
    }

    #[test]
    fn test_upload_garbage_is_asset_error_and_keeps_state() {
        let mut session = loaded_session();
        session
            .upload_background(&png(1000, 400, [0, 0, 0, 255]))
            .unwrap();
        let before = session.scene().canvas();

        let result = session.upload_background(b"not an image");
        assert!(matches!(result, Err(SessionError::AssetLoad(_))));
        assert_eq!(session.scene().canvas(), before);
        assert_eq!(session.scene().layout_generation(), 1);
    }

    #[test]
    fn test_zero_target_long_side_rejected_up_front() {
        let config = EditorConfig {
            target_long_side: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            EditorSession::new(config),
            Err(SessionError::Config(ConfigError::TargetLongSide(_)))
        ));
    }

    #[test]
    fn test_bad_tolerance_rejected_instead_of_freezing_overlay() {
        for tolerance in [-1.0, f64::NAN] {
            let config = EditorConfig {
                similarity_tolerance: tolerance,
                ..Default::default()
            };
            assert!(matches!(
                EditorSession::new(config),
                Err(SessionError::Config(ConfigError::SimilarityTolerance(_)))
            ));
        }

        let mut session = EditorSession::new(EditorConfig::default()).unwrap();
        session
            .apply_event(&ManipulationEvent::new(
                ManipulationKind::Drag,
                "matrix(1, 0, 0, 1, 5, 5)",
            ))
            .unwrap();
        session
            .apply_event(&ManipulationEvent::new(ManipulationKind::Drag, "none"))
            .unwrap();
    }

    #[test]
    fn test_huge_target_long_side_rejected_before_export() {
        let config = EditorConfig {
            target_long_side: 1e10,
            ..Default::default()
        };
        assert!(matches!(
            EditorSession::new(config),
            Err(SessionError::Config(ConfigError::TargetLongSide(_)))
        ));
    }

    #[test]
    fn test_valid_larger_canvas_exports() {
        let config = EditorConfig {
            target_long_side: 1024.0,
            ..Default::default()
        };
        let mut session = EditorSession::new(config).unwrap();
        session.load_overlay(&png(8, 8, [0, 0, 0, 255])).unwrap();
        let export = session.export().unwrap();
        assert_eq!((export.width, export.height), (1024, 1024));
    }

    #[test]
    fn test_export_without_overlay_is_asset_error() {
        let session = EditorSession::default();
        match session.export() {
            Err(SessionError::AssetLoad(message)) => {
                assert_eq!(message, "overlay asset not loaded");
            }
            other => panic!("expected AssetLoad, got {other:?}"),
        }
    }

    #[test]
    fn test_export_without_upload_succeeds() {
        let session = loaded_session();
        let export = session.export().unwrap();
        assert_eq!((export.width, export.height), (500, 500));
        assert_eq!(export.file_name, "edited-image.png");
        assert_eq!(export.mime_type, "image/png");
    }

    #[test]
    fn test_export_uses_configured_file_name() {
        let config = EditorConfig {
            export_file_name: "sticker.png".to_string(),
            ..Default::default()
        };
        let mut session = EditorSession::new(config).unwrap();
        session.load_overlay(&png(8, 8, [0, 0, 0, 255])).unwrap();
        assert_eq!(session.export().unwrap().file_name, "sticker.png");
    }

    #[test]
    fn test_failed_overlay_load_keeps_cache() {
        let mut session = loaded_session();
        assert!(matches!(
            session.load_overlay(&[0u8; 16]),
            Err(SessionError::AssetLoad(_))
        ));
        assert!(session.overlay_loaded());
        assert!(session.export().is_ok());
    }

    #[test]
    fn test_events_drive_overlay_rect() {
        let mut session = loaded_session();
        session
            .apply_event(&ManipulationEvent::new(
                ManipulationKind::Drag,
                "translate(10px, 20px)",
            ))
            .unwrap();
        let rect = session.overlay_rect();
        assert_eq!((rect.x, rect.y), (196.0, 206.0));

        let bad = ManipulationEvent::new(ManipulationKind::Scale, "skew(10deg)");
        assert!(session.apply_event(&bad).is_err());
        assert_eq!(session.overlay_rect(), rect);
    }

    #[test]
    fn test_upload_resets_overlay_transform() {
        let mut session = loaded_session();
        session
            .apply_event(&ManipulationEvent::new(ManipulationKind::Rotate, "rotate(45deg)"))
            .unwrap();
        session
            .upload_background(&png(200, 200, [9, 9, 9, 255]))
            .unwrap();
        let rect = session.overlay_rect();
        assert_eq!((rect.x, rect.y, rect.width), (186.0, 186.0, 128.0));
    }

    #[test]
    fn test_export_is_idempotent() {
        let mut session = loaded_session();
        session
            .upload_background(&png(640, 480, [20, 40, 60, 255]))
            .unwrap();
        session
            .apply_event(&ManipulationEvent::new(
                ManipulationKind::Rotate,
                "rotate(30deg) scale(1.5)",
            ))
            .unwrap();
        assert_eq!(session.export().unwrap().bytes, session.export().unwrap().bytes);
    }

    #[test]
    fn test_composite_error_conversion() {
        let err: SessionError = CompositeError::AssetLoad("gone".into()).into();
        assert!(matches!(err, SessionError::AssetLoad(m) if m == "gone"));

        let err: SessionError = DecodeError::InvalidFormat.into();
        assert!(matches!(err, SessionError::AssetLoad(_)));

        let err: SessionError = CompositeError::SurfaceTooLarge {
            width: 9000,
            height: 9000,
        }
        .into();
        assert!(matches!(
            err,
            SessionError::SurfaceTooLarge {
                width: 9000,
                height: 9000
            }
        ));
    }
}
