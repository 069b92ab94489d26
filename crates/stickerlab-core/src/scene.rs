//! Scene state: the single mutable source of truth for an editing session.
//!
//! The scene holds the canvas size, the background bitmap and the overlay's
//! frame plus its live transform. The manipulation surface talks to it through
//! [`ManipulationEvent`] messages; the compositor reads it synchronously.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::canvas::Dimensions;
use crate::config::EditorConfig;
use crate::decode::Bitmap;
use crate::transform::{parse_transform, AffineTransform2D, TransformError};

/// Axis-aligned rectangle relative to the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl OverlayRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest rectangle containing all `points`.
    fn bounding(points: &[(f64, f64)]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

/// Gesture that produced a transform update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManipulationKind {
    Drag,
    Scale,
    Rotate,
}

impl ManipulationKind {
    /// Parse a gesture name (`"drag"`, `"scale"`, `"rotate"`), case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "drag" => Some(Self::Drag),
            "scale" => Some(Self::Scale),
            "rotate" => Some(Self::Rotate),
            _ => None,
        }
    }
}

/// One transform update from the manipulation surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulationEvent {
    pub kind: ManipulationKind,
    /// CSS transform string, e.g. `matrix(a, b, c, d, tx, ty)`.
    pub transform: String,
}

impl ManipulationEvent {
    pub fn new(kind: ManipulationKind, transform: impl Into<String>) -> Self {
        Self {
            kind,
            transform: transform.into(),
        }
    }
}

/// Notification emitted whenever the canvas layout is replaced.
///
/// The manipulation surface resyncs its bounds from this instead of
/// re-measuring after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutChange {
    pub generation: u64,
    pub canvas: Dimensions,
    pub overlay_rect: OverlayRect,
}

#[derive(Debug, Clone)]
pub struct SceneState {
    canvas: Dimensions,
    background: Option<Arc<Bitmap>>,
    overlay_size: f64,
    /// Top-left of the untransformed overlay frame.
    overlay_origin: (f64, f64),
    overlay_transform: AffineTransform2D,
    similarity_tolerance: f64,
    layout_generation: u64,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl SceneState {
    /// Placeholder canvas (long side × long side) with the overlay centred.
    pub fn new(config: &EditorConfig) -> Self {
        let canvas = Dimensions::new(config.target_long_side, config.target_long_side)
            .unwrap_or_default();
        let overlay_size = if config.overlay_size.is_finite() && config.overlay_size > 0.0 {
            config.overlay_size
        } else {
            crate::config::OVERLAY_SIZE
        };
        Self {
            canvas,
            background: None,
            overlay_size,
            overlay_origin: centered_origin(&canvas, overlay_size),
            overlay_transform: AffineTransform2D::IDENTITY,
            similarity_tolerance: config.similarity_tolerance,
            layout_generation: 0,
        }
    }

    pub fn canvas(&self) -> Dimensions {
        self.canvas
    }

    pub fn background(&self) -> Option<&Arc<Bitmap>> {
        self.background.as_ref()
    }

    pub fn overlay_size(&self) -> f64 {
        self.overlay_size
    }

    pub fn overlay_transform(&self) -> AffineTransform2D {
        self.overlay_transform
    }

    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    /// Untransformed overlay frame: the square the transform acts on.
    pub fn overlay_frame(&self) -> OverlayRect {
        OverlayRect {
            x: self.overlay_origin.0,
            y: self.overlay_origin.1,
            width: self.overlay_size,
            height: self.overlay_size,
        }
    }

    /// Replace background and canvas together, then recenter the overlay.
    pub fn set_background(&mut self, bitmap: Arc<Bitmap>, dimensions: Dimensions) -> LayoutChange {
        self.background = Some(bitmap);
        self.set_canvas_dimensions(dimensions)
    }

    /// Resize the canvas, recentering the overlay with an identity transform.
    pub fn set_canvas_dimensions(&mut self, dimensions: Dimensions) -> LayoutChange {
        self.canvas = dimensions;
        self.reset_overlay();
        self.layout_generation += 1;

        let change = LayoutChange {
            generation: self.layout_generation,
            canvas: self.canvas,
            overlay_rect: self.current_overlay_screen_rect(),
        };
        tracing::debug!(
            generation = change.generation,
            width = dimensions.width(),
            height = dimensions.height(),
            "canvas layout replaced"
        );
        change
    }

    /// Recenter the overlay and drop its transform.
    pub fn reset_overlay(&mut self) {
        self.overlay_origin = centered_origin(&self.canvas, self.overlay_size);
        self.overlay_transform = AffineTransform2D::IDENTITY;
    }

    /// Store the latest transform from the manipulation surface.
    ///
    /// Last write wins. Matrices with shear, non-uniform scale or non-finite
    /// coefficients are rejected and the previous transform is kept.
    pub fn update_overlay_transform(
        &mut self,
        matrix: AffineTransform2D,
    ) -> Result<(), TransformError> {
        if !matrix.is_finite() {
            tracing::warn!(%matrix, "rejected non-finite overlay transform");
            return Err(TransformError::NonFinite);
        }
        if !matrix.is_similarity(self.similarity_tolerance) {
            tracing::warn!(%matrix, "rejected overlay transform with shear");
            return Err(TransformError::NotSimilarity(matrix));
        }
        self.overlay_transform = matrix;
        Ok(())
    }

    /// Parse an event's transform string and apply it.
    pub fn apply_event(&mut self, event: &ManipulationEvent) -> Result<(), TransformError> {
        let matrix = parse_transform(&event.transform).inspect_err(|err| {
            tracing::warn!(kind = ?event.kind, %err, "malformed transform from manipulation surface");
        })?;
        self.update_overlay_transform(matrix)
    }

    /// On-screen bounding box of the transformed overlay, canvas-relative.
    ///
    /// The transform acts about the frame centre, so the box is the
    /// axis-aligned hull of the four transformed frame corners.
    pub fn current_overlay_screen_rect(&self) -> OverlayRect {
        let frame = self.overlay_frame();
        let (cx, cy) = frame.center();
        let placed = AffineTransform2D::translate(cx, cy)
            * self.overlay_transform
            * AffineTransform2D::translate(-cx, -cy);

        let corners = [
            placed.apply(frame.x, frame.y),
            placed.apply(frame.x + frame.width, frame.y),
            placed.apply(frame.x, frame.y + frame.height),
            placed.apply(frame.x + frame.width, frame.y + frame.height),
        ];
        OverlayRect::bounding(&corners)
    }
}

fn centered_origin(canvas: &Dimensions, overlay_size: f64) -> (f64, f64) {
    (
        canvas.width() / 2.0 - overlay_size / 2.0,
        canvas.height() / 2.0 - overlay_size / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::fit;

    const EPS: f64 = 1e-9;

    fn assert_rect(rect: OverlayRect, x: f64, y: f64, w: f64, h: f64) {
        assert!(
            (rect.x - x).abs() < EPS
                && (rect.y - y).abs() < EPS
                && (rect.width - w).abs() < EPS
                && (rect.height - h).abs() < EPS,
            "got {rect:?}, expected ({x}, {y}, {w}, {h})"
        );
    }

    #[test]
    fn test_default_scene_is_centered_placeholder() {
        let scene = SceneState::default();
        assert_eq!(scene.canvas(), Dimensions::default());
        assert!(scene.background().is_none());
        assert_eq!(scene.overlay_transform(), AffineTransform2D::IDENTITY);
        assert_rect(scene.current_overlay_screen_rect(), 186.0, 186.0, 128.0, 128.0);
    }

    #[test]
    fn test_set_background_recenters_overlay() {
        let mut scene = SceneState::default();
        scene
            .update_overlay_transform(AffineTransform2D::translate(40.0, 10.0))
            .unwrap();

        let dims = fit(1000.0, 400.0, 500.0).unwrap();
        let bitmap = Arc::new(Bitmap::solid(1000, 400, [0, 0, 0, 255]));
        let change = scene.set_background(bitmap, dims);

        assert_eq!(change.generation, 1);
        assert_eq!(change.canvas.width(), 500.0);
        assert_eq!(change.canvas.height(), 200.0);
        assert_rect(change.overlay_rect, 186.0, 36.0, 128.0, 128.0);
        assert_eq!(scene.overlay_transform(), AffineTransform2D::IDENTITY);
        assert!(scene.background().is_some());
    }

    #[test]
    fn test_layout_generation_increments() {
        let mut scene = SceneState::default();
        let dims = Dimensions::new(300.0, 200.0).unwrap();
        assert_eq!(scene.set_canvas_dimensions(dims).generation, 1);
        assert_eq!(scene.set_canvas_dimensions(dims).generation, 2);
        assert_eq!(scene.layout_generation(), 2);
    }

    #[test]
    fn test_drag_moves_rect() {
        let mut scene = SceneState::default();
        scene
            .apply_event(&ManipulationEvent::new(
                ManipulationKind::Drag,
                "matrix(1, 0, 0, 1, 30, -20)",
            ))
            .unwrap();
        assert_rect(scene.current_overlay_screen_rect(), 216.0, 166.0, 128.0, 128.0);
    }

    #[test]
    fn test_rotate_and_scale_keep_pivot() {
        let mut scene = SceneState::default();
        scene
            .apply_event(&ManipulationEvent::new(
                ManipulationKind::Rotate,
                "rotate(90deg) scale(2)",
            ))
            .unwrap();

        let rect = scene.current_overlay_screen_rect();
        assert_rect(rect, 122.0, 122.0, 256.0, 256.0);
        let (cx, cy) = rect.center();
        assert!((cx - 250.0).abs() < EPS && (cy - 250.0).abs() < EPS);
    }

    #[test]
    fn test_rotation_45_expands_bounding_box() {
        let mut scene = SceneState::default();
        scene
            .update_overlay_transform(AffineTransform2D::rotate(std::f64::consts::FRAC_PI_4))
            .unwrap();
        let rect = scene.current_overlay_screen_rect();
        let diagonal = 128.0 * std::f64::consts::SQRT_2;
        assert!((rect.width - diagonal).abs() < 1e-9);
        assert!((rect.height - diagonal).abs() < 1e-9);
    }

    #[test]
    fn test_last_write_wins() {
        let mut scene = SceneState::default();
        scene
            .update_overlay_transform(AffineTransform2D::translate(1.0, 1.0))
            .unwrap();
        scene
            .update_overlay_transform(AffineTransform2D::translate(5.0, 7.0))
            .unwrap();
        assert_eq!(scene.overlay_transform(), AffineTransform2D::translate(5.0, 7.0));
    }

    #[test]
    fn test_rejects_shear_and_keeps_previous() {
        let mut scene = SceneState::default();
        let good = AffineTransform2D::translate(3.0, 4.0);
        scene.update_overlay_transform(good).unwrap();

        let sheared = AffineTransform2D::new(1.0, 0.0, 0.5, 1.0, 0.0, 0.0);
        assert!(matches!(
            scene.update_overlay_transform(sheared),
            Err(TransformError::NotSimilarity(_))
        ));
        assert_eq!(scene.overlay_transform(), good);
    }

    #[test]
    fn test_malformed_event_keeps_previous() {
        let mut scene = SceneState::default();
        let event = ManipulationEvent::new(ManipulationKind::Scale, "matrix(2, 0, 0");
        assert!(scene.apply_event(&event).is_err());
        assert_eq!(scene.overlay_transform(), AffineTransform2D::IDENTITY);
    }

    #[test]
    fn test_empty_transform_resets_to_identity() {
        let mut scene = SceneState::default();
        scene
            .update_overlay_transform(AffineTransform2D::translate(9.0, 9.0))
            .unwrap();
        scene
            .apply_event(&ManipulationEvent::new(ManipulationKind::Drag, ""))
            .unwrap();
        assert_eq!(scene.overlay_transform(), AffineTransform2D::IDENTITY);
    }

    #[test]
    fn test_zero_scale_collapses_rect_to_pivot() {
        let mut scene = SceneState::default();
        scene
            .update_overlay_transform(AffineTransform2D::scale(0.0, 0.0))
            .unwrap();
        assert_rect(scene.current_overlay_screen_rect(), 250.0, 250.0, 0.0, 0.0);
    }

    #[test]
    fn test_manipulation_kind_from_name() {
        assert_eq!(ManipulationKind::from_name("drag"), Some(ManipulationKind::Drag));
        assert_eq!(ManipulationKind::from_name("Rotate"), Some(ManipulationKind::Rotate));
        assert_eq!(ManipulationKind::from_name("SCALE"), Some(ManipulationKind::Scale));
        assert_eq!(ManipulationKind::from_name("pinch"), None);
    }

    #[test]
    fn test_custom_overlay_size() {
        let config = EditorConfig {
            overlay_size: 64.0,
            ..Default::default()
        };
        let scene = SceneState::new(&config);
        assert_rect(scene.overlay_frame(), 218.0, 218.0, 64.0, 64.0);
    }
}
