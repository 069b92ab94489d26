//! Editor configuration and its defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Long side of the canvas, in layout units, after fitting an upload.
pub const DEFAULT_CANVAS_SIZE: f64 = 500.0;

/// Side length of the overlay frame in layout units.
pub const OVERLAY_SIZE: f64 = 128.0;

/// Neutral backdrop painted under the background (`#f3f4f6`).
pub const NEUTRAL_FILL: [u8; 4] = [0xf3, 0xf4, 0xf6, 0xff];

/// File name offered for the exported image.
pub const EXPORT_FILE_NAME: &str = "edited-image.png";

/// MIME type of the exported image.
pub const EXPORT_MIME_TYPE: &str = "image/png";

/// Tolerance used when checking that a transform is rotation times uniform scale.
pub const SIMILARITY_TOLERANCE: f64 = 1e-6;

/// Largest accepted canvas long side, in layout units.
pub const MAX_CANVAS_SIDE: f64 = 8192.0;

/// Largest raster surface the compositor will allocate.
pub const MAX_SURFACE_PIXELS: u64 = 8192 * 8192;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid target_long_side {0}: must be finite, positive and at most 8192")]
    TargetLongSide(f64),

    #[error("Invalid overlay_size {0}: must be finite and positive")]
    OverlaySize(f64),

    #[error("Invalid similarity_tolerance {0}: must be finite and non-negative")]
    SimilarityTolerance(f64),

    #[error("export_file_name must not be empty")]
    EmptyFileName,
}

/// Tunable settings for an editing session.
///
/// Every field has a default, so a host can pass a partial object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Long side of the fitted canvas.
    pub target_long_side: f64,
    /// Overlay frame size (the overlay is always drawn square).
    pub overlay_size: f64,
    /// RGBA fill painted before the background.
    pub fill_color: [u8; 4],
    /// Download file name for exports.
    pub export_file_name: String,
    /// Relative tolerance for the no-shear check on incoming transforms.
    pub similarity_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            target_long_side: DEFAULT_CANVAS_SIZE,
            overlay_size: OVERLAY_SIZE,
            fill_color: NEUTRAL_FILL,
            export_file_name: EXPORT_FILE_NAME.to_string(),
            similarity_tolerance: SIMILARITY_TOLERANCE,
        }
    }
}

impl EditorConfig {
    /// Check every field before a session is built from this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let side = self.target_long_side;
        if !side.is_finite() || side <= 0.0 || side > MAX_CANVAS_SIDE {
            return Err(ConfigError::TargetLongSide(side));
        }
        if !self.overlay_size.is_finite() || self.overlay_size <= 0.0 {
            return Err(ConfigError::OverlaySize(self.overlay_size));
        }
        let tolerance = self.similarity_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::SimilarityTolerance(tolerance));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(ConfigError::EmptyFileName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.target_long_side, 500.0);
        assert_eq!(config.overlay_size, 128.0);
        assert_eq!(config.fill_color, [0xf3, 0xf4, 0xf6, 0xff]);
        assert_eq!(config.export_file_name, "edited-image.png");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EditorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        for tolerance in [-1.0, f64::NAN, f64::INFINITY] {
            let config = EditorConfig {
                similarity_tolerance: tolerance,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::SimilarityTolerance(_))
            ));
        }

        let exact = EditorConfig {
            similarity_tolerance: 0.0,
            ..Default::default()
        };
        assert!(exact.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_target_long_side() {
        for side in [0.0, -5.0, f64::NAN, 1e10, MAX_CANVAS_SIDE + 1.0] {
            let config = EditorConfig {
                target_long_side: side,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::TargetLongSide(_))
            ));
        }

        let largest = EditorConfig {
            target_long_side: MAX_CANVAS_SIDE,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_overlay_size_and_file_name() {
        let config = EditorConfig {
            overlay_size: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::OverlaySize(0.0)));

        let config = EditorConfig {
            export_file_name: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyFileName));
    }
}
