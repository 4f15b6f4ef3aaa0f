//! Split settings, print constants and the product policy around them.
//!
//! The policy checks in [`ImageSettings::check_policy`] belong to the calling
//! layer: the split itself accepts any positive target width and any angle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed output resolution for every sheet, in pixels per inch.
pub const PRINT_DPI: u32 = 300;

/// Below this informational DPI the upload is flagged as low quality.
pub const MIN_DPI: u32 = 150;

/// At or above this informational DPI the upload is rated excellent.
pub const OPTIMAL_DPI: u32 = 300;

/// Allowed range for the reassembled print width, in inches.
pub const TARGET_WIDTH_RANGE: (f64, f64) = (4.0, 8.0);

/// Allowed range for the rotation angle, in degrees.
pub const ROTATION_RANGE: (f64, f64) = (-180.0, 180.0);

/// Overlap choices offered to the user. Zero (no overlap) is also accepted.
pub const OVERLAP_OPTIONS: [u32; 3] = [5, 10, 15];

/// Spacing of the optional alignment grid.
pub const GRID_SPACING_CM: f64 = 1.0;

/// Size of the optional registration cross.
pub const ALIGNMENT_MARK_SIZE_MM: f64 = 5.0;

const MM_PER_INCH: f64 = 25.4;

/// Pixels per millimetre at [`PRINT_DPI`].
pub fn pixels_per_mm() -> f64 {
    PRINT_DPI as f64 / MM_PER_INCH
}

/// Physical paper format a sheet is printed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperSize {
    pub width_mm: f64,
    pub height_mm: f64,
    pub width_inches: f64,
    pub height_inches: f64,
}

impl PaperSize {
    pub const A4: PaperSize = PaperSize {
        width_mm: 210.0,
        height_mm: 297.0,
        width_inches: 8.27,
        height_inches: 11.69,
    };
}

/// Settings controlling one split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageSettings {
    /// Width of the reassembled print, in inches.
    pub target_width_inches: f64,
    /// Clockwise rotation applied before splitting, in degrees.
    #[serde(rename = "rotation")]
    pub rotation_degrees: f64,
    /// Reserved. Carried as metadata, never affects geometry.
    pub overlap_mm: u32,
    /// Informational only: source width divided by target width.
    pub dpi: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            target_width_inches: 6.5,
            rotation_degrees: 0.0,
            overlap_mm: 0,
            dpi: 0,
        }
    }
}

impl ImageSettings {
    pub fn new(target_width_inches: f64) -> Self {
        Self {
            target_width_inches,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation_degrees: f64) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    pub fn with_overlap(mut self, overlap_mm: u32) -> Self {
        self.overlap_mm = overlap_mm;
        self
    }

    /// Fill in the informational DPI for a source of the given pixel width.
    pub fn with_source_width(mut self, original_width_px: u32) -> Self {
        self.dpi = informational_dpi(original_width_px, self.target_width_inches);
        self
    }

    /// Check the settings against the product policy.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn check_policy(&self) -> Result<(), SettingsError> {
        let (min_w, max_w) = TARGET_WIDTH_RANGE;
        if !(min_w..=max_w).contains(&self.target_width_inches) {
            return Err(SettingsError::TargetWidthOutOfRange {
                value: self.target_width_inches,
                min: min_w,
                max: max_w,
            });
        }

        let (min_r, max_r) = ROTATION_RANGE;
        if !(min_r..=max_r).contains(&self.rotation_degrees) {
            return Err(SettingsError::RotationOutOfRange {
                value: self.rotation_degrees,
            });
        }

        if self.overlap_mm != 0 && !OVERLAP_OPTIONS.contains(&self.overlap_mm) {
            return Err(SettingsError::UnsupportedOverlap {
                value: self.overlap_mm,
            });
        }

        Ok(())
    }
}

/// Policy violations in [`ImageSettings`].
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Target width {value} in is outside the allowed range {min}-{max} in")]
    TargetWidthOutOfRange { value: f64, min: f64, max: f64 },

    #[error("Rotation {value} degrees is outside the allowed range -180 to 180")]
    RotationOutOfRange { value: f64 },

    #[error("Overlap {value} mm is not one of 0, 5, 10, 15")]
    UnsupportedOverlap { value: u32 },
}

/// Quality rating shown next to the informational DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DpiRating {
    Excellent,
    Good,
    Warning,
}

impl DpiRating {
    pub fn from_dpi(dpi: u32) -> Self {
        if dpi >= OPTIMAL_DPI {
            DpiRating::Excellent
        } else if dpi >= MIN_DPI {
            DpiRating::Good
        } else {
            DpiRating::Warning
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            DpiRating::Excellent => "Excellent print quality",
            DpiRating::Good => "Good print quality",
            DpiRating::Warning => "Below recommended DPI",
        }
    }
}

/// `round(original_width_px / target_width_inches)`, or 0 when either is unusable.
///
/// Display only. The resampling math always targets [`PRINT_DPI`].
pub fn informational_dpi(original_width_px: u32, target_width_inches: f64) -> u32 {
    if original_width_px == 0 || !target_width_inches.is_finite() || target_width_inches <= 0.0 {
        return 0;
    }
    (original_width_px as f64 / target_width_inches).round() as u32
}
