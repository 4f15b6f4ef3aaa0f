//! Dimension planning for a 2x2 sheet split.
//!
//! Given the (post-rotation) pixel size of the source and the physical width
//! the reassembled print should have, the planner decides:
//!
//! - the exact pixel size to resample to, at [`PRINT_DPI`] regardless of the
//!   source's own resolution;
//! - the size every quadrant is extracted and padded to.
//!
//! Quadrant sizes use ceiling division, so the two quadrants on each axis
//! always cover the whole image. When a final dimension is odd, the last
//! column or row is one pixel short and gets padded.
//!
//! Plans whose RGB raster would exceed [`MAX_OUTPUT_BYTES`] are refused
//! before anything is allocated.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::settings::{PaperSize, PRINT_DPI};

/// Largest resampled RGB raster the planner accepts, in bytes. Same as the
/// default allocation limit of `image::Limits`.
pub const MAX_OUTPUT_BYTES: u64 = 512 * 1024 * 1024;

/// Degenerate inputs the planner refuses to work with.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    /// Zero-area source: the aspect ratio is undefined.
    #[error("Source image has no pixels ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    /// A single-pixel axis cannot be split into a grid.
    #[error("Source image is too small to split ({width}x{height}); both sides need at least 2 pixels")]
    SourceTooSmall { width: u32, height: u32 },

    /// Target width must be a positive, finite number of inches.
    #[error("Invalid target width: {0} inches")]
    InvalidTargetWidth(f64),

    /// The planned print would leave a quadrant without source pixels.
    #[error("Planned output {width}x{height} px is too small to split into 4 sheets")]
    OutputTooSmall { width: u32, height: u32 },

    /// The planned print does not fit in memory.
    #[error("Planned output {width}x{height} px is too large to process (limit {max_bytes} bytes)")]
    OutputTooLarge {
        width: u64,
        height: u64,
        max_bytes: u64,
    },
}

/// Pixel geometry of one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPlan {
    /// Width of the resampled image in pixels.
    pub final_width: u32,
    /// Height of the resampled image in pixels.
    pub final_height: u32,
    /// Width of every sheet after padding.
    pub quadrant_width: u32,
    /// Height of every sheet after padding.
    pub quadrant_height: u32,
}

impl SheetPlan {
    /// Pixels of source content in the given column, before padding.
    pub fn extract_width(&self, col: u8) -> u32 {
        let left = col as u32 * self.quadrant_width;
        self.quadrant_width.min(self.final_width.saturating_sub(left))
    }

    /// Pixels of source content in the given row, before padding.
    pub fn extract_height(&self, row: u8) -> u32 {
        let top = row as u32 * self.quadrant_height;
        self.quadrant_height.min(self.final_height.saturating_sub(top))
    }

    /// Physical size of one sheet's image area at print resolution.
    pub fn sheet_size_inches(&self) -> (f64, f64) {
        (
            self.quadrant_width as f64 / PRINT_DPI as f64,
            self.quadrant_height as f64 / PRINT_DPI as f64,
        )
    }

    /// Physical size of the reassembled print.
    pub fn print_size_inches(&self) -> (f64, f64) {
        (
            self.final_width as f64 / PRINT_DPI as f64,
            self.final_height as f64 / PRINT_DPI as f64,
        )
    }

    /// Whether one sheet's image area fits on `paper` at 100% scale.
    pub fn fits_paper(&self, paper: &PaperSize) -> bool {
        let (w, h) = self.sheet_size_inches();
        w <= paper.width_inches && h <= paper.height_inches
    }
}

/// Plan the resample and quadrant sizes.
///
/// `original_width`/`original_height` must describe the image as it will be
/// resampled, i.e. after any rotation.
///
/// # Errors
///
/// See [`PlanError`]. Never produces NaN or infinite intermediate values.
pub fn plan(
    original_width: u32,
    original_height: u32,
    target_width_inches: f64,
) -> Result<SheetPlan, PlanError> {
    if original_width == 0 || original_height == 0 {
        return Err(PlanError::EmptySource {
            width: original_width,
            height: original_height,
        });
    }
    if original_width < 2 || original_height < 2 {
        return Err(PlanError::SourceTooSmall {
            width: original_width,
            height: original_height,
        });
    }
    if !target_width_inches.is_finite() || target_width_inches <= 0.0 {
        return Err(PlanError::InvalidTargetWidth(target_width_inches));
    }

    let final_width_f = (target_width_inches * PRINT_DPI as f64).round();
    let aspect_ratio = original_height as f64 / original_width as f64;
    let final_height_f = (final_width_f * aspect_ratio).round();

    if final_width_f < 2.0 || final_height_f < 2.0 {
        return Err(PlanError::OutputTooSmall {
            width: final_width_f as u32,
            height: final_height_f as u32,
        });
    }

    let too_wide = final_width_f > u32::MAX as f64 || final_height_f > u32::MAX as f64;
    if too_wide || final_width_f * final_height_f * 3.0 > MAX_OUTPUT_BYTES as f64 {
        return Err(PlanError::OutputTooLarge {
            width: final_width_f as u64,
            height: final_height_f as u64,
            max_bytes: MAX_OUTPUT_BYTES,
        });
    }

    let final_width = final_width_f as u32;
    let final_height = final_height_f as u32;

    let plan = SheetPlan {
        final_width,
        final_height,
        quadrant_width: final_width.div_ceil(2),
        quadrant_height: final_height.div_ceil(2),
    };

    debug!(
        original_width,
        original_height,
        target_width_inches,
        ?plan,
        "Planned sheet dimensions"
    );
    Ok(plan)
}
