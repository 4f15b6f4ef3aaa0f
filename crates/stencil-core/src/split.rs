//! The sheet splitter: rotate, resample, cut into a 2x2 grid, pad.
//!
//! # Pipeline
//!
//! 1. Rotate the whole image (skipped for a zero angle)
//! 2. Measure the rotated bounding box and [`plan`] the print geometry
//! 3. Resample to exactly the planned size
//! 4. Extract each quadrant and pad short ones with white on the right/bottom
//! 5. Optionally draw the alignment overlay on each sheet
//!
//! Every stage produces a fresh buffer. Sheets come back in row-major order,
//! `(0,0), (0,1), (1,0), (1,1)`, which is also page order 1 to 4.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::decode::{decode_image, resize, DecodeError, DecodedImage, FilterType, WHITE};
use crate::encode::{encode_png, EncodeError};
use crate::overlay::{draw_overlay, OverlayOptions};
use crate::plan::{plan, PlanError, SheetPlan};
use crate::settings::ImageSettings;
use crate::transform::{apply_rotation, extract_region, pad_to, InterpolationFilter};

/// Errors from a split. Either all four sheets are produced or one of these.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// NaN or infinite rotation angle.
    #[error("Invalid rotation: {0} degrees")]
    InvalidRotation(f64),
}

/// A cell of the 2x2 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: u8,
    pub col: u8,
}

impl GridPosition {
    /// All four cells in page order.
    pub const ALL: [GridPosition; 4] = [
        GridPosition { row: 0, col: 0 },
        GridPosition { row: 0, col: 1 },
        GridPosition { row: 1, col: 0 },
        GridPosition { row: 1, col: 1 },
    ];

    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 1-based page number: `row * 2 + col + 1`.
    pub fn page_number(self) -> u8 {
        self.row * 2 + self.col + 1
    }
}

/// One finished sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSheet {
    pub image: DecodedImage,
    pub position: GridPosition,
    pub page_number: u8,
}

/// A sheet encoded for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSheet {
    pub png: Vec<u8>,
    pub position: GridPosition,
    pub page_number: u8,
    pub width: u32,
    pub height: u32,
}

/// Knobs that do not belong to the user-facing settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitOptions {
    /// Sampling used for non-quarter-turn rotations.
    pub rotation_filter: InterpolationFilter,
    /// Resampling filter for the resize to print size.
    pub resize_filter: FilterType,
    /// Alignment grid and registration marks. `None` leaves sheets clean.
    pub overlay: Option<OverlayOptions>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            rotation_filter: InterpolationFilter::Bilinear,
            resize_filter: FilterType::Lanczos3,
            overlay: None,
        }
    }
}

impl SplitOptions {
    pub fn with_overlay(mut self, overlay: OverlayOptions) -> Self {
        self.overlay = Some(overlay);
        self
    }
}

/// Output of [`split_image`].
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub sheets: [SplitSheet; 4],
    pub plan: SheetPlan,
    /// Size of the image after rotation, before resampling.
    pub rotated_width: u32,
    pub rotated_height: u32,
}

/// Output of [`split_to_png`].
#[derive(Debug, Clone)]
pub struct EncodedSplit {
    pub sheets: [EncodedSheet; 4],
    pub plan: SheetPlan,
}

/// Split a decoded image into four print sheets.
///
/// # Arguments
///
/// * `image` - Source raster, already orientation-corrected
/// * `settings` - Target print width and rotation. `overlap_mm` and `dpi` are
///   carried by the caller and have no effect here.
/// * `options` - Filters and the optional overlay
///
/// # Errors
///
/// Returns [`SplitError::Plan`] for degenerate geometry and
/// [`SplitError::InvalidRotation`] for a non-finite angle.
pub fn split_image(
    image: &DecodedImage,
    settings: &ImageSettings,
    options: &SplitOptions,
) -> Result<SplitResult, SplitError> {
    let angle = settings.rotation_degrees;
    if !angle.is_finite() {
        return Err(SplitError::InvalidRotation(angle));
    }

    let rotated: Cow<'_, DecodedImage> = if angle == 0.0 {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(apply_rotation(image, angle, options.rotation_filter))
    };

    let plan = plan(rotated.width, rotated.height, settings.target_width_inches)?;
    let resized = resize(
        &rotated,
        plan.final_width,
        plan.final_height,
        options.resize_filter,
    )?;

    let sheets = GridPosition::ALL.map(|position| {
        let left = position.col as u32 * plan.quadrant_width;
        let top = position.row as u32 * plan.quadrant_height;
        let region = extract_region(
            &resized,
            left,
            top,
            plan.extract_width(position.col),
            plan.extract_height(position.row),
        );
        let mut sheet = pad_to(&region, plan.quadrant_width, plan.quadrant_height, WHITE);

        if let Some(overlay) = &options.overlay {
            sheet = draw_overlay(&sheet, position, overlay);
        }

        SplitSheet {
            image: sheet,
            position,
            page_number: position.page_number(),
        }
    });

    debug!(
        src_width = image.width,
        src_height = image.height,
        rotated_width = rotated.width,
        rotated_height = rotated.height,
        quadrant_width = plan.quadrant_width,
        quadrant_height = plan.quadrant_height,
        overlay = options.overlay.is_some(),
        "Split image into sheets"
    );

    Ok(SplitResult {
        sheets,
        plan,
        rotated_width: rotated.width,
        rotated_height: rotated.height,
    })
}

/// Decode `bytes` and split the result.
///
/// # Errors
///
/// As [`split_image`], plus [`SplitError::Decode`] when the bytes are not a
/// supported raster.
pub fn split_bytes(
    bytes: &[u8],
    settings: &ImageSettings,
    options: &SplitOptions,
) -> Result<SplitResult, SplitError> {
    let image = decode_image(bytes)?;
    split_image(&image, settings, options)
}

/// Decode, split and encode every sheet as PNG.
///
/// Identical input bytes and settings always produce identical PNG bytes.
///
/// # Errors
///
/// As [`split_bytes`], plus [`SplitError::Encode`].
pub fn split_to_png(
    bytes: &[u8],
    settings: &ImageSettings,
    options: &SplitOptions,
) -> Result<EncodedSplit, SplitError> {
    let result = split_bytes(bytes, settings, options)?;
    let [a, b, c, d] = result.sheets.each_ref().map(encode_sheet);

    Ok(EncodedSplit {
        sheets: [a?, b?, c?, d?],
        plan: result.plan,
    })
}

fn encode_sheet(sheet: &SplitSheet) -> Result<EncodedSheet, EncodeError> {
    let png = encode_png(&sheet.image.pixels, sheet.image.width, sheet.image.height)?;
    Ok(EncodedSheet {
        png,
        position: sheet.position,
        page_number: sheet.page_number,
        width: sheet.image.width,
        height: sheet.image.height,
    })
}
