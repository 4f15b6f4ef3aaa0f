//! Optional print aids drawn on top of a finished sheet.
//!
//! Two marks help the user line the printed sheets up again:
//!
//! - a light grid every centimetre, starting at the sheet's own top-left
//!   corner;
//! - a registration cross with a ring, centred on the one corner of the sheet
//!   that meets the other three sheets in the middle of the reassembled print.
//!
//! The overlay is never drawn unless explicitly requested through
//! [`crate::split::SplitOptions::overlay`].

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::settings::{pixels_per_mm, ALIGNMENT_MARK_SIZE_MM, GRID_SPACING_CM};
use crate::split::GridPosition;

/// Grid line colour (#CCCCCC).
const GRID_COLOR: u8 = 0xCC;

/// Registration marks are solid black.
const MARK_COLOR: [u8; 3] = [0, 0, 0];

/// Stroke width of the registration cross and ring, in pixels.
const MARK_STROKE: i64 = 2;

/// Overlay geometry in sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayOptions {
    /// Distance between grid lines. Zero disables the grid.
    pub grid_spacing_px: u32,
    /// Overall length of each arm pair of the registration cross. Zero
    /// disables the cross.
    pub mark_size_px: u32,
}

impl OverlayOptions {
    /// 1 cm grid and 5 mm cross at print resolution.
    pub fn at_print_resolution() -> Self {
        let px_per_mm = pixels_per_mm();
        Self {
            grid_spacing_px: (GRID_SPACING_CM * 10.0 * px_per_mm).round() as u32,
            mark_size_px: (ALIGNMENT_MARK_SIZE_MM * px_per_mm).round() as u32,
        }
    }
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self::at_print_resolution()
    }
}

/// Draw the grid and the interior-corner registration mark onto a copy of `sheet`.
///
/// # Arguments
///
/// * `sheet` - A finished, padded sheet
/// * `position` - Where the sheet sits in the 2x2 layout
/// * `options` - Grid spacing and mark size in pixels
pub fn draw_overlay(
    sheet: &DecodedImage,
    position: GridPosition,
    options: &OverlayOptions,
) -> DecodedImage {
    let mut output = sheet.clone();
    if output.is_empty() {
        return output;
    }

    if options.grid_spacing_px > 0 {
        draw_grid(&mut output, options.grid_spacing_px);
    }

    if options.mark_size_px > 0 {
        let (cx, cy) = interior_corner(output.width, output.height, position);
        draw_registration_mark(&mut output, cx, cy, options.mark_size_px);
    }

    output
}

/// The sheet corner that touches the centre of the reassembled print.
pub fn interior_corner(width: u32, height: u32, position: GridPosition) -> (i64, i64) {
    let x = if position.col == 0 { width as i64 } else { 0 };
    let y = if position.row == 0 { height as i64 } else { 0 };
    (x, y)
}

fn draw_grid(image: &mut DecodedImage, spacing: u32) {
    let (width, height) = (image.width, image.height);

    for x in (0..width).step_by(spacing as usize) {
        for y in 0..height {
            blend_grid_pixel(image, x, y);
        }
    }
    for y in (0..height).step_by(spacing as usize) {
        for x in 0..width {
            blend_grid_pixel(image, x, y);
        }
    }
}

/// 50% blend towards the grid colour, rounding half up.
#[inline]
fn blend_grid_pixel(image: &mut DecodedImage, x: u32, y: u32) {
    let idx = (y as usize * image.width as usize + x as usize) * 3;
    for channel in &mut image.pixels[idx..idx + 3] {
        *channel = ((*channel as u16 + GRID_COLOR as u16 + 1) / 2) as u8;
    }
}

fn draw_registration_mark(image: &mut DecodedImage, cx: i64, cy: i64, size: u32) {
    let half = (size / 2) as i64;

    // Horizontal and vertical strokes straddle the centre line
    for x in (cx - half)..(cx + half) {
        for y in (cy - MARK_STROKE / 2)..(cy + MARK_STROKE / 2) {
            set_pixel(image, x, y, MARK_COLOR);
        }
    }
    for y in (cy - half)..(cy + half) {
        for x in (cx - MARK_STROKE / 2)..(cx + MARK_STROKE / 2) {
            set_pixel(image, x, y, MARK_COLOR);
        }
    }

    let radius = size as f64 / 4.0;
    let half_stroke = MARK_STROKE as f64 / 2.0;
    let reach = (radius + half_stroke).ceil() as i64;
    for y in (cy - reach)..(cy + reach) {
        for x in (cx - reach)..(cx + reach) {
            let dx = x as f64 + 0.5 - cx as f64;
            let dy = y as f64 + 0.5 - cy as f64;
            let dist = (dx * dx + dy * dy).sqrt();
            if (dist - radius).abs() <= half_stroke {
                set_pixel(image, x, y, MARK_COLOR);
            }
        }
    }
}

/// Write one pixel, ignoring coordinates outside the image.
#[inline]
fn set_pixel(image: &mut DecodedImage, x: i64, y: i64, rgb: [u8; 3]) {
    if x < 0 || y < 0 || x >= image.width as i64 || y >= image.height as i64 {
        return;
    }
    let idx = (y as usize * image.width as usize + x as usize) * 3;
    image.pixels[idx..idx + 3].copy_from_slice(&rgb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::WHITE;

    const BLACK: [u8; 3] = [0, 0, 0];
    const GRID_ONCE: [u8; 3] = [230, 230, 230];
    const GRID_TWICE: [u8; 3] = [217, 217, 217];

    fn white_sheet(width: u32, height: u32) -> DecodedImage {
        DecodedImage::filled(width, height, WHITE)
    }

    #[test]
    fn test_print_resolution_geometry() {
        let options = OverlayOptions::at_print_resolution();
        assert_eq!(options.grid_spacing_px, 118);
        assert_eq!(options.mark_size_px, 59);
        assert_eq!(OverlayOptions::default(), options);
    }

    #[test]
    fn test_interior_corners() {
        assert_eq!(interior_corner(10, 8, GridPosition::new(0, 0)), (10, 8));
        assert_eq!(interior_corner(10, 8, GridPosition::new(0, 1)), (0, 8));
        assert_eq!(interior_corner(10, 8, GridPosition::new(1, 0)), (10, 0));
        assert_eq!(interior_corner(10, 8, GridPosition::new(1, 1)), (0, 0));
    }

    #[test]
    fn test_grid_lines_blend_at_half_opacity() {
        let sheet = white_sheet(300, 300);
        let out = draw_overlay(&sheet, GridPosition::new(0, 0), &OverlayOptions::at_print_resolution());

        assert_eq!(out.pixel(0, 5), GRID_ONCE);
        assert_eq!(out.pixel(118, 5), GRID_ONCE);
        assert_eq!(out.pixel(236, 5), GRID_ONCE);
        assert_eq!(out.pixel(5, 118), GRID_ONCE);
        assert_eq!(out.pixel(1, 5), WHITE);
        assert_eq!(out.pixel(117, 5), WHITE);
        // Crossing lines are blended twice
        assert_eq!(out.pixel(0, 0), GRID_TWICE);
        assert_eq!(out.pixel(118, 118), GRID_TWICE);
    }

    #[test]
    fn test_mark_at_bottom_right_for_top_left_sheet() {
        let sheet = white_sheet(300, 300);
        let out = draw_overlay(&sheet, GridPosition::new(0, 0), &OverlayOptions::at_print_resolution());

        assert_eq!(out.pixel(299, 299), BLACK);
        assert_eq!(out.pixel(280, 299), BLACK);
        assert_eq!(out.pixel(299, 280), BLACK);
        // Opposite corners carry no mark
        assert_eq!(out.pixel(299, 1), WHITE);
        assert_eq!(out.pixel(1, 299), WHITE);
    }

    #[test]
    fn test_mark_at_top_left_for_bottom_right_sheet() {
        let sheet = white_sheet(300, 300);
        let options = OverlayOptions {
            grid_spacing_px: 0,
            mark_size_px: 59,
        };
        let out = draw_overlay(&sheet, GridPosition::new(1, 1), &options);

        assert_eq!(out.pixel(0, 0), BLACK);
        assert_eq!(out.pixel(28, 0), BLACK);
        assert_eq!(out.pixel(0, 28), BLACK);
        assert_eq!(out.pixel(29, 0), WHITE);
        assert_eq!(out.pixel(40, 0), WHITE);
        // Ring of radius 14.75 passes through (10, 10), not (5, 5)
        assert_eq!(out.pixel(10, 10), BLACK);
        assert_eq!(out.pixel(5, 5), WHITE);
        assert_eq!(out.pixel(299, 299), WHITE);
    }

    #[test]
    fn test_mark_on_other_corners() {
        let sheet = white_sheet(200, 100);
        let options = OverlayOptions {
            grid_spacing_px: 0,
            mark_size_px: 59,
        };

        let top_right = draw_overlay(&sheet, GridPosition::new(0, 1), &options);
        assert_eq!(top_right.pixel(0, 99), BLACK);
        assert_eq!(top_right.pixel(199, 99), WHITE);

        let bottom_left = draw_overlay(&sheet, GridPosition::new(1, 0), &options);
        assert_eq!(bottom_left.pixel(199, 0), BLACK);
        assert_eq!(bottom_left.pixel(0, 0), WHITE);
    }

    #[test]
    fn test_disabled_parts_leave_sheet_untouched() {
        let sheet = white_sheet(50, 50);
        let options = OverlayOptions {
            grid_spacing_px: 0,
            mark_size_px: 0,
        };
        assert_eq!(draw_overlay(&sheet, GridPosition::new(0, 0), &options), sheet);
    }

    #[test]
    fn test_marks_clip_on_tiny_sheets() {
        let options = OverlayOptions::at_print_resolution();
        for position in GridPosition::ALL {
            let out = draw_overlay(&white_sheet(3, 2), position, &options);
            assert_eq!((out.width, out.height), (3, 2));
        }
    }

    #[test]
    fn test_source_sheet_is_not_modified() {
        let sheet = white_sheet(120, 120);
        let _ = draw_overlay(&sheet, GridPosition::new(0, 0), &OverlayOptions::default());
        assert!(sheet.pixels.iter().all(|&p| p == 255));
    }
}
