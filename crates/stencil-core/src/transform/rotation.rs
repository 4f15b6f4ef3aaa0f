//! Whole-image rotation onto an expanded white canvas.
//!
//! Rotation happens once, on the full image, before resampling. Positive
//! angles rotate clockwise as seen on screen (y axis pointing down).
//!
//! Exact quarter turns are lossless pixel permutations. Any other angle uses
//! inverse mapping: for each pixel in the output image we find the source
//! position that lands there and interpolate around it.
//!
//! ```text
//! src_x = dx * cos(-θ) - dy * sin(-θ) + src_cx
//! src_y = dx * sin(-θ) + dy * cos(-θ) + src_cy
//! ```
//!
//! Samples that fall outside the source read as opaque white, so the corners
//! exposed by the rotation come out white and the image edge is antialiased
//! against white rather than against black.

use tracing::debug;

use crate::decode::{DecodedImage, WHITE};

/// Angles closer than this to a multiple of 90 degrees are treated as exact.
const ANGLE_EPSILON: f64 = 0.001;

/// Interpolation filter for rotation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum InterpolationFilter {
    /// Bilinear interpolation, the default for print output.
    #[default]
    Bilinear,
    /// Lanczos3 interpolation, sharper edges at a higher cost.
    Lanczos3,
}

/// Number of clockwise quarter turns if `angle_degrees` is a multiple of 90.
fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let normalized = angle_degrees.rem_euclid(360.0);
    for turns in 0..=4u8 {
        if (normalized - turns as f64 * 90.0).abs() < ANGLE_EPSILON {
            return Some(turns % 4);
        }
    }
    None
}

/// Compute the dimensions of the bounding box for a rotated image.
///
/// # Example
///
/// ```
/// use stencil_core::transform::compute_rotated_bounds;
///
/// // 90-degree rotation swaps dimensions
/// assert_eq!(compute_rotated_bounds(3000, 2000, 90.0), (2000, 3000));
/// // No rotation preserves dimensions
/// assert_eq!(compute_rotated_bounds(3000, 2000, 0.0), (3000, 2000));
/// ```
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turns(angle_degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    // new_w = |w*cos| + |h*sin|, new_h = |w*sin| + |h*cos|
    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate an image around its center, expanding the canvas to fit.
///
/// Returns a fresh image; the source is never modified. A zero angle (or
/// any multiple of 360) returns an identical copy.
pub fn apply_rotation(
    image: &DecodedImage,
    angle_degrees: f64,
    filter: InterpolationFilter,
) -> DecodedImage {
    if let Some(turns) = quarter_turns(angle_degrees) {
        return rotate_quarter_turns(image, turns);
    }

    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, angle_degrees);
    debug!(
        src_width = image.width,
        src_height = image.height,
        dst_w,
        dst_h,
        angle_degrees,
        ?filter,
        "Rotating image"
    );

    let angle_rad = -angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = Vec::with_capacity(dst_w as usize * dst_h as usize * 3);

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Work on pixel centers so that the mapping is symmetric
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            let src_x = dx * cos - dy * sin + src_cx - 0.5;
            let src_y = dx * sin + dy * cos + src_cy - 0.5;

            let pixel = match filter {
                InterpolationFilter::Bilinear => sample_bilinear(image, src_x, src_y),
                InterpolationFilter::Lanczos3 => sample_lanczos3(image, src_x, src_y),
            };
            output.extend_from_slice(&pixel);
        }
    }

    DecodedImage::new(dst_w, dst_h, output)
}

fn rotate_quarter_turns(image: &DecodedImage, turns: u8) -> DecodedImage {
    if turns == 0 {
        return image.clone();
    }

    let Some(rgb) = image.to_rgb_image() else {
        return image.clone();
    };

    debug!(
        width = image.width,
        height = image.height,
        turns,
        "Rotating image by quarter turns"
    );

    let rotated = match turns {
        1 => image::imageops::rotate90(&rgb),
        2 => image::imageops::rotate180(&rgb),
        _ => image::imageops::rotate270(&rgb),
    };
    DecodedImage::from_rgb_image(rotated)
}

/// Pixel at integer coordinates, white outside the source.
#[inline]
fn fetch(image: &DecodedImage, px: i64, py: i64) -> [f64; 3] {
    if px < 0 || py < 0 || px >= image.width as i64 || py >= image.height as i64 {
        return [WHITE[0] as f64, WHITE[1] as f64, WHITE[2] as f64];
    }
    let [r, g, b] = image.pixel(px as u32, py as u32);
    [r as f64, g as f64, b as f64]
}

/// Bilinear interpolation over the 4 nearest pixels.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    if x < -1.0 || y < -1.0 || x > image.width as f64 || y > image.height as f64 {
        return WHITE;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = fetch(image, x0, y0);
    let p10 = fetch(image, x0 + 1, y0);
    let p01 = fetch(image, x0, y0 + 1);
    let p11 = fetch(image, x0 + 1, y0 + 1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

/// Lanczos3 interpolation over a 6x6 neighborhood.
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    if x < -3.0 || y < -3.0 || x > image.width as f64 + 2.0 || y > image.height as f64 + 2.0 {
        return WHITE;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

            let pixel = fetch(image, px, py);
            sum[0] += pixel[0] * weight;
            sum[1] += pixel[1] * weight;
            sum[2] += pixel[2] * weight;
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return sample_bilinear(image, x, y);
    }

    let mut result = [0u8; 3];
    for i in 0..3 {
        result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
    }
    result
}

/// Lanczos kernel: `sinc(x) * sinc(x/a)` for `|x| < a`, zero elsewhere.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
