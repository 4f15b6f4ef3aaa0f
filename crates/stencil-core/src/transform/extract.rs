//! Pixel-exact region extraction and edge padding.
//!
//! Coordinates here are integer pixels, not normalized fractions: the
//! planner has already decided every boundary and extraction must not round
//! again.

use crate::decode::DecodedImage;

/// Copy the rectangle `[left, left + width) x [top, top + height)` out of `image`.
///
/// The rectangle is clamped to the image bounds, so a region that runs past
/// the right or bottom edge yields only the pixels that exist. A region that
/// starts outside the image yields an empty image.
pub fn extract_region(
    image: &DecodedImage,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
) -> DecodedImage {
    if left == 0 && top == 0 && width >= image.width && height >= image.height {
        return image.clone();
    }

    let left = left.min(image.width);
    let top = top.min(image.height);
    let out_width = width.min(image.width - left);
    let out_height = height.min(image.height - top);

    let row_bytes = out_width as usize * 3;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in 0..out_height {
        let src_row_start = ((top + y) as usize * image.width as usize + left as usize) * 3;
        output.extend_from_slice(&image.pixels[src_row_start..src_row_start + row_bytes]);
    }

    DecodedImage::new(out_width, out_height, output)
}

/// Extend `image` on the right and bottom with `fill` up to `width x height`.
///
/// The original pixels keep their coordinates. If the image is already at
/// least that large, it is returned unchanged.
pub fn pad_to(image: &DecodedImage, width: u32, height: u32, fill: [u8; 3]) -> DecodedImage {
    if image.width >= width && image.height >= height {
        return image.clone();
    }

    let out_width = width.max(image.width);
    let out_height = height.max(image.height);
    let mut output = DecodedImage::filled(out_width, out_height, fill);

    let src_row_bytes = image.width as usize * 3;
    for y in 0..image.height as usize {
        let src_start = y * src_row_bytes;
        let dst_start = y * out_width as usize * 3;
        output.pixels[dst_start..dst_start + src_row_bytes]
            .copy_from_slice(&image.pixels[src_start..src_start + src_row_bytes]);
    }

    output
}
