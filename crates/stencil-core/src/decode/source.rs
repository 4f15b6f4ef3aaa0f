//! Decoding and probing of uploaded JPEG, PNG and WebP sources.
//!
//! EXIF orientation is honoured by both [`probe_dimensions`] and
//! [`decode_image`], so the dimensions reported before processing always
//! describe the same raster the splitter will see.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use tracing::debug;

use super::{DecodeError, DecodedImage, ImageDimensions, Orientation, SourceFormat};

/// Read the pixel dimensions from the container header without decoding pixels.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` for containers outside the accepted
/// set and `DecodeError::CorruptedFile` when the header cannot be parsed.
pub fn probe_dimensions(bytes: &[u8]) -> Result<ImageDimensions, DecodeError> {
    let (reader, format) = open(bytes)?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let (width, height) = if extract_orientation(bytes).swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    };

    debug!(width, height, ?format, "Probed image dimensions");
    Ok(ImageDimensions {
        width,
        height,
        format,
    })
}

/// Decode a JPEG, PNG or WebP image into an RGB raster.
///
/// EXIF orientation is applied, and any alpha channel is flattened onto
/// opaque white.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` if the bytes are not one of the
/// accepted containers, `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = extract_orientation(bytes);
    let (reader, format) = open(bytes)?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = apply_orientation(img, orientation);
    let rgb = flatten_onto_white(oriented);

    debug!(
        width = rgb.width(),
        height = rgb.height(),
        ?format,
        ?orientation,
        "Decoded source image"
    );
    Ok(DecodedImage::from_rgb_image(rgb))
}

fn open(bytes: &[u8]) -> Result<(ImageReader<Cursor<&[u8]>>, SourceFormat), DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader
        .format()
        .and_then(SourceFormat::from_image_format)
        .ok_or(DecodeError::UnsupportedFormat)?;

    Ok((reader, format))
}

/// Returns `Orientation::Normal` if no EXIF data is found.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

/// Composite any alpha channel over white paper.
fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);

    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(r), blend(g), blend(b)]);
    }

    out
}
