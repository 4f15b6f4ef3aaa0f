//! Raster transforms used by the sheet splitter.
//!
//! # Transform Order
//!
//! A split applies these in order, each producing a fresh buffer:
//! 1. Rotation of the whole image
//! 2. Resampling to the planned print size (see [`crate::decode::resize`])
//! 3. Quadrant extraction
//! 4. White padding of short quadrants
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise
//! - Extraction coordinates are integer pixels
//! - Origin is top-left corner

mod extract;
mod rotation;

pub use extract::{extract_region, pad_to};
pub use rotation::{apply_rotation, compute_rotated_bounds, InterpolationFilter};
