//! Stencil Core - print partition library
//!
//! This crate turns one uploaded image into four printable sheets that tile a
//! larger print when laid out in a 2x2 grid. It covers upload validation,
//! dimension probing, print geometry planning, rotation, resampling, quadrant
//! extraction with white padding, an optional alignment overlay, and PNG
//! encoding.
//!
//! Everything here is synchronous and free of I/O: bytes in, bytes out.

pub mod decode;
pub mod encode;
pub mod overlay;
pub mod plan;
pub mod settings;
pub mod split;
pub mod transform;
pub mod validate;

pub use decode::{decode_image, probe_dimensions, DecodeError, DecodedImage, ImageDimensions};
pub use encode::{encode_png, EncodeError};
pub use overlay::{draw_overlay, OverlayOptions};
pub use plan::{plan, PlanError, SheetPlan};
pub use settings::{DpiRating, ImageSettings, PaperSize, SettingsError, PRINT_DPI};
pub use split::{
    split_bytes, split_image, split_to_png, EncodedSheet, EncodedSplit, GridPosition, SplitError,
    SplitOptions, SplitResult, SplitSheet,
};
pub use transform::{apply_rotation, compute_rotated_bounds, InterpolationFilter};
pub use validate::{validate_upload, MediaType, UploadLimits, ValidationError};
