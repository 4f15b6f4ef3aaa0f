//! Upload gatekeeping: declared media type and byte size.
//!
//! Validation runs before any bytes are decoded, so it only looks at what the
//! client declared. A file that claims to be PNG but isn't is caught later by
//! the decoder as [`crate::decode::DecodeError::UnsupportedFormat`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upper bound on upload size: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Media types accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    WebP,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Jpeg, MediaType::Png, MediaType::WebP];

    /// Parse a declared media type.
    ///
    /// Matching ignores case and any `; parameter` suffix, so
    /// `"IMAGE/PNG; charset=binary"` is accepted. `image/jpg` is accepted as
    /// an alias some clients send for JPEG.
    pub fn from_mime(declared: &str) -> Option<Self> {
        let essence = declared.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("image/jpeg") || essence.eq_ignore_ascii_case("image/jpg") {
            Some(MediaType::Jpeg)
        } else if essence.eq_ignore_ascii_case("image/png") {
            Some(MediaType::Png)
        } else if essence.eq_ignore_ascii_case("image/webp") {
            Some(MediaType::WebP)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::WebP => "image/webp",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload limits, configurable by the calling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadLimits {
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// Rejections produced by [`validate_upload`].
///
/// The messages are user-facing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Declared type is not JPEG, PNG or WebP.
    #[error("Invalid file type. Please upload a JPG, PNG, or WebP image.")]
    UnsupportedType(String),

    /// Upload exceeds the configured size limit.
    #[error("File too large. Maximum size is {}.", format_limit(.max))]
    TooLarge { size: u64, max: u64 },
}

fn format_limit(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    let bytes = *bytes;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Accept or reject an upload based on its declared type and size.
///
/// The type check runs first, so an oversized GIF reports the type problem.
/// A file of exactly `limits.max_bytes` is accepted.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedType`] or [`ValidationError::TooLarge`].
pub fn validate_upload(
    declared_type: &str,
    size_bytes: u64,
    limits: &UploadLimits,
) -> Result<MediaType, ValidationError> {
    let media_type = MediaType::from_mime(declared_type)
        .ok_or_else(|| ValidationError::UnsupportedType(declared_type.to_string()))?;

    if size_bytes > limits.max_bytes {
        return Err(ValidationError::TooLarge {
            size: size_bytes,
            max: limits.max_bytes,
        });
    }

    Ok(media_type)
}
