//! Acquiring the source image: a local file or an `http(s)://` URL.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use stencil_core::{validate_upload, UploadLimits, ValidationError};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch image: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to fetch image: {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Declared type or size rejected before the body was fully read.
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

/// Bytes of the source plus what we know about them before decoding.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// Declared media type: the HTTP `Content-Type`, or a guess from the
    /// file extension.
    pub media_type: String,
    /// Where the bytes came from, recorded in the job manifest.
    pub origin: String,
}

/// Remote sources are absolute `http`/`https` URLs; everything else is a path.
pub fn remote_url(source: &str) -> Option<Url> {
    Url::parse(source)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Read or download `source`, holding at most `limits.max_bytes` in memory.
///
/// The declared type and any known length are checked before the body is
/// read. A body that turns out longer than the limit is abandoned mid-stream.
///
/// # Errors
///
/// Returns [`FetchError`] on I/O failure, transport failure, a non-success
/// HTTP status, or an upload the limits reject.
pub async fn acquire(
    source: &str,
    timeout: Duration,
    limits: &UploadLimits,
) -> Result<SourceImage, FetchError> {
    match remote_url(source) {
        Some(url) => fetch(url, timeout, limits).await,
        None => read_file(PathBuf::from(source), limits).await,
    }
}

async fn fetch(
    url: Url,
    timeout: Duration,
    limits: &UploadLimits,
) -> Result<SourceImage, FetchError> {
    info!(url = %url, "Fetching source image");
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let mut response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let header_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let media_type = header_type
        .unwrap_or_else(|| guess_media_type(url.path()));

    let declared_length = response.content_length();
    validate_upload(&media_type, declared_length.unwrap_or(0), limits)?;

    let capacity = declared_length.unwrap_or(0).min(limits.max_bytes);
    let mut bytes = Vec::with_capacity(capacity as usize);
    while let Some(chunk) = response.chunk().await? {
        bytes.extend_from_slice(&chunk);
        if bytes.len() as u64 > limits.max_bytes {
            return Err(ValidationError::TooLarge {
                size: bytes.len() as u64,
                max: limits.max_bytes,
            }
            .into());
        }
    }
    debug!(bytes = bytes.len(), media_type = %media_type, "Fetched source image");

    Ok(SourceImage {
        bytes,
        media_type,
        origin: url.to_string(),
    })
}

async fn read_file(path: PathBuf, limits: &UploadLimits) -> Result<SourceImage, FetchError> {
    let media_type = guess_media_type(&path.to_string_lossy());
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
    validate_upload(&media_type, metadata.len(), limits)?;

    let bytes = tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), media_type = %media_type, "Read source image");

    Ok(SourceImage {
        bytes,
        media_type,
        origin: path.display().to_string(),
    })
}

fn guess_media_type(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_url_detection() {
        assert!(remote_url("https://cdn.example.com/a.png").is_some());
        assert!(remote_url("http://localhost:8080/a.jpg").is_some());
        assert!(remote_url("ftp://example.com/a.png").is_none());
        assert!(remote_url("./photos/a.png").is_none());
        assert!(remote_url("/tmp/a.png").is_none());
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type("photo.JPG"), "image/jpeg");
        assert_eq!(guess_media_type("/images/art.webp"), "image/webp");
        assert_eq!(guess_media_type("anim.gif"), "image/gif");
        assert_eq!(guess_media_type("no-extension"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = acquire(
            "/definitely/not/here.png",
            Duration::from_secs(1),
            &UploadLimits::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_from_metadata() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let limits = UploadLimits { max_bytes: 63 };
        let err = acquire(path.to_str().unwrap(), Duration::from_secs(1), &limits)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Rejected(ValidationError::TooLarge { size: 64, max: 63 })
        ));

        let limits = UploadLimits { max_bytes: 64 };
        let image = acquire(path.to_str().unwrap(), Duration::from_secs(1), &limits)
            .await
            .unwrap();
        assert_eq!(image.bytes.len(), 64);
    }

    #[tokio::test]
    async fn test_local_type_checked_before_size() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("anim.gif");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let limits = UploadLimits { max_bytes: 1 };
        let err = acquire(path.to_str().unwrap(), Duration::from_secs(1), &limits)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Rejected(ValidationError::UnsupportedType(_))
        ));
    }
}
