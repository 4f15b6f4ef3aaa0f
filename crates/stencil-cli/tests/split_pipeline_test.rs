use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use httpmock::prelude::*;
use image::{ImageFormat, Rgb, RgbImage};
use stencil_cli::{
    run_probe, run_split, AppConfig, DataUrlStore, FetchError, FsStore, JobManifest, PipelineError,
    SheetStore, StoreError,
};
use stencil_core::{DecodeError, DpiRating, ImageSettings, SettingsError, ValidationError};
use tempfile::TempDir;

fn fixture(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 2) as u8, (y * 3) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn config_for(dir: &Path) -> AppConfig {
    AppConfig {
        settings: ImageSettings::new(4.0),
        output_dir: dir.join("out"),
        ..AppConfig::default()
    }
}

fn read_manifest(path: &Path) -> JobManifest {
    let bytes = std::fs::read(path).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn files_with_extension(dir: &Path, extension: &str) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter(|entry| {
            entry.as_ref().unwrap().path().extension().and_then(|e| e.to_str()) == Some(extension)
        })
        .count()
}

/// File store that fails on the `fail_on`-th put (1-based).
struct FailingStore {
    inner: FsStore,
    fail_on: usize,
    puts: AtomicUsize,
}

impl SheetStore for FailingStore {
    async fn put(&self, key: &str, png: &[u8]) -> Result<String, StoreError> {
        if self.puts.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(StoreError::Io {
                path: self.inner.dir().join(key),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.put(key, png).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn test_split_local_png_into_files() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("photo.png");
    std::fs::write(&source, fixture(120, 80, ImageFormat::Png)).unwrap();

    let config = config_for(temp_dir.path());
    let store = FsStore::new(&config.output_dir);
    let outcome = run_split(&config, source.to_str().unwrap(), &store).await.unwrap();

    assert_eq!(outcome.plan.final_width, 1200);
    assert_eq!(outcome.plan.final_height, 800);

    let manifest = read_manifest(&outcome.manifest_path);
    assert_eq!(outcome.manifest_path.parent().unwrap(), config.output_dir);
    let manifest_name = outcome.manifest_path.file_name().unwrap().to_str().unwrap();
    assert!(manifest_name.starts_with("split-") && manifest_name.ends_with(".json"));
    assert_eq!(manifest, outcome.manifest);
    assert_eq!(manifest.original_image_url, source.display().to_string());
    assert_eq!(manifest.settings.dpi, 30);

    let pages: Vec<u8> = manifest.split_images.iter().map(|s| s.page_number).collect();
    assert_eq!(pages, vec![1, 2, 3, 4]);

    for record in &manifest.split_images {
        let name = Path::new(&record.url).file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("split-"), "unexpected key {}", name);
        assert!(name.ends_with(&format!("-page-{}.png", record.page_number)));

        let sheet = image::load_from_memory(&std::fs::read(&record.url).unwrap()).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (600, 400));
    }
}

#[tokio::test]
async fn test_split_with_data_urls() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("photo.jpg");
    std::fs::write(&source, fixture(100, 100, ImageFormat::Jpeg)).unwrap();

    let config = config_for(temp_dir.path());
    let outcome = run_split(&config, source.to_str().unwrap(), &DataUrlStore)
        .await
        .unwrap();

    assert_eq!(outcome.manifest.split_images.len(), 4);
    for record in &outcome.manifest.split_images {
        assert!(record.url.starts_with("data:image/png;base64,"));
    }
    // Only the manifest lands on disk
    let entries: Vec<_> = std::fs::read_dir(&config.output_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_rotation_swaps_sheet_shape() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("landscape.png");
    std::fs::write(&source, fixture(120, 80, ImageFormat::Png)).unwrap();

    let mut config = config_for(temp_dir.path());
    config.settings = config.settings.with_rotation(90.0);
    let outcome = run_split(&config, source.to_str().unwrap(), &DataUrlStore)
        .await
        .unwrap();

    assert_eq!(outcome.plan.final_width, 1200);
    assert_eq!(outcome.plan.final_height, 1800);
    assert_eq!(outcome.manifest.settings.rotation_degrees, 90.0);
}

#[tokio::test]
async fn test_split_fetched_over_http() {
    let server = MockServer::start_async().await;
    let body = fixture(90, 60, ImageFormat::Jpeg);
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/uploads/cat.jpg");
            then.status(200)
                .header("Content-Type", "image/jpeg")
                .body(body.clone());
        })
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = config_for(temp_dir.path());
    let url = server.url("/uploads/cat.jpg");

    let outcome = run_split(&config, &url, &DataUrlStore).await.unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.manifest.original_image_url, url);
    assert_eq!(outcome.plan.quadrant_width, 600);
    assert_eq!(outcome.plan.quadrant_height, 400);
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.png");
            then.status(404);
        })
        .await;

    let temp_dir = TempDir::new().unwrap();
    let err = run_split(&config_for(temp_dir.path()), &server.url("/missing.png"), &DataUrlStore)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_gif_rejected_before_processing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/anim");
            then.status(200)
                .header("Content-Type", "image/gif")
                .body("GIF89a");
        })
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = config_for(temp_dir.path());
    let err = run_split(&config, &server.url("/anim"), &DataUrlStore)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::UnsupportedType(_))
    ));
    assert_eq!(
        err.to_string(),
        "Invalid file type. Please upload a JPG, PNG, or WebP image."
    );
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("big.png");
    std::fs::write(&source, fixture(64, 64, ImageFormat::Png)).unwrap();

    let mut config = config_for(temp_dir.path());
    config.limits.max_bytes = 16;
    let err = run_split(&config, source.to_str().unwrap(), &DataUrlStore)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::TooLarge { max: 16, .. })
    ));
}

#[tokio::test]
async fn test_policy_violation_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("photo.png");
    std::fs::write(&source, fixture(40, 40, ImageFormat::Png)).unwrap();

    let mut config = config_for(temp_dir.path());
    config.settings.target_width_inches = 12.0;
    let err = run_split(&config, source.to_str().unwrap(), &DataUrlStore)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Settings(SettingsError::TargetWidthOutOfRange { .. })
    ));
}

#[tokio::test]
async fn test_mislabelled_bytes_fail_in_decoder() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("fake.png");
    std::fs::write(&source, b"this is plain text, not a PNG").unwrap();

    let err = run_split(&config_for(temp_dir.path()), source.to_str().unwrap(), &DataUrlStore)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Probe(DecodeError::UnsupportedFormat)
    ));
}

#[tokio::test]
async fn test_probe_reports_dpi() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("wide.png");
    std::fs::write(&source, fixture(200, 50, ImageFormat::Png)).unwrap();

    let mut config = config_for(temp_dir.path());
    config.settings.target_width_inches = 5.0;
    let report = run_probe(&config, source.to_str().unwrap()).await.unwrap();

    assert_eq!((report.width, report.height), (200, 50));
    assert_eq!(report.media_type, "image/png");
    assert_eq!(report.dpi, 40);
    assert_eq!(report.rating, DpiRating::Warning);
    assert_eq!(report.message, "Below recommended DPI");
}

#[tokio::test]
async fn test_jobs_sharing_an_output_dir_keep_their_records() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("a.png");
    let second = temp_dir.path().join("b.png");
    std::fs::write(&first, fixture(120, 80, ImageFormat::Png)).unwrap();
    std::fs::write(&second, fixture(80, 120, ImageFormat::Png)).unwrap();

    let config = config_for(temp_dir.path());
    let store = FsStore::new(&config.output_dir);
    let first_outcome = run_split(&config, first.to_str().unwrap(), &store).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second_outcome = run_split(&config, second.to_str().unwrap(), &store).await.unwrap();

    assert_ne!(first_outcome.manifest_path, second_outcome.manifest_path);
    assert_eq!(files_with_extension(&config.output_dir, "png"), 8);
    assert_eq!(files_with_extension(&config.output_dir, "json"), 2);

    let first_manifest = read_manifest(&first_outcome.manifest_path);
    let second_manifest = read_manifest(&second_outcome.manifest_path);
    assert_eq!(first_manifest.original_image_url, first.display().to_string());
    assert_eq!(second_manifest.original_image_url, second.display().to_string());

    // Each manifest points at its own sheets, all still on disk
    for record in &first_manifest.split_images {
        assert!(!second_manifest.split_images.iter().any(|r| r.url == record.url));
        let sheet = image::load_from_memory(&std::fs::read(&record.url).unwrap()).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (600, 400));
    }
    for record in &second_manifest.split_images {
        let sheet = image::load_from_memory(&std::fs::read(&record.url).unwrap()).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (600, 900));
    }
}

#[tokio::test]
async fn test_oversized_http_body_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/huge.png");
            then.status(200)
                .header("Content-Type", "image/png")
                .body(vec![0u8; 4096]);
        })
        .await;

    let temp_dir = TempDir::new().unwrap();
    let mut config = config_for(temp_dir.path());
    config.limits.max_bytes = 1024;
    let err = run_split(&config, &server.url("/huge.png"), &DataUrlStore)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::TooLarge { max: 1024, .. })
    ));
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn test_failed_store_removes_stored_sheets() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("photo.png");
    std::fs::write(&source, fixture(120, 80, ImageFormat::Png)).unwrap();

    let config = config_for(temp_dir.path());
    let store = FailingStore {
        inner: FsStore::new(&config.output_dir),
        fail_on: 3,
        puts: AtomicUsize::new(0),
    };
    let err = run_split(&config, source.to_str().unwrap(), &store)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Store(_)));
    assert_eq!(files_with_extension(&config.output_dir, "png"), 0);
    assert_eq!(files_with_extension(&config.output_dir, "json"), 0);
}

#[tokio::test]
async fn test_failed_manifest_removes_stored_sheets() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("photo.png");
    std::fs::write(&source, fixture(120, 80, ImageFormat::Png)).unwrap();

    // Manifest directory is a regular file, so the manifest write fails
    let blocked = temp_dir.path().join("blocked");
    std::fs::write(&blocked, b"not a directory").unwrap();
    let mut config = config_for(temp_dir.path());
    config.output_dir = blocked;

    let sheets_dir = temp_dir.path().join("sheets");
    let store = FsStore::new(&sheets_dir);
    let err = run_split(&config, source.to_str().unwrap(), &store)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Manifest(_)));
    assert_eq!(files_with_extension(&sheets_dir, "png"), 0);
}
