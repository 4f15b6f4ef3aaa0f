//! The calling layer around the core: acquire, validate, split, store, record.
//!
//! All I/O happens here. The CPU-bound split runs on a blocking worker so the
//! runtime stays free for fetches and writes.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use stencil_core::settings::informational_dpi;
use stencil_core::{
    compute_rotated_bounds, plan, probe_dimensions, split_to_png, validate_upload, DecodeError,
    DpiRating, ImageSettings, OverlayOptions, PlanError, SettingsError, SheetPlan, SplitError,
    SplitOptions, ValidationError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::job::{manifest_key, JobManifest, ManifestError, SplitImageRecord};
use crate::source::{acquire, FetchError, SourceImage};
use crate::store::{sheet_key, SheetStore, StoreError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Probe(#[from] DecodeError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Split worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// What a finished split produced.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub manifest: JobManifest,
    pub manifest_path: PathBuf,
    pub plan: SheetPlan,
}

/// Report printed by the `probe` subcommand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub width: u32,
    pub height: u32,
    pub media_type: &'static str,
    pub target_width_inches: f64,
    pub dpi: u32,
    pub rating: DpiRating,
    pub message: &'static str,
}

/// Report printed by the `plan` subcommand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub rotated_width: u32,
    pub rotated_height: u32,
    #[serde(flatten)]
    pub plan: SheetPlan,
    pub print_width_inches: f64,
    pub print_height_inches: f64,
    pub sheet_width_inches: f64,
    pub sheet_height_inches: f64,
    pub fits_a4: bool,
}

/// Run one split end to end.
///
/// # Errors
///
/// Fails on the first problem; nothing is retried. If storing a sheet or
/// writing the manifest fails, the sheets this job already stored are removed.
pub async fn run_split<S: SheetStore>(
    config: &AppConfig,
    source: &str,
    store: &S,
) -> Result<SplitOutcome, PipelineError> {
    let image = acquire_within_limits(config, source).await?;
    validate_upload(&image.media_type, image.bytes.len() as u64, &config.limits)?;
    config.settings.check_policy()?;

    let dims = probe_dimensions(&image.bytes)?;
    let settings = config.settings.clone().with_source_width(dims.width);
    info!(
        width = dims.width,
        height = dims.height,
        dpi = settings.dpi,
        target_width_inches = settings.target_width_inches,
        rotation = settings.rotation_degrees,
        "Splitting image"
    );

    let mut options = SplitOptions::default();
    if config.overlay {
        options = options.with_overlay(OverlayOptions::at_print_resolution());
    }

    let bytes = image.bytes;
    let split_settings = settings.clone();
    let encoded =
        tokio::task::spawn_blocking(move || split_to_png(&bytes, &split_settings, &options))
            .await??;

    let timestamp = Utc::now();
    let job_ms = timestamp.timestamp_millis();
    let origin = image.origin;
    let mut stored_keys = Vec::with_capacity(encoded.sheets.len());
    let persisted = async {
        let mut split_images = Vec::with_capacity(encoded.sheets.len());
        for sheet in &encoded.sheets {
            let key = sheet_key(job_ms, sheet.page_number);
            let url = store.put(&key, &sheet.png).await?;
            debug!(page = sheet.page_number, key = %key, "Stored sheet");
            stored_keys.push(key);
            split_images.push(SplitImageRecord {
                url,
                position: sheet.position,
                page_number: sheet.page_number,
            });
        }

        let manifest = JobManifest {
            original_image_url: origin,
            split_images,
            settings,
            created_at: timestamp,
        };
        let manifest_path = manifest
            .write_to(&config.output_dir, &manifest_key(job_ms))
            .await?;
        Ok::<_, PipelineError>((manifest, manifest_path))
    }
    .await;

    let (manifest, manifest_path) = match persisted {
        Ok(done) => done,
        Err(err) => {
            discard_sheets(store, &stored_keys).await;
            return Err(err);
        }
    };
    info!(manifest = %manifest_path.display(), "Split complete");

    Ok(SplitOutcome {
        manifest,
        manifest_path,
        plan: encoded.plan,
    })
}

/// Acquire the source, reporting early size and type rejections as
/// validation failures.
async fn acquire_within_limits(
    config: &AppConfig,
    source: &str,
) -> Result<SourceImage, PipelineError> {
    acquire(source, config.fetch_timeout, &config.limits)
        .await
        .map_err(|err| match err {
            FetchError::Rejected(rejection) => PipelineError::Validation(rejection),
            other => PipelineError::Fetch(other),
        })
}

async fn discard_sheets<S: SheetStore>(store: &S, keys: &[String]) {
    for key in keys {
        match store.remove(key).await {
            Ok(()) => debug!(key = %key, "Removed sheet of failed job"),
            Err(err) => warn!(key = %key, error = %err, "Failed to remove sheet of failed job"),
        }
    }
}

/// Read a source's header and rate it for the configured target width.
pub async fn run_probe(config: &AppConfig, source: &str) -> Result<ProbeReport, PipelineError> {
    let image = acquire_within_limits(config, source).await?;
    let dims = probe_dimensions(&image.bytes)?;

    let target = config.settings.target_width_inches;
    let dpi = informational_dpi(dims.width, target);
    let rating = DpiRating::from_dpi(dpi);

    Ok(ProbeReport {
        width: dims.width,
        height: dims.height,
        media_type: dims.format.media_type(),
        target_width_inches: target,
        dpi,
        rating,
        message: rating.message(),
    })
}

/// Plan a split without any image, from its pixel size alone.
pub fn plan_report(
    width_px: u32,
    height_px: u32,
    settings: &ImageSettings,
) -> Result<PlanReport, PipelineError> {
    let (rotated_width, rotated_height) =
        compute_rotated_bounds(width_px, height_px, settings.rotation_degrees);
    let plan = plan(rotated_width, rotated_height, settings.target_width_inches)?;
    let (print_width_inches, print_height_inches) = plan.print_size_inches();
    let (sheet_width_inches, sheet_height_inches) = plan.sheet_size_inches();

    Ok(PlanReport {
        rotated_width,
        rotated_height,
        plan,
        print_width_inches,
        print_height_inches,
        sheet_width_inches,
        sheet_height_inches,
        fits_a4: plan.fits_paper(&stencil_core::PaperSize::A4),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_report_landscape() {
        let report = plan_report(3000, 2000, &ImageSettings::new(6.5)).unwrap();
        assert_eq!((report.rotated_width, report.rotated_height), (3000, 2000));
        assert_eq!(report.plan.quadrant_width, 975);
        assert!((report.print_width_inches - 6.5).abs() < 1e-9);
        assert!((report.sheet_width_inches - 3.25).abs() < 1e-9);
        assert!(report.fits_a4);
    }

    #[test]
    fn test_plan_report_rotated() {
        let settings = ImageSettings::new(6.5).with_rotation(90.0);
        let report = plan_report(3000, 2000, &settings).unwrap();
        assert_eq!((report.rotated_width, report.rotated_height), (2000, 3000));
        assert_eq!(report.plan.final_height, 2925);
    }

    #[test]
    fn test_plan_report_json_is_flat() {
        let report = plan_report(3000, 2000, &ImageSettings::new(6.5)).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["finalWidth"], 1950);
        assert_eq!(value["quadrantHeight"], 650);
        assert_eq!(value["fitsA4"], true);
    }

    #[test]
    fn test_plan_report_rejects_empty() {
        let err = plan_report(0, 10, &ImageSettings::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Plan(PlanError::EmptySource { .. })));
    }
}
