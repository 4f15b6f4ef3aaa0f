//! Stencil CLI - calling layer for the print partition core
//!
//! Reads an image from disk or over HTTP, validates it, runs the split on a
//! blocking worker, hands each PNG sheet to a [`store::SheetStore`] and
//! records the job in a JSON manifest.

pub mod cli;
pub mod config;
pub mod job;
pub mod logger;
pub mod pipeline;
pub mod source;
pub mod store;

pub use config::{AppConfig, ConfigError, FileConfig, Overrides};
pub use job::{JobManifest, SplitImageRecord};
pub use pipeline::{plan_report, run_probe, run_split, PipelineError, PlanReport, ProbeReport, SplitOutcome};
pub use source::FetchError;
pub use store::{AnyStore, DataUrlStore, FsStore, SheetStore, StoreError, StoreKind};
