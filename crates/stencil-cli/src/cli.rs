use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;
use crate::store::StoreKind;

#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(about = "Split an image into four printable sheets that tile a larger print")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split an image into a 2x2 grid of PNG sheets
    Split(SplitArgs),
    /// Report an image's dimensions and print quality
    Probe(ProbeArgs),
    /// Show the sheet geometry for an image size without processing anything
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Local path or http(s) URL of the image
    pub source: String,

    /// Width of the reassembled print in inches
    #[arg(short, long)]
    pub width: Option<f64>,

    /// Clockwise rotation in degrees, applied before splitting
    #[arg(short, long, allow_negative_numbers = true)]
    pub rotation: Option<f64>,

    /// Overlap between sheets in mm (recorded only)
    #[arg(long)]
    pub overlap: Option<u32>,

    /// Draw a 1 cm grid and registration marks on each sheet
    #[arg(long)]
    pub overlay: bool,

    /// Directory for sheets and the job manifest
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Where to put the sheets
    #[arg(long, value_enum)]
    pub store: Option<StoreKind>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl SplitArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            target_width_inches: self.width,
            rotation_degrees: self.rotation,
            overlap_mm: self.overlap,
            overlay: self.overlay,
            output_dir: self.out.clone(),
            store: self.store,
        }
    }
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Local path or http(s) URL of the image
    pub source: String,

    /// Print width in inches used for the DPI rating
    #[arg(short, long)]
    pub width: Option<f64>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ProbeArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            target_width_inches: self.width,
            ..Overrides::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Source width in pixels
    #[arg(long)]
    pub width_px: u32,

    /// Source height in pixels
    #[arg(long)]
    pub height_px: u32,

    /// Width of the reassembled print in inches
    #[arg(short, long, default_value_t = 6.5)]
    pub width: f64,

    /// Clockwise rotation in degrees
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub rotation: f64,
}
