use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use stencil_cli::cli::{Cli, Command, PlanArgs, ProbeArgs, SplitArgs};
use stencil_cli::{logger, plan_report, run_probe, run_split, AnyStore, AppConfig, FileConfig};
use stencil_core::ImageSettings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let result = match cli.command {
        Command::Split(args) => split(args).await,
        Command::Probe(args) => probe(args).await,
        Command::Plan(args) => plan(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn split(args: SplitArgs) -> Result<()> {
    let file = FileConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = AppConfig::resolve(&file, &args.overrides())?;
    let store = AnyStore::new(config.store, &config.output_dir);

    let outcome = run_split(&config, &args.source, &store)
        .await
        .with_context(|| format!("Failed to split {}", args.source))?;

    for image in &outcome.manifest.split_images {
        let shown = if image.url.starts_with("data:") {
            format!("data URL ({} chars)", image.url.len())
        } else {
            image.url.clone()
        };
        println!("page {}: {}", image.page_number, shown);
    }
    println!(
        "{} x {} px per sheet, manifest at {}",
        outcome.plan.quadrant_width,
        outcome.plan.quadrant_height,
        outcome.manifest_path.display()
    );
    Ok(())
}

async fn probe(args: ProbeArgs) -> Result<()> {
    let file = FileConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = AppConfig::resolve(&file, &args.overrides())?;

    let report = run_probe(&config, &args.source)
        .await
        .with_context(|| format!("Failed to probe {}", args.source))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn plan(args: PlanArgs) -> Result<()> {
    let settings = ImageSettings::new(args.width).with_rotation(args.rotation);
    let report = plan_report(args.width_px, args.height_px, &settings)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
