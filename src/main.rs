mod config;
mod input;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, RunConfig};
use crate::input::InputError;
use crate::input::correction::CorrectionTable;
use crate::pipeline::stage1_ingest::{expected_files, run_stage1};
use crate::pipeline::stage2_bin::exclusion_counts;
use crate::pipeline::stage4_rollup::run_rollup;
use crate::pipeline::stage5_report::write_reports;
use crate::report::summary::build_summary;

#[derive(Parser)]
#[command(
    name = "nucleator-bin",
    version,
    about = "Bins Stereo Investigator nucleator exports into size distributions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the binning pipeline described by a run config.
    Run {
        /// Path to the JSON run config.
        #[arg(long)]
        config: PathBuf,
        /// Override the configured input directory.
        #[arg(long)]
        input_dir: Option<PathBuf>,
        /// Override the report path (default: the configured output
        /// file inside the input directory).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Override the run summary path (default: summary.json beside
        /// the report).
        #[arg(long)]
        summary: Option<PathBuf>,
        /// Validate the config and check every expected input file
        /// without reading data rows.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    match cli.command {
        Command::Run {
            config,
            input_dir,
            out,
            summary,
            dry_run,
        } => {
            let mut config = RunConfig::from_json_file(&config)?;
            if let Some(dir) = input_dir {
                config.input_dir = dir;
            }
            let report_path = out.unwrap_or_else(|| config.report_path());
            let summary_path = summary.unwrap_or_else(|| default_summary_path(&report_path));

            if dry_run {
                return check_inputs(&config);
            }
            run_pipeline(&config, &report_path, &summary_path)
        }
    }
}

fn default_summary_path(report_path: &Path) -> PathBuf {
    report_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("summary.json")
}

/// Existence check over every file the run config expects, reported
/// before the first one is opened for real.
fn check_inputs(config: &RunConfig) -> Result<(), RunError> {
    let mut paths = expected_files(config);
    if config.correction_enabled() {
        paths.push(config.correction_table_path());
    }

    let mut missing = Vec::new();
    for path in &paths {
        if path.exists() {
            info!("found {}", path.display());
        } else {
            missing.push(path.clone());
        }
    }
    if let Some(first) = missing.into_iter().next() {
        return Err(InputError::MissingInput(first).into());
    }
    info!("all {} expected input files present", paths.len());
    Ok(())
}

fn run_pipeline(
    config: &RunConfig,
    report_path: &Path,
    summary_path: &Path,
) -> Result<(), RunError> {
    let ingest = run_stage1(config)?;

    let table = if config.correction_enabled() {
        let table = CorrectionTable::load(&config.correction_table_path())?;
        info!(
            "loaded {} cell count entries from {}",
            table.len(),
            config.correction_table_path().display()
        );
        Some(table)
    } else {
        None
    };

    let rollup = run_rollup(config, &ingest.records, &ingest.markers, table.as_ref());
    let exclusions = exclusion_counts(&ingest.records, config.metric, &config.geometry());
    let summary = build_summary(
        config,
        &ingest,
        &rollup,
        exclusions,
        table.as_ref().map_or(0, |t| t.len()),
    );

    write_reports(
        &rollup,
        &config.geometry(),
        report_path,
        summary_path,
        &summary,
    )?;
    Ok(())
}
