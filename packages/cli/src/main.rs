#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the exposure map toolchain.
//!
//! Joins yearly population rasters with pollutant concentration rasters
//! per city and writes matched pixel tables plus exposure statistics.
//!
//! Uses `indicatif-log-bridge` (via [`exposure_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use exposure_map_cli_utils::IndicatifProgress;
use exposure_map_pipeline::{PipelineConfig, layout, parse_years};

use crate::args::ConfigArgs;

#[derive(Parser)]
#[command(
    name = "exposure_map",
    about = "Population-weighted pollutant exposure per city and year"
)]
struct Cli {
    /// TOML configuration file. Flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Commands {
    /// Aggregate every configured year (the default)
    Run,
    /// Print the effective configuration as TOML
    Config,
    /// List the configured years and whether their input files exist
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = exposure_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    cli.overrides.apply(&mut config);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let progress = IndicatifProgress::regions_bar(&multi, "Aggregating regions");
            let summary = exposure_map_pipeline::run(&config, &progress)?;
            progress.finish_and_clear();

            let regions: usize = summary.processed.iter().map(|(_, n)| n).sum();
            log::info!(
                "Done: {} years processed ({regions} region outputs), {} skipped, {} failed",
                summary.processed.len(),
                summary.skipped.len(),
                summary.failed.len()
            );

            if !summary.failed.is_empty() {
                return Err(format!("Failed years: {:?}", summary.failed).into());
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Commands::Check => {
            println!("{:<6} {:<11} POLLUTANT", "YEAR", "POPULATION");
            println!("{}", "-".repeat(30));
            for year in parse_years(&config.years)? {
                let population = layout::expand_template(&config.population_template, year);
                let pollutant = layout::expand_template(&config.pollutant_template, year);
                println!(
                    "{year:<6} {:<11} {}",
                    presence(population.exists()),
                    presence(pollutant.exists())
                );
            }
        }
    }

    Ok(())
}

const fn presence(exists: bool) -> &'static str {
    if exists { "ok" } else { "missing" }
}
