#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-year exposure mapping driver.
//!
//! For every configured year, loads that year's population and pollutant
//! rasters once, aggregates every region against them, and writes the
//! per-region outputs plus a yearly summary. Years whose inputs are missing
//! or unreadable are logged and skipped; they never abort the other years.

pub mod config;
pub mod layout;
pub mod progress;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use exposure_map_io::{DataError, export, regions};
use exposure_map_region::{
    Interpolation, PollutantRaster, PollutantSampler, PopulationRaster, Region, RegionStatistics,
    aggregate,
};

pub use config::{PipelineConfig, parse_years};
pub use progress::{NullProgress, ProgressCallback, null_progress};

/// Errors that can occur while running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// I/O error (directory creation, config read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading or writing a data file failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// The configuration file is not valid TOML for [`PipelineConfig`].
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// The year specification could not be parsed.
    #[error("Invalid years '{spec}': {message}")]
    Years {
        /// The specification as given.
        spec: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// What happened to each requested year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Years that were aggregated, with the number of regions written.
    pub processed: Vec<(i32, usize)>,
    /// Years skipped because an input file was missing.
    pub skipped: Vec<i32>,
    /// Years abandoned because loading or writing failed.
    pub failed: Vec<i32>,
}

/// Runs the pipeline for every year in `config.years`.
///
/// # Errors
///
/// Returns [`PipelineError`] only for failures that affect every year: an
/// invalid year specification, an unreadable regions file, or an output
/// root that cannot be created. Per-year failures are logged and recorded
/// in [`RunSummary::failed`].
pub fn run(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, PipelineError> {
    let years = parse_years(&config.years)?;
    let regions = regions::read(&config.regions, &config.region_fields())?;
    std::fs::create_dir_all(config.output_dir.join(&config.pollutant_name))?;

    let mut summary = RunSummary::default();

    for year in years {
        let start = Instant::now();
        log::info!("=== Processing {year} ===");

        let population_path = layout::expand_template(&config.population_template, year);
        let pollutant_path = layout::expand_template(&config.pollutant_template, year);

        if !population_path.exists() {
            log::warn!(
                "Skipping {year}: population raster missing at {}",
                population_path.display()
            );
            summary.skipped.push(year);
            continue;
        }
        if !pollutant_path.exists() {
            log::warn!(
                "Skipping {year}: pollutant raster missing at {}",
                pollutant_path.display()
            );
            summary.skipped.push(year);
            continue;
        }

        let result = load_year(config, &population_path, &pollutant_path).and_then(
            |(population, pollutant)| {
                let year_dir = layout::year_dir(&config.output_dir, &config.pollutant_name, year);
                run_year(
                    year,
                    &regions,
                    &population,
                    &pollutant,
                    &config.interpolation,
                    &year_dir,
                    progress.as_ref(),
                )
            },
        );

        match result {
            Ok(written) => {
                log::info!(
                    "{year} complete: {written} regions in {:.1}s",
                    start.elapsed().as_secs_f64()
                );
                summary.processed.push((year, written));
            }
            Err(e) => {
                log::error!("Failed to process {year}: {e}");
                summary.failed.push(year);
            }
        }
    }

    Ok(summary)
}

fn load_year(
    config: &PipelineConfig,
    population_path: &Path,
    pollutant_path: &Path,
) -> Result<(PopulationRaster, PollutantRaster), PipelineError> {
    let population = exposure_map_io::read_population(population_path, config.population_nodata)?;
    let pollutant = exposure_map_io::read_pollutant(pollutant_path, &config.pollutant_var)?;
    Ok((population, pollutant))
}

/// Aggregates every region for one year and writes the outputs under
/// `year_dir`. Returns the number of regions that produced statistics.
///
/// Regions without usable geometry are skipped. Each processed region gets
/// a `stats.json`; record files are written only when at least one pixel
/// matched. The yearly summary is written only when at least one region
/// produced statistics.
///
/// # Errors
///
/// Returns [`PipelineError`] if any output cannot be written.
pub fn run_year(
    year: i32,
    regions: &[Region],
    population: &PopulationRaster,
    pollutant: &PollutantRaster,
    interpolation: &[Interpolation],
    year_dir: &Path,
    progress: &dyn ProgressCallback,
) -> Result<usize, PipelineError> {
    std::fs::create_dir_all(year_dir)?;

    let sampler = PollutantSampler::new(pollutant, interpolation);
    let mut rows: Vec<RegionStatistics> = Vec::new();

    progress.set_message(year.to_string());
    progress.set_total(regions.len() as u64);

    for region in regions {
        progress.inc(1);

        let Some(result) = aggregate(region, population, &sampler, year) else {
            log::debug!("{}/{}: no usable geometry", region.province, region.city);
            continue;
        };

        let region_dir = layout::region_dir(year_dir, &region.province, &region.city);
        std::fs::create_dir_all(&region_dir)?;

        if !result.records.is_empty() {
            export::write_records_csv(&region_dir.join(layout::RECORDS_CSV), &result.records)?;
            export::write_records_geojsonseq(
                &region_dir.join(layout::RECORDS_GEOJSONSEQ),
                &result.records,
            )?;
        }
        export::write_statistics_json(&region_dir.join(layout::STATS_JSON), &result.statistics)?;

        rows.push(result.statistics);
    }

    if rows.is_empty() {
        log::info!("{year}: no regions produced data");
    } else {
        export::write_summary(
            &year_dir.join(layout::SUMMARY_CSV),
            &year_dir.join(layout::SUMMARY_JSON),
            &rows,
        )?;
        log::info!(
            "{year}: summary for {} regions -> {}",
            rows.len(),
            layout::SUMMARY_CSV
        );
    }

    progress.finish(format!("{year}: {} regions", rows.len()));

    Ok(rows.len())
}
