#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! File formats for the exposure mapping pipeline.
//!
//! Decoders turn files into the in-memory rasters and regions the
//! aggregation core consumes:
//!
//! - [`geotiff`]: single-band `GeoTIFF`s (`.tif`), the native `LandScan`
//!   population format.
//! - [`ascii_grid`]: ESRI ASCII grids (`.asc`), used for population and
//!   optionally pollutant rasters.
//! - [`axis_grid`]: JSON documents with `lon`/`lat` axis vectors and one or
//!   more named 2-D variables, the shape `NetCDF` pollutant products are
//!   usually exported to.
//! - [`regions`]: `GeoJSON` feature collections of city boundaries.
//!
//! Encoders in [`export`] write matched pixel records and statistics as
//! CSV, JSON, and `GeoJSONSeq`.

pub mod ascii_grid;
pub mod axis_grid;
pub mod export;
pub mod geotiff;
pub mod regions;

use std::path::Path;

use exposure_map_grid::{GridError, Raster};
use exposure_map_region::{PollutantRaster, PopulationRaster};

/// Errors that can occur while reading or writing pipeline files.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// TIFF decoding failed.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Decoded samples do not form a valid grid.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// The file parsed but its content is not what the format requires.
    #[error("Format error: {message}")]
    Format {
        /// Description of what went wrong.
        message: String,
    },
}

impl DataError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// Raster container formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RasterFormat {
    GeoTiff,
    AsciiGrid,
    AxisGrid,
}

impl RasterFormat {
    fn of(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("tif" | "tiff") => Self::GeoTiff,
            Some("asc") => Self::AsciiGrid,
            _ => Self::AxisGrid,
        }
    }
}

/// Reads a population raster: `.tif`/`.tiff` as `GeoTIFF`, anything else as
/// an ESRI ASCII grid. `nodata` overrides the sentinel stored in the file.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or decoded.
pub fn read_population(path: &Path, nodata: Option<f64>) -> Result<PopulationRaster, DataError> {
    match RasterFormat::of(path) {
        RasterFormat::GeoTiff => Ok(geotiff::read(path)?.into_population(nodata)),
        RasterFormat::AsciiGrid | RasterFormat::AxisGrid => {
            ascii_grid::read(path)?.into_population(nodata)
        }
    }
}

/// Reads a pollutant raster, choosing the decoder by file extension:
/// `.tif`/`.tiff` is a `GeoTIFF`, `.asc` an ESRI ASCII grid, anything else a
/// JSON axis grid holding `variable`.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or decoded.
pub fn read_pollutant(path: &Path, variable: &str) -> Result<PollutantRaster, DataError> {
    match RasterFormat::of(path) {
        RasterFormat::GeoTiff => geotiff::read(path)?.into_pollutant(),
        RasterFormat::AsciiGrid => ascii_grid::read(path)?.into_pollutant(),
        RasterFormat::AxisGrid => axis_grid::read(path, variable),
    }
}

/// Copies `raster` with every `nodata` sample replaced by `NaN`.
#[allow(clippy::float_cmp)]
pub(crate) fn nodata_to_nan(raster: &Raster, nodata: Option<f64>) -> Result<Raster, DataError> {
    let values = raster
        .values()
        .iter()
        .map(|&v| if nodata == Some(v) { f64::NAN } else { v })
        .collect();
    Raster::new(raster.shape(), values).map_err(Into::into)
}
