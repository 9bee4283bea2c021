#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Population-weighted pollutant exposure per region.
//!
//! For one region polygon and one year, [`aggregate`] walks the pixels of
//! the population raster that could fall inside the polygon, keeps those
//! with a valid population sample and a center inside the polygon, resolves
//! the pollutant concentration at each kept pixel through the pollutant
//! raster's own grid, and folds everything into [`RegionStatistics`] plus a
//! list of matched [`PixelRecord`]s in a single pass.
//!
//! The two rasters are never resampled onto each other. They meet only in
//! geographic space: population pixel index -> (lon, lat) -> fractional
//! pollutant index.

mod aggregate;
pub mod sampling;

pub use aggregate::aggregate;
pub use exposure_map_grid::GridError;
pub use exposure_map_region_models::{PixelRecord, Region, RegionAggregation, RegionStatistics};
pub use sampling::{Interpolation, PollutantSampler};

use exposure_map_grid::{GeoTransform, GridSpec, Raster};

/// No-data value used by `LandScan` population rasters.
pub const LANDSCAN_NODATA: f64 = -2_147_483_647.0;

/// A population raster with its origin/resolution geometry and no-data
/// sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRaster {
    raster: Raster,
    transform: GeoTransform,
    nodata: f64,
}

impl PopulationRaster {
    #[must_use]
    pub const fn new(raster: Raster, transform: GeoTransform, nodata: f64) -> Self {
        Self {
            raster,
            transform,
            nodata,
        }
    }

    #[must_use]
    pub const fn raster(&self) -> &Raster {
        &self.raster
    }

    #[must_use]
    pub const fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    #[must_use]
    pub const fn nodata(&self) -> f64 {
        self.nodata
    }

    /// The population at `(row, col)` if it is a usable sample: present,
    /// strictly positive, and not the no-data sentinel.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn valid_sample(&self, row: usize, col: usize) -> Option<f64> {
        self.raster
            .get(row, col)
            .filter(|&value| value > 0.0 && value != self.nodata)
    }
}

/// A pollutant concentration raster on its own grid. Missing samples are
/// `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollutantRaster {
    raster: Raster,
    grid: GridSpec,
}

impl PollutantRaster {
    /// Pairs samples with their grid geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if the grid is an axis grid whose
    /// axis lengths differ from the raster shape.
    pub fn new(raster: Raster, grid: impl Into<GridSpec>) -> Result<Self, GridError> {
        let grid = grid.into();
        match grid.implied_shape() {
            Some(expected) if expected != raster.shape() => Err(GridError::ShapeMismatch {
                grid: expected,
                raster: raster.shape(),
            }),
            _ => Ok(Self { raster, grid }),
        }
    }

    #[must_use]
    pub const fn raster(&self) -> &Raster {
        &self.raster
    }

    #[must_use]
    pub const fn grid(&self) -> &GridSpec {
        &self.grid
    }
}
