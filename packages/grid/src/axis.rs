//! Coordinate-axis grid geometry.

use geo::Coord;

use crate::{FractionalIndex, GridError, GridShape, RasterGrid};

/// Grid geometry given by 1-D longitude and latitude vectors of sample
/// centers.
///
/// Axes may be ascending or descending. Only the first two samples of each
/// axis are used to derive the step, so the axes are assumed uniformly
/// spaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisGrid {
    lon0: f64,
    lon_step: f64,
    lat0: f64,
    lat_step: f64,
    shape: GridShape,
}

impl AxisGrid {
    /// Derives the grid from coordinate axis vectors.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::AxisTooShort`] if either axis has fewer than two
    /// samples, or [`GridError::InvalidStep`] if the first two samples of an
    /// axis are equal or not finite.
    pub fn new(lons: &[f64], lats: &[f64]) -> Result<Self, GridError> {
        let (lon0, lon_step) = axis_step("lon", lons)?;
        let (lat0, lat_step) = axis_step("lat", lats)?;

        Ok(Self {
            lon0,
            lon_step,
            lat0,
            lat_step,
            shape: GridShape::new(lats.len(), lons.len()),
        })
    }

    /// Shape of the raster these axes describe: one row per latitude, one
    /// column per longitude.
    #[must_use]
    pub const fn shape(&self) -> GridShape {
        self.shape
    }

    #[must_use]
    pub const fn lon_step(&self) -> f64 {
        self.lon_step
    }

    #[must_use]
    pub const fn lat_step(&self) -> f64 {
        self.lat_step
    }
}

#[allow(clippy::float_cmp)]
fn axis_step(axis: &'static str, samples: &[f64]) -> Result<(f64, f64), GridError> {
    let [first, second, ..] = samples else {
        return Err(GridError::AxisTooShort {
            axis,
            len: samples.len(),
        });
    };

    let step = second - first;
    if !step.is_finite() || step == 0.0 {
        return Err(GridError::InvalidStep { axis });
    }

    Ok((*first, step))
}

impl RasterGrid for AxisGrid {
    #[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
    fn pixel_to_geo(&self, row: usize, col: usize) -> Coord<f64> {
        Coord {
            x: self.lon0 + col as f64 * self.lon_step,
            y: self.lat0 + row as f64 * self.lat_step,
        }
    }

    fn fractional_index(&self, lon: f64, lat: f64) -> FractionalIndex {
        FractionalIndex {
            row: (lat - self.lat0) / self.lat_step,
            col: (lon - self.lon0) / self.lon_step,
        }
    }
}
