#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raster grid geometry.
//!
//! Converts between pixel-index space and geographic (longitude/latitude)
//! space for regularly gridded rasters. Two grid geometries are supported:
//!
//! - [`GeoTransform`]: an origin (west edge, north edge) plus a per-axis
//!   resolution, as carried by `GeoTIFF`/ASCII grid headers.
//! - [`AxisGrid`]: 1-D longitude and latitude vectors of sample centers, as
//!   carried by `NetCDF`-style datasets.
//!
//! Both implement [`RasterGrid`], and both map an integer pixel index to the
//! *center* of that pixel, so two independently gridded rasters can be
//! reconciled through geographic space without a shared resampling step.

mod axis;
mod raster;
mod transform;

pub use axis::AxisGrid;
pub use raster::{GridShape, Raster};
pub use transform::{GeoTransform, PixelWindow};

use geo::Coord;

/// Errors raised while constructing rasters or grid geometries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// A pixel resolution was zero, negative, or not finite.
    #[error("Resolution along {axis} must be positive, got {value}")]
    NonPositiveResolution {
        /// Axis name (`"lon"` or `"lat"`).
        axis: &'static str,
        /// The offending resolution.
        value: f64,
    },

    /// A coordinate axis has fewer than two samples, so no step can be derived.
    #[error("Coordinate axis {axis} needs at least 2 samples, got {len}")]
    AxisTooShort {
        /// Axis name (`"lon"` or `"lat"`).
        axis: &'static str,
        /// Number of samples present.
        len: usize,
    },

    /// The first two samples of a coordinate axis are equal or not finite.
    #[error("Coordinate axis {axis} has a zero or non-finite step")]
    InvalidStep {
        /// Axis name (`"lon"` or `"lat"`).
        axis: &'static str,
    },

    /// The number of samples does not match the declared shape.
    #[error("Expected {expected} samples for a {shape} grid, got {actual}")]
    ValueCount {
        /// Declared grid shape.
        shape: GridShape,
        /// `rows * cols`.
        expected: usize,
        /// Number of samples supplied.
        actual: usize,
    },

    /// A row of a nested sample array has a different length than the first.
    #[error("Row {row} has {actual} samples, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of this row.
        actual: usize,
    },

    /// A grid geometry implies a different shape than the raster it describes.
    #[error("Grid geometry describes a {grid} grid but the raster is {raster}")]
    ShapeMismatch {
        /// Shape implied by the grid geometry.
        grid: GridShape,
        /// Shape of the sample array.
        raster: GridShape,
    },
}

/// A continuous (fractional) pixel position on some grid.
///
/// Integer values land exactly on pixel centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionalIndex {
    /// Fractional row position.
    pub row: f64,
    /// Fractional column position.
    pub col: f64,
}

impl FractionalIndex {
    /// Returns `true` when `0 <= row < rows` and `0 <= col < cols`.
    ///
    /// `NaN` positions are never in bounds.
    #[must_use]
    pub fn in_bounds(&self, shape: GridShape) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let (rows, cols) = (shape.rows as f64, shape.cols as f64);
        (0.0..rows).contains(&self.row) && (0.0..cols).contains(&self.col)
    }
}

/// A grid geometry that can convert in both directions between pixel
/// indices and geographic coordinates.
pub trait RasterGrid {
    /// Geographic coordinate (`x` = longitude, `y` = latitude) of the center
    /// of pixel `(row, col)`.
    fn pixel_to_geo(&self, row: usize, col: usize) -> Coord<f64>;

    /// Fractional pixel position of a geographic coordinate.
    ///
    /// The result is unbounded; callers check it against the raster shape.
    fn fractional_index(&self, lon: f64, lat: f64) -> FractionalIndex;
}

/// Either grid geometry, for rasters whose source format decides which one
/// applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridSpec {
    /// Origin + resolution geometry.
    Transform(GeoTransform),
    /// Coordinate-axis geometry.
    Axes(AxisGrid),
}

impl GridSpec {
    /// The raster shape this geometry requires, if it implies one.
    ///
    /// Axis grids know their sample counts; transform grids fit any shape.
    #[must_use]
    pub const fn implied_shape(&self) -> Option<GridShape> {
        match self {
            Self::Transform(_) => None,
            Self::Axes(axes) => Some(axes.shape()),
        }
    }
}

impl RasterGrid for GridSpec {
    fn pixel_to_geo(&self, row: usize, col: usize) -> Coord<f64> {
        match self {
            Self::Transform(t) => t.pixel_to_geo(row, col),
            Self::Axes(a) => a.pixel_to_geo(row, col),
        }
    }

    fn fractional_index(&self, lon: f64, lat: f64) -> FractionalIndex {
        match self {
            Self::Transform(t) => t.fractional_index(lon, lat),
            Self::Axes(a) => a.fractional_index(lon, lat),
        }
    }
}

impl From<GeoTransform> for GridSpec {
    fn from(value: GeoTransform) -> Self {
        Self::Transform(value)
    }
}

impl From<AxisGrid> for GridSpec {
    fn from(value: AxisGrid) -> Self {
        Self::Axes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_index_bounds_are_half_open() {
        let shape = GridShape::new(3, 4);
        assert!(FractionalIndex { row: 0.0, col: 0.0 }.in_bounds(shape));
        assert!(FractionalIndex { row: 2.99, col: 3.99 }.in_bounds(shape));
        assert!(!FractionalIndex { row: 3.0, col: 0.0 }.in_bounds(shape));
        assert!(!FractionalIndex { row: 0.0, col: 4.0 }.in_bounds(shape));
        assert!(!FractionalIndex { row: -0.01, col: 1.0 }.in_bounds(shape));
    }

    #[test]
    fn nan_index_is_out_of_bounds() {
        let shape = GridShape::new(3, 4);
        assert!(!FractionalIndex { row: f64::NAN, col: 1.0 }.in_bounds(shape));
    }

    #[test]
    fn both_geometries_agree_on_pixel_centers() {
        let transform = GeoTransform::new(100.0, 10.0, 1.0, 1.0).unwrap();
        let axes = AxisGrid::new(&[100.5, 101.5, 102.5], &[9.5, 8.5]).unwrap();

        for (row, col) in [(0, 0), (1, 2), (0, 1)] {
            let a = GridSpec::from(transform).pixel_to_geo(row, col);
            let b = GridSpec::from(axes).pixel_to_geo(row, col);
            assert!((a.x - b.x).abs() < 1e-12);
            assert!((a.y - b.y).abs() < 1e-12);

            let fa = transform.fractional_index(a.x, a.y);
            let fb = axes.fractional_index(b.x, b.y);
            assert!((fa.row - fb.row).abs() < 1e-12);
            assert!((fa.col - fb.col).abs() < 1e-12);
        }
    }

    #[test]
    fn implied_shape_only_for_axes() {
        let transform = GeoTransform::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(GridSpec::from(transform).implied_shape(), None);

        let axes = AxisGrid::new(&[0.0, 1.0, 2.0], &[5.0, 4.0]).unwrap();
        assert_eq!(
            GridSpec::from(axes).implied_shape(),
            Some(GridShape::new(2, 3))
        );
    }
}
