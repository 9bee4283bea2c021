//! Origin + resolution grid geometry.

use geo::{Coord, Rect};

use crate::{FractionalIndex, GridError, GridShape, RasterGrid};

/// Affine grid geometry without rotation: the north-west corner of pixel
/// `(0, 0)` plus the size of one pixel in degrees.
///
/// Row 0 is the northern edge and latitude decreases with the row index;
/// column 0 is the western edge and longitude increases with the column
/// index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    origin_lon: f64,
    origin_lat_max: f64,
    res_lon: f64,
    res_lat: f64,
}

impl GeoTransform {
    /// Creates a transform from the north-west corner and pixel size.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NonPositiveResolution`] unless both resolutions
    /// are finite and strictly positive.
    pub fn new(
        origin_lon: f64,
        origin_lat_max: f64,
        res_lon: f64,
        res_lat: f64,
    ) -> Result<Self, GridError> {
        for (axis, value) in [("lon", res_lon), ("lat", res_lat)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridError::NonPositiveResolution { axis, value });
            }
        }

        Ok(Self {
            origin_lon,
            origin_lat_max,
            res_lon,
            res_lat,
        })
    }

    #[must_use]
    pub const fn origin_lon(&self) -> f64 {
        self.origin_lon
    }

    #[must_use]
    pub const fn origin_lat_max(&self) -> f64 {
        self.origin_lat_max
    }

    #[must_use]
    pub const fn res_lon(&self) -> f64 {
        self.res_lon
    }

    #[must_use]
    pub const fn res_lat(&self) -> f64 {
        self.res_lat
    }

    /// The smallest half-open pixel window of a `shape`-sized raster that
    /// covers `bbox`, clamped to the raster.
    ///
    /// The window is a superset of the pixels whose centers fall inside the
    /// box; callers still test each pixel. A box entirely off the raster
    /// yields an empty window.
    #[must_use]
    pub fn window_for_bbox(&self, bbox: Rect<f64>, shape: GridShape) -> PixelWindow {
        let (min, max) = (bbox.min(), bbox.max());

        let col_start = floor_index((min.x - self.origin_lon) / self.res_lon, shape.cols);
        let col_end = floor_index((max.x - self.origin_lon) / self.res_lon + 1.0, shape.cols);
        let row_start = floor_index((self.origin_lat_max - max.y) / self.res_lat, shape.rows);
        let row_end = floor_index((self.origin_lat_max - min.y) / self.res_lat + 1.0, shape.rows);

        PixelWindow::new(row_start, row_end, col_start, col_end)
    }
}

/// `floor(value)` clamped to `[0, upper]`. `NaN` maps to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_index(value: f64, upper: usize) -> usize {
    // float -> int casts saturate, so negatives land on 0
    (value.floor() as usize).min(upper)
}

impl RasterGrid for GeoTransform {
    #[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
    fn pixel_to_geo(&self, row: usize, col: usize) -> Coord<f64> {
        Coord {
            x: self.origin_lon + (col as f64 + 0.5) * self.res_lon,
            y: self.origin_lat_max - (row as f64 + 0.5) * self.res_lat,
        }
    }

    fn fractional_index(&self, lon: f64, lat: f64) -> FractionalIndex {
        FractionalIndex {
            row: (self.origin_lat_max - lat) / self.res_lat - 0.5,
            col: (lon - self.origin_lon) / self.res_lon - 0.5,
        }
    }
}

/// A half-open rectangle of pixel indices: rows `row_start..row_end`,
/// columns `col_start..col_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl PixelWindow {
    /// Creates a window, collapsing inverted ranges to empty ones.
    #[must_use]
    pub fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start: row_start.min(row_end),
            row_end,
            col_start: col_start.min(col_end),
            col_end,
        }
    }

    /// Number of pixels in the window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.row_end.saturating_sub(self.row_start) * self.col_end.saturating_sub(self.col_start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(row, col)` in the window, row ascending then column ascending.
    pub fn pixels(self) -> impl Iterator<Item = (usize, usize)> {
        (self.row_start..self.row_end)
            .flat_map(move |row| (self.col_start..self.col_end).map(move |col| (row, col)))
    }
}
