//! Row-major sample storage.

use std::fmt;

use crate::GridError;

/// Number of rows and columns of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    /// Number of rows (north to south).
    pub rows: usize,
    /// Number of columns (west to east).
    pub cols: usize,
}

impl GridShape {
    /// Creates a shape of `rows x cols`.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of pixels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` if the shape has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A 2-D grid of samples stored row-major, row 0 first.
///
/// Missing samples are whatever the source format uses: a sentinel value
/// for population rasters, `NaN` for pollutant rasters.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    shape: GridShape,
    values: Vec<f64>,
}

impl Raster {
    /// Wraps a flat row-major sample vector.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ValueCount`] if `values.len() != rows * cols`.
    pub fn new(shape: GridShape, values: Vec<f64>) -> Result<Self, GridError> {
        if values.len() != shape.len() {
            return Err(GridError::ValueCount {
                shape,
                expected: shape.len(),
                actual: values.len(),
            });
        }
        Ok(Self { shape, values })
    }

    /// Builds a raster from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RaggedRow`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, GridError> {
        let cols = rows.first().map_or(0, Vec::len);
        let shape = GridShape::new(rows.len(), cols);
        let mut values = Vec::with_capacity(shape.len());

        for (row, samples) in rows.into_iter().enumerate() {
            if samples.len() != cols {
                return Err(GridError::RaggedRow {
                    row,
                    expected: cols,
                    actual: samples.len(),
                });
            }
            values.extend(samples);
        }

        Ok(Self { shape, values })
    }

    /// A raster with every sample set to `value`.
    #[must_use]
    pub fn filled(shape: GridShape, value: f64) -> Self {
        Self {
            shape,
            values: vec![value; shape.len()],
        }
    }

    #[must_use]
    pub const fn shape(&self) -> GridShape {
        self.shape
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The sample at `(row, col)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.shape.rows || col >= self.shape.cols {
            return None;
        }
        self.values.get(row * self.shape.cols + col).copied()
    }

    /// Overwrites the sample at `(row, col)`.
    ///
    /// Returns `false` (and changes nothing) outside the grid.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> bool {
        if row >= self.shape.rows || col >= self.shape.cols {
            return false;
        }
        self.values[row * self.shape.cols + col] = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_value_count() {
        let err = Raster::new(GridShape::new(2, 2), vec![1.0; 3]).unwrap_err();
        assert_eq!(
            err,
            GridError::ValueCount {
                shape: GridShape::new(2, 2),
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn indexes_row_major() {
        let raster = Raster::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(raster.shape(), GridShape::new(2, 3));
        assert_eq!(raster.get(0, 2), Some(3.0));
        assert_eq!(raster.get(1, 0), Some(4.0));
        assert_eq!(raster.get(2, 0), None);
        assert_eq!(raster.get(0, 3), None);
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Raster::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn set_ignores_out_of_range() {
        let mut raster = Raster::filled(GridShape::new(2, 2), 0.0);
        assert!(raster.set(1, 1, 7.0));
        assert!(!raster.set(2, 0, 7.0));
        assert_eq!(raster.get(1, 1), Some(7.0));
    }

    #[test]
    fn shape_displays_rows_by_cols() {
        assert_eq!(GridShape::new(3, 5).to_string(), "3x5");
    }
}
