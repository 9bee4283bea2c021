//! ESRI ASCII grid (`.asc`) decoding.
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    100.0
//! yllcorner    7.0
//! cellsize     1.0
//! NODATA_value -2147483647
//! 1 2 3 4
//! ...
//! ```
//!
//! `xllcenter`/`yllcenter` and separate `dx`/`dy` cell sizes are accepted.
//! Header keys are case-insensitive. Sample rows run north to south.

use std::path::Path;

use exposure_map_grid::{GeoTransform, GridShape, Raster};
use exposure_map_region::{LANDSCAN_NODATA, PollutantRaster, PopulationRaster};

use crate::DataError;

/// Decoded ASCII grid header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsciiGridHeader {
    pub ncols: usize,
    pub nrows: usize,
    /// West edge of the grid.
    pub west: f64,
    /// South edge of the grid.
    pub south: f64,
    pub cell_width: f64,
    pub cell_height: f64,
    pub nodata: Option<f64>,
}

impl AsciiGridHeader {
    /// Origin/resolution geometry anchored at the north-west corner.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Grid`] if a cell size is not positive.
    #[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
    pub fn transform(&self) -> Result<GeoTransform, DataError> {
        let north = self.south + self.nrows as f64 * self.cell_height;
        GeoTransform::new(self.west, north, self.cell_width, self.cell_height).map_err(Into::into)
    }
}

/// A decoded ASCII grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub header: AsciiGridHeader,
    pub raster: Raster,
}

impl AsciiGrid {
    /// Interprets the grid as population counts.
    ///
    /// The no-data sentinel is `nodata` if given, else the header's
    /// `NODATA_value`, else [`LANDSCAN_NODATA`].
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Grid`] if the header geometry is invalid.
    pub fn into_population(self, nodata: Option<f64>) -> Result<PopulationRaster, DataError> {
        let transform = self.header.transform()?;
        let nodata = nodata.or(self.header.nodata).unwrap_or(LANDSCAN_NODATA);
        Ok(PopulationRaster::new(self.raster, transform, nodata))
    }

    /// Interprets the grid as pollutant concentrations, with no-data samples
    /// replaced by `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Grid`] if the header geometry is invalid.
    pub fn into_pollutant(self) -> Result<PollutantRaster, DataError> {
        let transform = self.header.transform()?;
        let raster = crate::nodata_to_nan(&self.raster, self.header.nodata)?;
        PollutantRaster::new(raster, transform).map_err(Into::into)
    }
}

/// Reads and decodes an ASCII grid file.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or is malformed.
pub fn read(path: &Path) -> Result<AsciiGrid, DataError> {
    let text = std::fs::read_to_string(path)?;
    let grid = parse(&text)?;
    log::debug!(
        "Read {} ASCII grid from {}",
        grid.raster.shape(),
        path.display()
    );
    Ok(grid)
}

/// Header keys, lowercased. The first line starting with anything else
/// begins the sample block, so rows may open with `nan` or `inf`.
const HEADER_KEYS: &[&str] = &[
    "ncols",
    "nrows",
    "xllcorner",
    "xllcenter",
    "yllcorner",
    "yllcenter",
    "cellsize",
    "dx",
    "dy",
    "nodata_value",
];

#[derive(Default)]
struct PartialHeader {
    ncols: Option<usize>,
    nrows: Option<usize>,
    x: Option<(f64, bool)>,
    y: Option<(f64, bool)>,
    cellsize: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
    nodata: Option<f64>,
}

/// Decodes ASCII grid text.
///
/// # Errors
///
/// Returns [`DataError::Format`] for missing or malformed header fields,
/// unparseable samples, or a sample count that does not match the header.
pub fn parse(text: &str) -> Result<AsciiGrid, DataError> {
    let mut header = PartialHeader::default();
    let mut lines = text.lines().peekable();

    while let Some(&line) = lines.peek() {
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            lines.next();
            continue;
        };
        let key_lower = key.to_ascii_lowercase();
        if !HEADER_KEYS.contains(&key_lower.as_str()) {
            break;
        }
        let value = tokens
            .next()
            .ok_or_else(|| DataError::format(format!("Header field {key} has no value")))?;

        match key_lower.as_str() {
            "ncols" => header.ncols = Some(parse_count(key, value)?),
            "nrows" => header.nrows = Some(parse_count(key, value)?),
            "xllcorner" => header.x = Some((parse_number(key, value)?, false)),
            "xllcenter" => header.x = Some((parse_number(key, value)?, true)),
            "yllcorner" => header.y = Some((parse_number(key, value)?, false)),
            "yllcenter" => header.y = Some((parse_number(key, value)?, true)),
            "cellsize" => header.cellsize = Some(parse_number(key, value)?),
            "dx" => header.dx = Some(parse_number(key, value)?),
            "dy" => header.dy = Some(parse_number(key, value)?),
            "nodata_value" => header.nodata = Some(parse_number(key, value)?),
            _ => break,
        }
        lines.next();
    }

    let header = header.finish()?;
    let shape = GridShape::new(header.nrows, header.ncols);

    let values = lines
        .flat_map(str::split_whitespace)
        .map(|token| parse_number("sample", token))
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() != shape.len() {
        return Err(DataError::format(format!(
            "Header declares {shape} samples ({}) but found {}",
            shape.len(),
            values.len()
        )));
    }

    Ok(AsciiGrid {
        header,
        raster: Raster::new(shape, values)?,
    })
}

impl PartialHeader {
    fn finish(self) -> Result<AsciiGridHeader, DataError> {
        let missing = |field: &str| DataError::format(format!("Missing header field {field}"));

        let ncols = self.ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = self.nrows.ok_or_else(|| missing("nrows"))?;
        let (x, x_center) = self.x.ok_or_else(|| missing("xllcorner"))?;
        let (y, y_center) = self.y.ok_or_else(|| missing("yllcorner"))?;
        let cell_width = self
            .dx
            .or(self.cellsize)
            .ok_or_else(|| missing("cellsize"))?;
        let cell_height = self
            .dy
            .or(self.cellsize)
            .ok_or_else(|| missing("cellsize"))?;

        Ok(AsciiGridHeader {
            ncols,
            nrows,
            west: if x_center { x - cell_width / 2.0 } else { x },
            south: if y_center { y - cell_height / 2.0 } else { y },
            cell_width,
            cell_height,
            nodata: self.nodata,
        })
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, DataError> {
    value
        .parse()
        .map_err(|_| DataError::format(format!("Invalid {key}: {value}")))
}

fn parse_number(key: &str, value: &str) -> Result<f64, DataError> {
    value
        .parse()
        .map_err(|_| DataError::format(format!("Invalid {key}: {value}")))
}
