//! JSON axis-grid decoding.
//!
//! A pollutant product exported as
//!
//! ```json
//! {
//!   "lon": [100.0, 100.01, 100.02],
//!   "lat": [30.0, 29.99],
//!   "PM2.5": [[31.2, 30.8, null], [29.9, 30.1, 30.4]]
//! }
//! ```
//!
//! One row per latitude, one column per longitude. `null` samples are
//! missing and become `NaN`. Any number of variables may sit next to the
//! axes; the caller picks one by name.

use std::collections::BTreeMap;
use std::path::Path;

use exposure_map_grid::{AxisGrid, Raster};
use exposure_map_region::PollutantRaster;
use serde::Deserialize;

use crate::DataError;

#[derive(Debug, Deserialize)]
struct AxisDocument {
    #[serde(alias = "longitude")]
    lon: Vec<f64>,
    #[serde(alias = "latitude")]
    lat: Vec<f64>,
    #[serde(flatten)]
    variables: BTreeMap<String, serde_json::Value>,
}

/// Reads a JSON axis grid and extracts `variable` as a pollutant raster.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or decoded.
pub fn read(path: &Path, variable: &str) -> Result<PollutantRaster, DataError> {
    let text = std::fs::read_to_string(path)?;
    let pollutant = parse(&text, variable)?;
    log::debug!(
        "Read {variable} ({}) from {}",
        pollutant.raster().shape(),
        path.display()
    );
    Ok(pollutant)
}

/// Decodes a JSON axis grid and extracts `variable`.
///
/// # Errors
///
/// Returns [`DataError::Format`] if `variable` is absent or not a 2-D
/// array of numbers/nulls, and [`DataError::Grid`] if the axes are invalid
/// or disagree with the variable's shape.
pub fn parse(text: &str, variable: &str) -> Result<PollutantRaster, DataError> {
    let mut document: AxisDocument = serde_json::from_str(text)?;

    let Some(samples) = document.variables.remove(variable) else {
        let available = document
            .variables
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(DataError::format(format!(
            "Variable {variable} not found (available: {available})"
        )));
    };

    let rows: Vec<Vec<Option<f64>>> = serde_json::from_value(samples).map_err(|e| {
        DataError::format(format!("Variable {variable} is not a 2-D numeric array: {e}"))
    })?;

    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect();

    let axes = AxisGrid::new(&document.lon, &document.lat)?;
    PollutantRaster::new(Raster::from_rows(rows)?, axes).map_err(Into::into)
}
