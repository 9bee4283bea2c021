//! Encoders for matched pixel records and region statistics.
//!
//! CSV files start with a UTF-8 byte order mark so spreadsheet tools pick
//! the right encoding for non-ASCII region names.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use exposure_map_region_models::{PixelRecord, RegionStatistics};
use serde::Serialize;

use crate::DataError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes rows as CSV with a header line derived from the row type.
///
/// # Errors
///
/// Returns [`DataError`] if writing or encoding fails.
pub fn write_csv<W: Write, T: Serialize>(mut writer: W, rows: &[T]) -> Result<(), DataError> {
    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes records as newline-delimited `GeoJSON` point features.
///
/// # Errors
///
/// Returns [`DataError`] if writing or encoding fails.
pub fn write_geojsonseq<W: Write>(
    mut writer: W,
    records: &[PixelRecord<'_>],
) -> Result<(), DataError> {
    for record in records {
        let feature = serde_json::json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [record.lon, record.lat]
            },
            "properties": {
                "province": record.province,
                "city": record.city,
                "population": record.population,
                "pollutant": record.pollutant,
                "year": record.year,
            }
        });
        serde_json::to_writer(&mut writer, &feature)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a value as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`DataError`] if writing or encoding fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(
    mut writer: W,
    value: &T,
) -> Result<(), DataError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, DataError> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Writes matched pixel records to a CSV file.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be written.
pub fn write_records_csv(path: &Path, records: &[PixelRecord<'_>]) -> Result<(), DataError> {
    write_csv(create(path)?, records)
}

/// Writes matched pixel records to a `GeoJSONSeq` file.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be written.
pub fn write_records_geojsonseq(
    path: &Path,
    records: &[PixelRecord<'_>],
) -> Result<(), DataError> {
    write_geojsonseq(create(path)?, records)
}

/// Writes one region's statistics as a JSON object.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be written.
pub fn write_statistics_json(path: &Path, statistics: &RegionStatistics) -> Result<(), DataError> {
    write_json(create(path)?, statistics)
}

/// Writes a year's statistics rollup as CSV and JSON side by side.
///
/// # Errors
///
/// Returns [`DataError`] if either file cannot be written.
pub fn write_summary(
    csv_path: &Path,
    json_path: &Path,
    rows: &[RegionStatistics],
) -> Result<(), DataError> {
    write_csv(create(csv_path)?, rows)?;
    write_json(create(json_path)?, rows)
}
