//! Single-band `GeoTIFF` decoding.
//!
//! Georeferencing comes from the `ModelTiepoint` (33922) and
//! `ModelPixelScale` (33550) tags, the pair written by GDAL for north-up
//! rasters such as `LandScan`. A `GDAL_NODATA` (42113) ASCII tag, when
//! present, supplies the no-data value.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use exposure_map_grid::{GeoTransform, GridShape, Raster};
use exposure_map_region::{LANDSCAN_NODATA, PollutantRaster, PopulationRaster};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

use crate::DataError;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GDAL_NODATA: u16 = 42113;

/// A decoded `GeoTIFF` band with its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiff {
    pub transform: GeoTransform,
    pub nodata: Option<f64>,
    pub raster: Raster,
}

impl GeoTiff {
    /// Interprets the band as population counts.
    ///
    /// The no-data sentinel is `nodata` if given, else the file's
    /// `GDAL_NODATA` tag, else [`LANDSCAN_NODATA`].
    #[must_use]
    pub fn into_population(self, nodata: Option<f64>) -> PopulationRaster {
        let nodata = nodata.or(self.nodata).unwrap_or(LANDSCAN_NODATA);
        PopulationRaster::new(self.raster, self.transform, nodata)
    }

    /// Interprets the band as pollutant concentrations, with no-data samples
    /// replaced by `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Grid`] if the raster cannot be rebuilt.
    pub fn into_pollutant(self) -> Result<PollutantRaster, DataError> {
        let raster = crate::nodata_to_nan(&self.raster, self.nodata)?;
        PollutantRaster::new(raster, self.transform).map_err(Into::into)
    }
}

/// Reads and decodes a `GeoTIFF` file.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or lacks
/// georeferencing.
pub fn read(path: &Path) -> Result<GeoTiff, DataError> {
    let file = File::open(path)?;
    let tiff = decode(BufReader::new(file))?;
    log::debug!(
        "Read {} GeoTIFF from {}",
        tiff.raster.shape(),
        path.display()
    );
    Ok(tiff)
}

/// Decodes the first image of a `GeoTIFF` stream.
///
/// # Errors
///
/// Returns [`DataError::Tiff`] for undecodable images and
/// [`DataError::Format`] for missing or malformed georeferencing tags or an
/// unsupported sample type.
pub fn decode<R: Read + Seek>(reader: R) -> Result<GeoTiff, DataError> {
    // global population rasters exceed the default decoding buffer limit
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE))?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT))?;
    let nodata = match decoder.find_tag(Tag::from_u16_exhaustive(GDAL_NODATA))? {
        Some(value) => parse_nodata(&value.into_string()?)?,
        None => None,
    };

    let transform = transform_from_tags(&scale, &tiepoint)?;
    let values = samples_to_f64(decoder.read_image()?)?;
    let shape = GridShape::new(height as usize, width as usize);

    Ok(GeoTiff {
        transform,
        nodata,
        raster: Raster::new(shape, values)?,
    })
}

/// Builds the north-west anchored transform from the pixel scale
/// `[sx, sy, sz]` and the first tiepoint `[i, j, k, x, y, z]`.
#[allow(clippy::suboptimal_flops)]
fn transform_from_tags(scale: &[f64], tiepoint: &[f64]) -> Result<GeoTransform, DataError> {
    let [res_lon, res_lat, ..] = scale else {
        return Err(DataError::format(format!(
            "ModelPixelScale needs at least 2 values, got {}",
            scale.len()
        )));
    };
    let [i, j, _, x, y, ..] = tiepoint else {
        return Err(DataError::format(format!(
            "ModelTiepoint needs at least 5 values, got {}",
            tiepoint.len()
        )));
    };

    GeoTransform::new(x - i * res_lon, y + j * res_lat, *res_lon, *res_lat).map_err(Into::into)
}

fn parse_nodata(text: &str) -> Result<Option<f64>, DataError> {
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|_| DataError::format(format!("Invalid GDAL_NODATA: {text}")))
}

fn samples_to_f64(samples: DecodingResult) -> Result<Vec<f64>, DataError> {
    Ok(match samples {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        _ => return Err(DataError::format("Unsupported GeoTIFF sample type")),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use exposure_map_grid::RasterGrid as _;
    use tiff::encoder::{TiffEncoder, colortype};

    use super::*;

    /// 4x2 `Int32` raster anchored at (100, 10) with 1 degree pixels.
    fn landscan_like(nodata: Option<&str>) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        let mut encoder = TiffEncoder::new(&mut bytes).unwrap();
        let mut image = encoder.new_image::<colortype::GrayI32>(4, 2).unwrap();
        image
            .encoder()
            .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &[1.0_f64, 1.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(
                Tag::Unknown(MODEL_TIEPOINT),
                &[0.0_f64, 0.0, 0.0, 100.0, 10.0, 0.0][..],
            )
            .unwrap();
        if let Some(nodata) = nodata {
            image
                .encoder()
                .write_tag(Tag::Unknown(GDAL_NODATA), nodata)
                .unwrap();
        }
        image
            .write_data(&[-2_147_483_647, 10, 20, 30, 40, 50, 60, 0])
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn decodes_samples_and_georeferencing() {
        let tiff = decode(Cursor::new(landscan_like(None))).unwrap();
        assert_eq!(tiff.raster.shape(), GridShape::new(2, 4));
        assert_eq!(tiff.raster.get(1, 2), Some(60.0));
        assert_eq!(tiff.nodata, None);

        let center = tiff.transform.pixel_to_geo(0, 0);
        assert!((center.x - 100.5).abs() < 1e-12);
        assert!((center.y - 9.5).abs() < 1e-12);
    }

    #[test]
    fn population_falls_back_to_landscan_sentinel() {
        let population = decode(Cursor::new(landscan_like(None)))
            .unwrap()
            .into_population(None);
        assert!((population.nodata() - LANDSCAN_NODATA).abs() < f64::EPSILON);
        assert_eq!(population.valid_sample(0, 0), None);
        assert_eq!(population.valid_sample(0, 1), Some(10.0));
    }

    #[test]
    fn gdal_nodata_tag_sets_sentinel() {
        let tiff = decode(Cursor::new(landscan_like(Some("50")))).unwrap();
        assert_eq!(tiff.nodata, Some(50.0));

        let population = tiff.clone().into_population(None);
        assert_eq!(population.valid_sample(1, 1), None);

        let pollutant = tiff.into_pollutant().unwrap();
        assert!(pollutant.raster().get(1, 1).unwrap().is_nan());
        assert_eq!(pollutant.raster().get(1, 0), Some(40.0));
    }

    #[test]
    fn tiepoint_offset_moves_origin() {
        let transform =
            transform_from_tags(&[0.5, 0.25, 0.0], &[2.0, 4.0, 0.0, 101.0, 9.0, 0.0]).unwrap();
        assert!((transform.origin_lon() - 100.0).abs() < 1e-12);
        assert!((transform.origin_lat_max() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_short_tags() {
        assert!(matches!(
            transform_from_tags(&[1.0], &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0]),
            Err(DataError::Format { .. })
        ));
        assert!(matches!(
            transform_from_tags(&[1.0, 1.0, 0.0], &[0.0, 0.0]),
            Err(DataError::Format { .. })
        ));
    }

    #[test]
    fn rejects_plain_tiff_without_georeferencing() {
        let mut bytes = Cursor::new(Vec::new());
        TiffEncoder::new(&mut bytes)
            .unwrap()
            .write_image::<colortype::Gray8>(2, 1, &[1, 2])
            .unwrap();
        assert!(decode(Cursor::new(bytes.into_inner())).is_err());
    }
}
