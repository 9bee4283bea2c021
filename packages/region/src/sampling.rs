//! Pollutant value resolution at arbitrary geographic points.
//!
//! A point is first mapped to a fractional index on the pollutant grid. If
//! that index falls outside the grid the value is missing outright.
//! Otherwise each [`Interpolation`] in the configured chain is tried in
//! order and the first defined value wins.

use exposure_map_grid::{FractionalIndex, Raster, RasterGrid as _};
use serde::{Deserialize, Serialize};

use crate::PollutantRaster;

/// A way of reading a raster at a fractional index.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Interpolation {
    /// Weighted average of the four surrounding samples.
    ///
    /// Only attempted when a full neighbor cell exists (`row < rows - 1` and
    /// `col < cols - 1`). Undefined if any of the four samples is `NaN`.
    Bilinear,
    /// The sample at the rounded index, clamped to the grid. Undefined only
    /// if that sample is `NaN`.
    Nearest,
}

impl Interpolation {
    /// Bilinear first, falling back to nearest.
    pub const DEFAULT_CHAIN: &'static [Self] = &[Self::Bilinear, Self::Nearest];

    /// Reads `raster` at `at`, or `None` if this strategy has no value there.
    ///
    /// Positions outside the raster are always `None`.
    #[must_use]
    pub fn sample(self, raster: &Raster, at: FractionalIndex) -> Option<f64> {
        if !at.in_bounds(raster.shape()) {
            return None;
        }
        match self {
            Self::Bilinear => bilinear(raster, at),
            Self::Nearest => nearest(raster, at),
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::suboptimal_flops
)]
fn bilinear(raster: &Raster, at: FractionalIndex) -> Option<f64> {
    let shape = raster.shape();
    let last_row = shape.rows.saturating_sub(1) as f64;
    let last_col = shape.cols.saturating_sub(1) as f64;
    if at.row >= last_row || at.col >= last_col {
        return None;
    }

    let (r0, c0) = (at.row.floor() as usize, at.col.floor() as usize);
    let (dr, dc) = (at.row - r0 as f64, at.col - c0 as f64);

    let v00 = raster.get(r0, c0)?;
    let v01 = raster.get(r0, c0 + 1)?;
    let v10 = raster.get(r0 + 1, c0)?;
    let v11 = raster.get(r0 + 1, c0 + 1)?;

    let value = v00 * (1.0 - dr) * (1.0 - dc)
        + v01 * (1.0 - dr) * dc
        + v10 * dr * (1.0 - dc)
        + v11 * dr * dc;

    (!value.is_nan()).then_some(value)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn nearest(raster: &Raster, at: FractionalIndex) -> Option<f64> {
    let shape = raster.shape();
    let row = (at.row.round() as usize).min(shape.rows.saturating_sub(1));
    let col = (at.col.round() as usize).min(shape.cols.saturating_sub(1));

    raster.get(row, col).filter(|value| !value.is_nan())
}

/// Resolves pollutant values at geographic points with an ordered
/// interpolation chain.
#[derive(Debug, Clone, Copy)]
pub struct PollutantSampler<'a> {
    pollutant: &'a PollutantRaster,
    chain: &'a [Interpolation],
}

impl<'a> PollutantSampler<'a> {
    #[must_use]
    pub const fn new(pollutant: &'a PollutantRaster, chain: &'a [Interpolation]) -> Self {
        Self { pollutant, chain }
    }

    /// A sampler using [`Interpolation::DEFAULT_CHAIN`].
    #[must_use]
    pub const fn with_default_chain(pollutant: &'a PollutantRaster) -> Self {
        Self::new(pollutant, Interpolation::DEFAULT_CHAIN)
    }

    /// The pollutant value at (`lon`, `lat`), or `None` if the point is off
    /// the pollutant grid or no strategy yields a value.
    #[must_use]
    pub fn sample_at(&self, lon: f64, lat: f64) -> Option<f64> {
        let raster = self.pollutant.raster();
        let at = self.pollutant.grid().fractional_index(lon, lat);
        if !at.in_bounds(raster.shape()) {
            return None;
        }

        self.chain
            .iter()
            .find_map(|strategy| strategy.sample(raster, at))
    }
}

#[cfg(test)]
mod tests {
    use exposure_map_grid::{AxisGrid, GeoTransform};

    use super::*;

    fn ramp() -> Raster {
        // value = 10 * row + col
        Raster::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![10.0, 11.0, 12.0],
            vec![20.0, 21.0, 22.0],
        ])
        .unwrap()
    }

    fn ramp_pollutant() -> PollutantRaster {
        let axes = AxisGrid::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();
        PollutantRaster::new(ramp(), axes).unwrap()
    }

    #[test]
    fn bilinear_interpolates_inside_a_cell() {
        let value = Interpolation::Bilinear
            .sample(&ramp(), FractionalIndex { row: 0.5, col: 1.25 })
            .unwrap();
        assert!((value - 6.25).abs() < 1e-12);
    }

    #[test]
    fn bilinear_not_attempted_on_last_row_or_col() {
        let raster = ramp();
        assert_eq!(
            Interpolation::Bilinear.sample(&raster, FractionalIndex { row: 2.0, col: 0.5 }),
            None
        );
        assert_eq!(
            Interpolation::Bilinear.sample(&raster, FractionalIndex { row: 0.5, col: 2.0 }),
            None
        );
    }

    #[test]
    fn bilinear_undefined_next_to_nan() {
        let mut raster = ramp();
        raster.set(1, 1, f64::NAN);
        assert_eq!(
            Interpolation::Bilinear.sample(&raster, FractionalIndex { row: 0.5, col: 0.5 }),
            None
        );
    }

    #[test]
    fn nearest_rounds_and_clamps() {
        let raster = ramp();
        assert_eq!(
            Interpolation::Nearest.sample(&raster, FractionalIndex { row: 0.4, col: 1.6 }),
            Some(2.0)
        );
        assert_eq!(
            Interpolation::Nearest.sample(&raster, FractionalIndex { row: 2.9, col: 2.9 }),
            Some(22.0)
        );
    }

    #[test]
    fn nearest_undefined_on_nan_sample() {
        let mut raster = ramp();
        raster.set(0, 0, f64::NAN);
        assert_eq!(
            Interpolation::Nearest.sample(&raster, FractionalIndex { row: 0.1, col: 0.1 }),
            None
        );
    }

    #[test]
    fn out_of_bounds_is_undefined_for_every_strategy() {
        let raster = ramp();
        for strategy in Interpolation::DEFAULT_CHAIN {
            assert_eq!(
                strategy.sample(&raster, FractionalIndex { row: -0.5, col: 1.0 }),
                None
            );
            assert_eq!(
                strategy.sample(&raster, FractionalIndex { row: 1.0, col: 3.0 }),
                None
            );
        }
    }

    #[test]
    fn last_row_and_col_resolve_through_nearest() {
        let pollutant = ramp_pollutant();
        let sampler = PollutantSampler::with_default_chain(&pollutant);
        // fractional index exactly (rows - 1, cols - 1)
        assert_eq!(sampler.sample_at(2.0, 2.0), Some(22.0));
    }

    #[test]
    fn sampler_prefers_bilinear() {
        let pollutant = ramp_pollutant();
        let sampler = PollutantSampler::with_default_chain(&pollutant);
        let value = sampler.sample_at(0.5, 0.5).unwrap();
        assert!((value - 5.5).abs() < 1e-12);
    }

    #[test]
    fn sampler_falls_back_to_nearest_next_to_nan() {
        let axes = AxisGrid::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();
        let mut raster = ramp();
        raster.set(1, 1, f64::NAN);
        let pollutant = PollutantRaster::new(raster, axes).unwrap();
        let sampler = PollutantSampler::with_default_chain(&pollutant);

        assert_eq!(sampler.sample_at(0.3, 0.2), Some(0.0));
    }

    #[test]
    fn sampler_off_grid_is_missing() {
        let pollutant = ramp_pollutant();
        let sampler = PollutantSampler::with_default_chain(&pollutant);
        assert_eq!(sampler.sample_at(-0.1, 1.0), None);
        assert_eq!(sampler.sample_at(1.0, 3.0), None);
    }

    /// 2x2 raster of 2 degree pixels anchored at (100, 10); centers at
    /// lon 101/103 and lat 9/7.
    fn transform_pollutant() -> PollutantRaster {
        let transform = GeoTransform::new(100.0, 10.0, 2.0, 2.0).unwrap();
        let raster = Raster::from_rows(vec![vec![10.0, 20.0], vec![30.0, 40.0]]).unwrap();
        PollutantRaster::new(raster, transform).unwrap()
    }

    #[test]
    fn transform_grid_resolves_centers_and_between() {
        let pollutant = transform_pollutant();
        let sampler = PollutantSampler::with_default_chain(&pollutant);

        assert_eq!(sampler.sample_at(101.0, 9.0), Some(10.0));
        assert_eq!(sampler.sample_at(103.0, 7.0), Some(40.0));
        let value = sampler.sample_at(102.0, 8.0).unwrap();
        assert!((value - 25.0).abs() < 1e-12);
        // south-east half pixel band clamps through nearest
        assert_eq!(sampler.sample_at(103.8, 6.2), Some(40.0));
    }

    #[test]
    fn transform_grid_west_and_north_edge_band_is_missing() {
        let pollutant = transform_pollutant();
        let sampler = PollutantSampler::with_default_chain(&pollutant);

        // inside the raster extent but before the first pixel center
        assert_eq!(sampler.sample_at(100.4, 8.0), None);
        assert_eq!(sampler.sample_at(102.0, 9.8), None);
        assert_eq!(sampler.sample_at(100.2, 9.9), None);
        assert_eq!(sampler.sample_at(99.0, 8.0), None);
    }

    #[test]
    fn nearest_only_chain_skips_bilinear() {
        let pollutant = ramp_pollutant();
        let sampler = PollutantSampler::new(&pollutant, &[Interpolation::Nearest]);
        assert_eq!(sampler.sample_at(0.4, 0.6), Some(10.0));
    }

    #[test]
    fn empty_chain_never_matches() {
        let pollutant = ramp_pollutant();
        let sampler = PollutantSampler::new(&pollutant, &[]);
        assert_eq!(sampler.sample_at(1.0, 1.0), None);
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!(
            "bilinear".parse::<Interpolation>().unwrap(),
            Interpolation::Bilinear
        );
        assert_eq!(
            "Nearest".parse::<Interpolation>().unwrap(),
            Interpolation::Nearest
        );
        assert!("cubic".parse::<Interpolation>().is_err());
        assert_eq!(Interpolation::Bilinear.to_string(), "bilinear");
    }

    #[test]
    fn deserializes_lowercase_names() {
        let chain: Vec<Interpolation> = serde_json::from_str(r#"["nearest","bilinear"]"#).unwrap();
        assert_eq!(chain, vec![Interpolation::Nearest, Interpolation::Bilinear]);
    }
}
