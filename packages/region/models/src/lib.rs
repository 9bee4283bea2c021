#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region, pixel record, and exposure statistics types.
//!
//! These are the plain data types exchanged between the aggregation core
//! and the input/output layers. They carry no behavior beyond small
//! accessors.

use geo::{HasDimensions as _, MultiPolygon};
use serde::{Deserialize, Serialize};

/// An administrative region (a city) with its boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Province name.
    pub province: String,
    /// City name.
    pub city: String,
    /// Boundary polygon(s). `None` when the source feature had no geometry.
    pub geometry: Option<MultiPolygon<f64>>,
}

impl Region {
    /// The boundary, unless it is missing or has no area-bearing parts.
    #[must_use]
    pub fn usable_geometry(&self) -> Option<&MultiPolygon<f64>> {
        self.geometry.as_ref().filter(|g| !g.is_empty())
    }
}

/// One matched pixel: a population sample paired with the pollutant value
/// resolved at the same location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRecord<'a> {
    pub province: &'a str,
    pub city: &'a str,
    /// Longitude of the population pixel center.
    pub lon: f64,
    /// Latitude of the population pixel center.
    pub lat: f64,
    pub population: f64,
    pub pollutant: f64,
    pub year: i32,
}

/// Per-region, per-year exposure statistics.
///
/// Ratios are `0.0` when their denominator is zero; means are `None` when
/// no pixel matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStatistics {
    pub province: String,
    pub city: String,
    pub year: i32,
    /// Pixels with a valid population sample whose center lies in the region.
    pub population_pixels: u64,
    /// Population pixels that also received a pollutant value.
    pub matched_pixels: u64,
    /// `matched_pixels / population_pixels`.
    pub mapping_rate: f64,
    /// Total population over the population pixels.
    pub population_sum: f64,
    /// Total population over the matched pixels.
    pub matched_population: f64,
    /// `matched_population / population_sum`.
    pub population_coverage: f64,
    /// Unweighted mean pollutant value over matched pixels.
    pub pm_mean: Option<f64>,
    /// Population-weighted mean pollutant value over matched pixels.
    pub pm_weighted: Option<f64>,
}

/// Everything produced by aggregating one region for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAggregation<'a> {
    pub statistics: RegionStatistics,
    /// Matched pixels in row-major scan order.
    pub records: Vec<PixelRecord<'a>>,
}
