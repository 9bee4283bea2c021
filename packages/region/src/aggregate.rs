//! The per-region scan.

use exposure_map_grid::RasterGrid as _;
use geo::{BoundingRect as _, Contains as _, Point};

use crate::{
    PixelRecord, PollutantSampler, PopulationRaster, Region, RegionAggregation, RegionStatistics,
};

/// Aggregates population and pollutant exposure over one region for one
/// year.
///
/// Returns `None` when the region has no usable geometry. Otherwise every
/// population pixel in the region's bounding window is classified:
///
/// 1. non-positive or no-data population: skipped entirely;
/// 2. pixel center not strictly inside the polygon: skipped entirely;
/// 3. otherwise counted as a population pixel;
/// 4. if the pollutant value resolves, also counted as matched and emitted
///    as a [`PixelRecord`].
///
/// Containment is `geo`'s `Contains`, so pixel centers lying exactly on the
/// polygon boundary are excluded.
#[must_use]
pub fn aggregate<'a>(
    region: &'a Region,
    population: &PopulationRaster,
    pollutant: &PollutantSampler<'_>,
    year: i32,
) -> Option<RegionAggregation<'a>> {
    let geometry = region.usable_geometry()?;
    let bbox = geometry.bounding_rect()?;

    let transform = population.transform();
    let window = transform.window_for_bbox(bbox, population.raster().shape());

    let mut totals = Totals::default();
    let mut records = Vec::new();

    for (row, col) in window.pixels() {
        let Some(pop) = population.valid_sample(row, col) else {
            continue;
        };

        let center = transform.pixel_to_geo(row, col);
        if !geometry.contains(&Point::from(center)) {
            continue;
        }

        totals.add_population(pop);

        let Some(value) = pollutant.sample_at(center.x, center.y) else {
            continue;
        };

        totals.add_match(pop, value);
        records.push(PixelRecord {
            province: &region.province,
            city: &region.city,
            lon: center.x,
            lat: center.y,
            population: pop,
            pollutant: value,
            year,
        });
    }

    log::debug!(
        "{}/{} {year}: scanned {} pixels, {} population, {} matched",
        region.province,
        region.city,
        window.len(),
        totals.population_pixels,
        totals.matched_pixels,
    );

    Some(RegionAggregation {
        statistics: totals.into_statistics(region, year),
        records,
    })
}

#[derive(Debug, Default)]
struct Totals {
    population_pixels: u64,
    matched_pixels: u64,
    population_sum: f64,
    matched_population: f64,
    pollutant_sum: f64,
    weighted_pollutant_sum: f64,
}

impl Totals {
    fn add_population(&mut self, pop: f64) {
        self.population_pixels += 1;
        self.population_sum += pop;
    }

    fn add_match(&mut self, pop: f64, pollutant: f64) {
        self.matched_pixels += 1;
        self.matched_population += pop;
        self.pollutant_sum += pollutant;
        self.weighted_pollutant_sum += pollutant * pop;
    }

    #[allow(clippy::cast_precision_loss)]
    fn into_statistics(self, region: &Region, year: i32) -> RegionStatistics {
        let population_pixels = self.population_pixels as f64;
        let matched_pixels = self.matched_pixels as f64;

        RegionStatistics {
            province: region.province.clone(),
            city: region.city.clone(),
            year,
            population_pixels: self.population_pixels,
            matched_pixels: self.matched_pixels,
            mapping_rate: ratio(matched_pixels, population_pixels).unwrap_or(0.0),
            population_sum: self.population_sum,
            matched_population: self.matched_population,
            population_coverage: ratio(self.matched_population, self.population_sum)
                .unwrap_or(0.0),
            pm_mean: ratio(self.pollutant_sum, matched_pixels),
            pm_weighted: ratio(self.weighted_pollutant_sum, self.matched_population),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}
