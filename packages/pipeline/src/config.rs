//! Pipeline configuration and year-range parsing.

use std::path::{Path, PathBuf};

use exposure_map_io::regions::RegionFields;
use exposure_map_region::Interpolation;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Everything the driver needs to process a range of years.
///
/// Loaded from TOML; every key is optional and falls back to
/// [`PipelineConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Years to process: `2000`, `2000-2021`, or `2000,2005,2010`.
    pub years: String,
    /// Population raster path with a `{year}` placeholder.
    pub population_template: String,
    /// Pollutant raster path with a `{year}` placeholder.
    pub pollutant_template: String,
    /// Variable to read from JSON axis-grid pollutant files.
    pub pollutant_var: String,
    /// Name used for the output directory (e.g. `pm25`, `ozone`).
    pub pollutant_name: String,
    /// `GeoJSON` feature collection of region boundaries.
    pub regions: PathBuf,
    /// Feature property holding the province name.
    pub province_field: String,
    /// Feature property holding the city name.
    pub city_field: String,
    /// Output root.
    pub output_dir: PathBuf,
    /// Population no-data sentinel. When unset, the raster header's value
    /// is used, then the `LandScan` default.
    pub population_nodata: Option<f64>,
    /// Pollutant resolution strategies, tried in order.
    pub interpolation: Vec<Interpolation>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            years: "2000-2021".to_string(),
            population_template: "data/population/lsglobal_{year}.tif".to_string(),
            pollutant_template: "data/pollutant/pm25_{year}.json".to_string(),
            pollutant_var: "PM2.5".to_string(),
            pollutant_name: "pm25".to_string(),
            regions: PathBuf::from("data/regions/cities.geojson"),
            province_field: "省".to_string(),
            city_field: "市".to_string(),
            output_dir: PathBuf::from("output/mapping"),
            population_nodata: None,
            interpolation: Interpolation::DEFAULT_CHAIN.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Parses a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ConfigEncode`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, PipelineError> {
        Ok(toml::to_string(self)?)
    }

    #[must_use]
    pub fn region_fields(&self) -> RegionFields {
        RegionFields {
            province: self.province_field.clone(),
            city: self.city_field.clone(),
        }
    }
}

/// Expands a year specification into the list of years it names.
///
/// Accepts a single year (`2010`), an inclusive range (`2000-2021`), or a
/// comma-separated list (`2000,2005,2010`). Whitespace around tokens is
/// ignored.
///
/// # Errors
///
/// Returns [`PipelineError::Years`] for unparseable tokens or a range whose
/// end precedes its start.
pub fn parse_years(spec: &str) -> Result<Vec<i32>, PipelineError> {
    let spec = spec.trim();
    let invalid = |message: String| PipelineError::Years {
        spec: spec.to_string(),
        message,
    };
    let year = |token: &str| {
        token
            .trim()
            .parse::<i32>()
            .map_err(|_| invalid(format!("'{}' is not a year", token.trim())))
    };

    if let Some((start, end)) = spec.split_once('-') {
        let (start, end) = (year(start)?, year(end)?);
        if end < start {
            return Err(invalid(format!("range ends ({end}) before it starts ({start})")));
        }
        return Ok((start..=end).collect());
    }

    if spec.contains(',') {
        return spec.split(',').map(year).collect();
    }

    Ok(vec![year(spec)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_year() {
        assert_eq!(parse_years("2010").unwrap(), vec![2010]);
        assert_eq!(parse_years(" 2010 ").unwrap(), vec![2010]);
    }

    #[test]
    fn parses_inclusive_range() {
        assert_eq!(parse_years("2000-2003").unwrap(), vec![2000, 2001, 2002, 2003]);
        assert_eq!(parse_years("2005-2005").unwrap(), vec![2005]);
    }

    #[test]
    fn parses_list() {
        assert_eq!(parse_years("2000, 2005,2010").unwrap(), vec![2000, 2005, 2010]);
    }

    #[test]
    fn rejects_backwards_range() {
        let err = parse_years("2010-2000").unwrap_err();
        assert!(matches!(err, PipelineError::Years { .. }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_years("twenty").is_err());
        assert!(parse_years("2000,x").is_err());
        assert!(parse_years("2000-").is_err());
        assert!(parse_years("").is_err());
    }

    #[test]
    fn empty_toml_yields_defaults() {
        assert_eq!(
            PipelineConfig::from_toml_str("").unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn toml_overrides_selected_keys() {
        let config = PipelineConfig::from_toml_str(
            r#"
            years = "2015"
            pollutant_name = "ozone"
            pollutant_var = "O3"
            population_nodata = -9999.0
            interpolation = ["nearest"]
            "#,
        )
        .unwrap();

        assert_eq!(config.years, "2015");
        assert_eq!(config.pollutant_name, "ozone");
        assert_eq!(config.population_nodata, Some(-9999.0));
        assert_eq!(config.interpolation, vec![Interpolation::Nearest]);
        assert_eq!(config.city_field, "市");
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            PipelineConfig::from_toml_str("colour = \"red\""),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn toml_rendering_parses_back() {
        let config = PipelineConfig {
            population_nodata: Some(-1.0),
            ..PipelineConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }
}
