//! Command-line overrides for [`PipelineConfig`].

use std::path::PathBuf;

use clap::Args;
use exposure_map_pipeline::PipelineConfig;
use exposure_map_region::Interpolation;

/// Flags mirroring the configuration file keys. Any flag given replaces the
/// corresponding file (or default) value. All flags are global, so they may
/// appear before or after the subcommand.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// Years: 2000, 2000-2021, or 2000,2005,2010
    #[arg(long, global = true)]
    pub years: Option<String>,
    /// Population raster path template containing `{year}`
    #[arg(long, global = true)]
    pub population_template: Option<String>,
    /// Pollutant raster path template containing `{year}`
    #[arg(long, global = true)]
    pub pollutant_template: Option<String>,
    /// Variable name inside JSON pollutant files (e.g. "PM2.5", "O3")
    #[arg(long, global = true)]
    pub pollutant_var: Option<String>,
    /// Pollutant name used for the output directory (e.g. "pm25", "ozone")
    #[arg(long, global = true)]
    pub pollutant_name: Option<String>,
    /// Region boundaries (`GeoJSON` feature collection)
    #[arg(long, global = true)]
    pub regions: Option<PathBuf>,
    /// Feature property holding the province name
    #[arg(long, global = true)]
    pub province_field: Option<String>,
    /// Feature property holding the city name
    #[arg(long, global = true)]
    pub city_field: Option<String>,
    /// Output root directory
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
    /// Population no-data value (overrides the raster header)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub population_nodata: Option<f64>,
    /// Comma-separated pollutant resolution strategies, tried in order
    #[arg(long, global = true, value_delimiter = ',')]
    pub interpolation: Option<Vec<Interpolation>>,
}

impl ConfigArgs {
    /// Writes every flag that was given into `config`.
    pub fn apply(self, config: &mut PipelineConfig) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    config.$field = value;
                })*
            };
        }

        set!(
            years,
            population_template,
            pollutant_template,
            pollutant_var,
            pollutant_name,
            regions,
            province_field,
            city_field,
            output_dir,
            interpolation,
        );

        if let Some(nodata) = self.population_nodata {
            config.population_nodata = Some(nodata);
        }
    }
}
