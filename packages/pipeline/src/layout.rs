//! Output directory layout.
//!
//! ```text
//! <output_dir>/<pollutant_name>/<year>/
//!     year_summary.csv
//!     year_summary.json
//!     <province>/<city>/
//!         stats.json
//!         triple_mapping.csv
//!         triple_mapping.geojsonseq
//! ```

use std::path::{Path, PathBuf};

pub const STATS_JSON: &str = "stats.json";
pub const RECORDS_CSV: &str = "triple_mapping.csv";
pub const RECORDS_GEOJSONSEQ: &str = "triple_mapping.geojsonseq";
pub const SUMMARY_CSV: &str = "year_summary.csv";
pub const SUMMARY_JSON: &str = "year_summary.json";

/// Makes a region name safe to use as a single path component: `/`
/// becomes `-` and spaces are dropped.
#[must_use]
pub fn safe_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ')
        .map(|c| if c == '/' { '-' } else { c })
        .collect()
}

/// Directory holding one pollutant's outputs for one year.
#[must_use]
pub fn year_dir(output_dir: &Path, pollutant_name: &str, year: i32) -> PathBuf {
    output_dir.join(pollutant_name).join(year.to_string())
}

/// Directory holding one region's outputs inside a year directory.
#[must_use]
pub fn region_dir(year_dir: &Path, province: &str, city: &str) -> PathBuf {
    year_dir.join(safe_name(province)).join(safe_name(city))
}

/// Substitutes `year` for every `{year}` in a path template.
#[must_use]
pub fn expand_template(template: &str, year: i32) -> PathBuf {
    PathBuf::from(template.replace("{year}", &year.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_name_replaces_slashes_and_drops_spaces() {
        assert_eq!(safe_name("Inner Mongolia/Hohhot"), "InnerMongolia-Hohhot");
        assert_eq!(safe_name("成都市"), "成都市");
    }

    #[test]
    fn builds_nested_region_dir() {
        let year = year_dir(Path::new("output/mapping"), "pm25", 2015);
        assert_eq!(year, PathBuf::from("output/mapping/pm25/2015"));
        assert_eq!(
            region_dir(&year, "四川省", "A/B C"),
            PathBuf::from("output/mapping/pm25/2015/四川省/A-BC")
        );
    }

    #[test]
    fn expands_every_year_placeholder() {
        assert_eq!(
            expand_template("data/{year}/lsglobal_{year}.asc", 2003),
            PathBuf::from("data/2003/lsglobal_2003.asc")
        );
        assert_eq!(expand_template("fixed.asc", 2003), PathBuf::from("fixed.asc"));
    }
}
