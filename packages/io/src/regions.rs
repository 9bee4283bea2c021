//! City boundary decoding from `GeoJSON`.

use std::path::Path;

use exposure_map_region_models::Region;
use geo::MultiPolygon;
use geojson::{Feature, GeoJson};

use crate::DataError;

/// Names of the feature properties holding the region identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFields {
    pub province: String,
    pub city: String,
}

/// Reads regions from a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns [`DataError`] if the file cannot be read or is not a feature
/// collection.
pub fn read(path: &Path, fields: &RegionFields) -> Result<Vec<Region>, DataError> {
    let text = std::fs::read_to_string(path)?;
    let regions = parse(&text, fields)?;
    log::info!("Loaded {} regions from {}", regions.len(), path.display());
    Ok(regions)
}

/// Decodes regions from `GeoJSON` text.
///
/// Features without a province or city name are skipped. Features whose
/// geometry is `null` or not polygonal are kept with no geometry, so the
/// aggregator reports them as unusable instead of silently dropping them
/// here.
///
/// # Errors
///
/// Returns [`DataError`] if the text is not `GeoJSON` or not a feature
/// collection.
pub fn parse(text: &str, fields: &RegionFields) -> Result<Vec<Region>, DataError> {
    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(DataError::format("Regions must be a GeoJSON FeatureCollection"));
    };

    Ok(collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| region_from_feature(index, feature, fields))
        .collect())
}

fn region_from_feature(index: usize, feature: Feature, fields: &RegionFields) -> Option<Region> {
    let (Some(province), Some(city)) = (
        property_string(&feature, &fields.province),
        property_string(&feature, &fields.city),
    ) else {
        log::warn!(
            "Skipping feature {index}: missing {} or {} property",
            fields.province,
            fields.city
        );
        return None;
    };

    let geometry = feature.geometry.and_then(|geometry| {
        match geo::Geometry::<f64>::try_from(geometry) {
            Ok(geo::Geometry::Polygon(polygon)) => Some(MultiPolygon(vec![polygon])),
            Ok(geo::Geometry::MultiPolygon(multi)) => Some(multi),
            Ok(_) => {
                log::warn!("{province}/{city}: geometry is not polygonal");
                None
            }
            Err(e) => {
                log::warn!("{province}/{city}: invalid geometry: {e}");
                None
            }
        }
    });

    Some(Region {
        province,
        city,
        geometry,
    })
}

/// A property as a trimmed non-empty string. Numbers are formatted.
fn property_string(feature: &Feature, name: &str) -> Option<String> {
    let value = feature.property(name)?;
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> RegionFields {
        RegionFields {
            province: "省".to_string(),
            city: "市".to_string(),
        }
    }

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"省": "四川省", "市": "成都市"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[103.0, 30.0], [105.0, 30.0], [105.0, 31.5], [103.0, 30.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"省": "海南省", "市": "三沙市"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[111.0, 16.0], [112.0, 16.0], [112.0, 17.0], [111.0, 16.0]]],
                        [[[113.0, 9.0], [114.0, 9.0], [114.0, 10.0], [113.0, 9.0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {"省": "台湾省", "市": "台北市"},
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": {"省": "河北省"},
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": {"省": "北京市", "市": "北京市"},
                "geometry": {"type": "Point", "coordinates": [116.4, 39.9]}
            }
        ]
    }"#;

    #[test]
    fn decodes_polygons_and_multipolygons() {
        let regions = parse(COLLECTION, &fields()).unwrap();
        assert_eq!(regions.len(), 4);

        assert_eq!(regions[0].province, "四川省");
        assert_eq!(regions[0].city, "成都市");
        assert_eq!(regions[0].geometry.as_ref().unwrap().0.len(), 1);

        assert_eq!(regions[1].geometry.as_ref().unwrap().0.len(), 2);
    }

    #[test]
    fn keeps_null_and_non_polygonal_geometry_as_missing() {
        let regions = parse(COLLECTION, &fields()).unwrap();
        assert_eq!(regions[2].city, "台北市");
        assert!(regions[2].geometry.is_none());
        assert_eq!(regions[3].city, "北京市");
        assert!(regions[3].geometry.is_none());
    }

    #[test]
    fn skips_features_without_names() {
        let regions = parse(COLLECTION, &fields()).unwrap();
        assert!(regions.iter().all(|r| r.province != "河北省"));
    }

    #[test]
    fn numeric_properties_become_names() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"prov": 51, "code": 510100},
                "geometry": null
            }]
        }"#;
        let fields = RegionFields {
            province: "prov".to_string(),
            city: "code".to_string(),
        };
        let regions = parse(text, &fields).unwrap();
        assert_eq!(regions[0].province, "51");
        assert_eq!(regions[0].city, "510100");
    }

    #[test]
    fn rejects_bare_geometry() {
        let text = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        assert!(matches!(
            parse(text, &fields()),
            Err(DataError::Format { .. })
        ));
    }
}
