use std::{fs, io, path::Path};

use super::feature::{Feature, FeatureCollection, FeatureMap, PropertyValue};
use super::{ConversionError, LoadError};

/// Parse GeoJSON text into a [`FeatureCollection`].
///
/// Accepts a top-level FeatureCollection, a single Feature, or a bare
/// Geometry, which is what drawing widgets and hand-written files produce.
pub fn read_features_from_geojson_str(contents: &str) -> Result<FeatureCollection, LoadError> {
    let geojson_contents = contents.parse::<geojson::GeoJson>()?;
    Ok(features_from_geojson(geojson_contents)?)
}

/// Convert parsed GeoJSON into a [`FeatureCollection`]. The loader and the
/// edit capture share this path, so captured drawings end up in the exact
/// representation loaded files do.
pub fn features_from_geojson(
    geojson_contents: geojson::GeoJson,
) -> Result<FeatureCollection, ConversionError> {
    match geojson_contents {
        geojson::GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .map(feature_from_geojson)
            .collect(),
        geojson::GeoJson::Feature(feature) => {
            Ok(FeatureCollection::from(vec![feature_from_geojson(feature)?]))
        }
        geojson::GeoJson::Geometry(geometry) => {
            let geometry = convert_geometry(geometry)?;
            Ok(FeatureCollection::from(vec![Feature::from(geometry)]))
        }
    }
}

/// Convert a raw JSON value, as sent by the drawing toolbar, into features.
pub fn features_from_json_value(
    value: geojson::JsonValue,
) -> Result<FeatureCollection, ConversionError> {
    let geojson_contents =
        geojson::GeoJson::from_json_value(value).map_err(ConversionError::InvalidGeojson)?;
    features_from_geojson(geojson_contents)
}

fn feature_from_geojson(feature: geojson::Feature) -> Result<Feature, ConversionError> {
    let geometry = feature.geometry.ok_or(ConversionError::MissingGeometry)?;
    Ok(Feature {
        geometry: convert_geometry(geometry)?,
        properties: feature.properties.map(properties_from_json),
    })
}

fn convert_geometry(geometry: geojson::Geometry) -> Result<geo::Geometry, ConversionError> {
    geo::Geometry::try_from(geometry)
        .map_err(|error| ConversionError::UnsupportedGeometry(error.to_string()))
}

fn properties_from_json(object: geojson::JsonObject) -> FeatureMap {
    object
        .into_iter()
        .map(|(name, value)| (name, property_from_json(value)))
        .collect()
}

fn property_from_json(value: geojson::JsonValue) -> PropertyValue {
    match value {
        geojson::JsonValue::Null => PropertyValue::Null,
        geojson::JsonValue::Bool(value) => PropertyValue::Bool(value),
        geojson::JsonValue::Number(number) => match number.as_i64() {
            Some(value) => PropertyValue::Int(value),
            None => match number.as_f64() {
                Some(value) => PropertyValue::Float(value),
                None => PropertyValue::String(number.to_string()),
            },
        },
        geojson::JsonValue::String(value) => PropertyValue::String(value),
        other => {
            // Property bags are scalar-only; nested values are kept as JSON text.
            log::warn!("Flattening non-scalar property value {} to text", other);
            PropertyValue::String(other.to_string())
        }
    }
}

/// Serialize features to a GeoJSON file.
pub fn write_features_to_geojson(
    features: &FeatureCollection,
    output_filepath: &Path,
) -> io::Result<()> {
    let feature_collection = features_to_geojson(features);
    let geojson_contents = geojson::GeoJson::from(feature_collection);
    fs::write(output_filepath, geojson_contents.to_string())
}

/// Convert features into their GeoJSON representation, used both for the map
/// overlay and for the exported file.
pub fn features_to_geojson(features: &FeatureCollection) -> geojson::FeatureCollection {
    features.iter().map(feature_to_geojson).collect()
}

fn feature_to_geojson(feature: &Feature) -> geojson::Feature {
    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &feature.geometry,
        ))),
        id: None,
        properties: feature.properties.as_ref().map(properties_to_json),
        foreign_members: None,
    }
}

fn properties_to_json(properties: &FeatureMap) -> geojson::JsonObject {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), property_to_json(value)))
        .collect()
}

fn property_to_json(value: &PropertyValue) -> geojson::JsonValue {
    match value {
        PropertyValue::Null => geojson::JsonValue::Null,
        PropertyValue::Bool(value) => geojson::JsonValue::Bool(*value),
        PropertyValue::Int(value) => geojson::JsonValue::from(*value),
        PropertyValue::Float(value) => geojson::JsonValue::from(*value),
        PropertyValue::String(value) => geojson::JsonValue::String(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testdir::testdir;

    use crate::geofile::feature::{Feature, FeatureCollection, FeatureMap, PropertyValue};
    use crate::geofile::{ConversionError, LoadError};

    use super::{read_features_from_geojson_str, write_features_to_geojson};

    const ROADS_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[-73.97, 40.78], [-73.96, 40.79]]},
                "properties": {"name": "Broadway", "lanes": 4, "oneway": false, "surface": null}
            },
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[-73.99, 40.73], [-73.98, 40.74]]},
                "properties": {"name": "Bowery", "lanes": 2, "oneway": true, "surface": null}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-73.985, 40.758]},
                "properties": {"name": "Times Square", "rating": 4.5}
            }
        ]
    }"#;

    #[test]
    fn test_read_preserves_feature_count_and_properties() {
        let collection = read_features_from_geojson_str(ROADS_GEOJSON).unwrap();
        assert_eq!(3, collection.len());

        let broadway = collection.features.first().unwrap();
        let properties = broadway.properties.as_ref().unwrap();
        assert_eq!(
            Some(&PropertyValue::String("Broadway".to_string())),
            properties.get("name")
        );
        assert_eq!(Some(&PropertyValue::Int(4)), properties.get("lanes"));
        assert_eq!(Some(&PropertyValue::Bool(false)), properties.get("oneway"));
        assert_eq!(Some(&PropertyValue::Null), properties.get("surface"));

        let times_square = collection.features.get(2).unwrap();
        assert!(matches!(times_square.geometry, geo::Geometry::Point(_)));
        assert_eq!(
            Some(&PropertyValue::Float(4.5)),
            times_square.properties.as_ref().unwrap().get("rating")
        );
    }

    #[rstest]
    #[case::not_json("just some text, not a vector file")]
    #[case::empty("")]
    #[case::corrupt_coordinates(
        r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": "oops"}, "properties": null}"#
    )]
    fn test_invalid_contents_are_a_load_error(#[case] contents: &str) {
        let result = read_features_from_geojson_str(contents);
        assert!(matches!(result, Err(LoadError::InvalidGeojson(_))));
    }

    #[test]
    fn test_feature_without_geometry_is_rejected() {
        let contents = r#"{"type": "Feature", "geometry": null, "properties": {"name": "ghost"}}"#;
        let result = read_features_from_geojson_str(contents);
        assert!(matches!(
            result,
            Err(LoadError::Conversion(ConversionError::MissingGeometry))
        ));
    }

    #[rstest]
    #[case::single_feature(
        r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.0, 48.0]}, "properties": {"name": "spot"}}"#
    )]
    #[case::bare_geometry(r#"{"type": "Point", "coordinates": [2.0, 48.0]}"#)]
    fn test_single_feature_and_bare_geometry_are_accepted(#[case] contents: &str) {
        let collection = read_features_from_geojson_str(contents).unwrap();
        assert_eq!(1, collection.len());
        let feature = collection.features.first().unwrap();
        assert!(matches!(feature.geometry, geo::Geometry::Point(_)));
    }

    #[test]
    fn test_written_features_read_back_identically() {
        let features = FeatureCollection::from(vec![
            Feature {
                geometry: geo::Geometry::Point(geo::Point::new(-73.97, 40.78)),
                properties: Some(FeatureMap::from([
                    (
                        "name".to_string(),
                        PropertyValue::String("depot".to_string()),
                    ),
                    ("capacity".to_string(), PropertyValue::Int(120)),
                    ("open".to_string(), PropertyValue::Bool(true)),
                    ("grade".to_string(), PropertyValue::Float(2.5)),
                    ("note".to_string(), PropertyValue::Null),
                ])),
            },
            Feature::from(geo::Geometry::LineString(geo::LineString::from(vec![
                (0.0, 0.0),
                (1.0, 1.0),
            ]))),
        ]);

        let test_dir = testdir!();
        let geojson_filepath = test_dir.join("round_trip.geojson");
        write_features_to_geojson(&features, &geojson_filepath).unwrap();

        let contents = std::fs::read_to_string(&geojson_filepath).unwrap();
        let read_back = read_features_from_geojson_str(&contents).unwrap();
        assert_eq!(features, read_back);
    }
}
