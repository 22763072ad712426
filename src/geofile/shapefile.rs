use std::io::Cursor;
use std::path::Path;

use super::feature::{Feature, FeatureCollection, FeatureMap, PropertyValue};
use super::{ConversionError, LoadError};

/// Read a shapefile from disk. When a sibling .dbf table exists its fields
/// become the feature properties, otherwise features come back with bare
/// geometries.
pub fn read_features_from_shapefile(path: &Path) -> Result<FeatureCollection, LoadError> {
    if path.with_extension("dbf").exists() {
        let features = shapefile::read(path)?
            .into_iter()
            .map(|(shape, record)| {
                Ok(Feature {
                    geometry: shape_to_geometry(shape)?,
                    properties: Some(record_to_properties(record)),
                })
            })
            .collect::<Result<FeatureCollection, ConversionError>>()?;
        Ok(features)
    } else {
        log::info!(
            "No attribute table next to {:?}, reading bare geometries",
            path
        );
        let shapes = shapefile::read_shapes(path)?;
        Ok(features_from_shapes(shapes)?)
    }
}

/// Read a shapefile from an uploaded .shp payload. An attribute table cannot
/// ride along a single-file upload, so properties are always empty.
pub fn read_features_from_shapefile_bytes(bytes: &[u8]) -> Result<FeatureCollection, LoadError> {
    let reader = shapefile::ShapeReader::new(Cursor::new(bytes))?;
    let shapes = reader.read()?;
    Ok(features_from_shapes(shapes)?)
}

fn features_from_shapes(
    shapes: Vec<shapefile::Shape>,
) -> Result<FeatureCollection, ConversionError> {
    shapes
        .into_iter()
        .map(|shape| Ok(Feature::from(shape_to_geometry(shape)?)))
        .collect()
}

fn shape_to_geometry(shape: shapefile::Shape) -> Result<geo::Geometry, ConversionError> {
    geo::Geometry::try_from(shape)
        .map_err(|error| ConversionError::UnsupportedGeometry(error.to_string()))
}

fn record_to_properties(record: shapefile::dbase::Record) -> FeatureMap {
    record
        .into_iter()
        .map(|(name, value)| (name, field_value_to_property(value)))
        .collect()
}

fn field_value_to_property(value: shapefile::dbase::FieldValue) -> PropertyValue {
    match value {
        shapefile::dbase::FieldValue::Character(value) => {
            value.map_or(PropertyValue::Null, PropertyValue::String)
        }
        shapefile::dbase::FieldValue::Numeric(value) => {
            value.map_or(PropertyValue::Null, PropertyValue::Float)
        }
        shapefile::dbase::FieldValue::Float(value) => {
            value.map_or(PropertyValue::Null, |value| {
                PropertyValue::Float(f64::from(value))
            })
        }
        shapefile::dbase::FieldValue::Integer(value) => PropertyValue::Int(i64::from(value)),
        shapefile::dbase::FieldValue::Logical(value) => {
            value.map_or(PropertyValue::Null, PropertyValue::Bool)
        }
        // Dates and the FoxPro-only field types are not worth a dedicated
        // scalar, keep them readable as text.
        other => PropertyValue::String(format!("{:?}", other)),
    }
}
