use std::path::Path;

use super::feature::FeatureCollection;
use super::{geojson, shapefile, LoadError};

/// Vector file formats the editor can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeofileFormat {
    Geojson,
    Shapefile,
}

impl GeofileFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        Self::from_filename(filename)
    }

    /// Determine the format from a bare filename, as sent by an upload form.
    pub fn from_filename(filename: &str) -> Result<Self, LoadError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "geojson" | "json" => Ok(Self::Geojson),
            "shp" => Ok(Self::Shapefile),
            _ => Err(LoadError::UnsupportedFormat(filename.to_string())),
        }
    }
}

/// Read a vector file from disk into a feature collection.
pub fn read_features_from_geofile(path: &Path) -> Result<FeatureCollection, LoadError> {
    log::info!("Reading vector file {:?}", path);
    match GeofileFormat::from_path(path)? {
        GeofileFormat::Geojson => {
            let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            geojson::read_features_from_geojson_str(&contents)
        }
        GeofileFormat::Shapefile => shapefile::read_features_from_shapefile(path),
    }
}

/// Read an uploaded vector file into a feature collection. The format is
/// taken from the uploaded filename.
pub fn read_features_from_upload(
    filename: &str,
    bytes: &[u8],
) -> Result<FeatureCollection, LoadError> {
    log::info!(
        "Reading uploaded vector file {:?} ({} bytes)",
        filename,
        bytes.len()
    );
    match GeofileFormat::from_filename(filename)? {
        GeofileFormat::Geojson => {
            let contents = std::str::from_utf8(bytes)
                .map_err(|_| LoadError::NotUtf8(filename.to_string()))?;
            geojson::read_features_from_geojson_str(contents)
        }
        GeofileFormat::Shapefile => shapefile::read_features_from_shapefile_bytes(bytes),
    }
}
