use std::path::PathBuf;

pub mod feature;
pub mod geojson;
pub mod loader;
pub mod shapefile;

/// A vector file could not be turned into a feature collection. The whole
/// load is aborted; there are no partial results.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported vector format {0:?}, expected .geojson, .json or .shp")]
    UnsupportedFormat(String),

    #[error("{0:?} is not UTF-8 encoded GeoJSON")]
    NotUtf8(String),

    #[error("invalid GeoJSON: {0}")]
    InvalidGeojson(#[from] ::geojson::Error),

    #[error("invalid shapefile: {0}")]
    InvalidShapefile(#[from] ::shapefile::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// A GeoJSON value could not be converted into the feature representation.
/// Raised both for features inside a loaded file and for captured drawings.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("drawing is not valid GeoJSON: {0}")]
    InvalidGeojson(::geojson::Error),

    #[error("drawing contains no features")]
    EmptyDrawing,

    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
}
