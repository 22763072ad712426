use std::path::PathBuf;

pub mod editor;
pub mod event;

/// Name of the file the save action writes into the data directory.
pub const EXPORT_FILENAME: &str = "edited_data.geojson";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] crate::geofile::LoadError),
    #[error(transparent)]
    Conversion(#[from] crate::geofile::ConversionError),
    #[error("no vector file is loaded, upload one to start editing")]
    NothingLoaded,
    #[error("no edit captured yet, draw on the map before saving")]
    NothingToSave,
    #[error("could not write {path:?}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
