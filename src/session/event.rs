use std::path::PathBuf;

use crate::geofile::feature::FeatureCollection;
use crate::map::view::MapView;

/// Where the vector data of a load request comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// The bundled default file, chosen by the checkbox in the page header.
    Default,
    /// A file uploaded through the browser.
    Upload { filename: String, bytes: Vec<u8> },
}

/// User gestures the editor reacts to.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Load(DataSource),
    /// A drawing finished on the map, carrying the GeoJSON the draw toolbar
    /// produced for it.
    DrawComplete(serde_json::Value),
    SaveClicked,
}

/// What the UI should do after an event has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RenderMap(MapView),
    PresentEdit(FeatureCollection),
    FileSaved(PathBuf),
    OfferDownload(PathBuf),
}
