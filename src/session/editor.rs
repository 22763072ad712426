use std::path::PathBuf;

use crate::geofile::feature::FeatureCollection;
use crate::geofile::{geojson, loader, ConversionError};
use crate::map::view::{self, MapView};

use super::event::{DataSource, Effect, SessionEvent};
use super::{SessionError, EXPORT_FILENAME};

/// One user's editing session: the loaded data, the viewport derived from
/// it, and the most recent drawing captured from the map.
#[derive(Debug)]
pub struct EditorSession {
    default_geofile_path: PathBuf,
    data_dir: PathBuf,
    collection: Option<FeatureCollection>,
    view: Option<MapView>,
    last_edit: Option<FeatureCollection>,
}

impl EditorSession {
    pub fn new(default_geofile_path: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            default_geofile_path,
            data_dir,
            collection: None,
            view: None,
            last_edit: None,
        }
    }

    pub fn collection(&self) -> Option<&FeatureCollection> {
        self.collection.as_ref()
    }

    pub fn view(&self) -> Option<MapView> {
        self.view
    }

    pub fn last_edit(&self) -> Option<&FeatureCollection> {
        self.last_edit.as_ref()
    }

    /// Path the next save will write to.
    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join(EXPORT_FILENAME)
    }

    /// Apply one user gesture, returning what the UI should do next.
    pub fn apply(&mut self, event: SessionEvent) -> Result<Vec<Effect>, SessionError> {
        match event {
            SessionEvent::Load(source) => self.handle_load(source),
            SessionEvent::DrawComplete(drawing) => self.handle_draw_complete(drawing),
            SessionEvent::SaveClicked => self.handle_save(),
        }
    }

    fn handle_load(&mut self, source: DataSource) -> Result<Vec<Effect>, SessionError> {
        let loaded = match &source {
            DataSource::Default => loader::read_features_from_geofile(&self.default_geofile_path),
            DataSource::Upload { filename, bytes } => {
                loader::read_features_from_upload(filename, bytes)
            }
        };
        let collection = match loaded {
            Ok(collection) => collection,
            Err(error) => {
                // A failed load leaves no half-initialized session behind.
                self.collection = None;
                self.view = None;
                self.last_edit = None;
                return Err(SessionError::Load(error));
            }
        };
        log::info!("Loaded {} features", collection.len());
        let view = view::view_for_collection(&collection);
        self.collection = Some(collection);
        self.view = Some(view);
        self.last_edit = None;
        Ok(vec![Effect::RenderMap(view)])
    }

    fn handle_draw_complete(
        &mut self,
        drawing: serde_json::Value,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.collection.is_none() {
            return Err(SessionError::NothingLoaded);
        }
        log::debug!("Raw drawing payload: {}", drawing);
        let captured = geojson::features_from_json_value(drawing)?;
        if captured.is_empty() {
            return Err(SessionError::Conversion(ConversionError::EmptyDrawing));
        }
        log::info!("Captured an edit with {} features", captured.len());
        self.last_edit = Some(captured.clone());
        Ok(vec![Effect::PresentEdit(captured)])
    }

    fn handle_save(&mut self) -> Result<Vec<Effect>, SessionError> {
        let last_edit = match &self.last_edit {
            Some(last_edit) => last_edit,
            None => return Err(SessionError::NothingToSave),
        };
        let export_path = self.export_path();
        geojson::write_features_to_geojson(last_edit, &export_path).map_err(|source| {
            SessionError::Export {
                path: export_path.clone(),
                source,
            }
        })?;
        log::info!("Saved the captured edit to {:?}", export_path);
        Ok(vec![
            Effect::FileSaved(export_path.clone()),
            Effect::OfferDownload(export_path),
        ])
    }
}
