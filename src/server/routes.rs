use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::geofile::geojson;
use crate::html::map_page::MAP_PAGE_HTML;
use crate::map::draw::DrawToolOptions;
use crate::map::view::MapView;
use crate::session::editor::EditorSession;
use crate::session::event::{DataSource, Effect, SessionEvent};
use crate::session::{SessionError, EXPORT_FILENAME};

/// The one editing session of this server, shared across handlers.
pub type SharedSession = Arc<Mutex<EditorSession>>;

/// Uploads can be whole city extracts, allow a generous payload.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn build_router(session: SharedSession) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/load/default", post(load_default))
        .route("/api/load/upload", post(load_upload))
        .route("/api/view", get(current_view))
        .route("/api/draw", post(draw_complete))
        .route("/api/save", post(save))
        .route("/download", get(download))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(session)
}

fn lock_session(session: &SharedSession) -> MutexGuard<'_, EditorSession> {
    session.lock().expect("session lock poisoned")
}

async fn index() -> Html<&'static str> {
    Html(MAP_PAGE_HTML)
}

async fn load_default(State(session): State<SharedSession>) -> Response {
    let mut session = lock_session(&session);
    match session.apply(SessionEvent::Load(DataSource::Default)) {
        Ok(_) => view_response(&session),
        Err(error) => ApiError::from(error).into_response(),
    }
}

async fn load_upload(State(session): State<SharedSession>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(error) => return error.into_response(),
    };
    let mut session = lock_session(&session);
    match session.apply(SessionEvent::Load(upload)) {
        Ok(_) => view_response(&session),
        Err(error) => ApiError::from(error).into_response(),
    }
}

/// Pull the first file out of a multipart upload.
async fn read_upload(multipart: &mut Multipart) -> Result<DataSource, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| ApiError::bad_request(&error.to_string()))?
    {
        let filename = match field.file_name() {
            Some(filename) => filename.to_string(),
            None => continue,
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|error| ApiError::bad_request(&error.to_string()))?;
        return Ok(DataSource::Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::bad_request("multipart upload contains no file"))
}

async fn current_view(State(session): State<SharedSession>) -> Response {
    let session = lock_session(&session);
    view_response(&session)
}

async fn draw_complete(
    State(session): State<SharedSession>,
    Json(drawing): Json<serde_json::Value>,
) -> Response {
    let mut session = lock_session(&session);
    match session.apply(SessionEvent::DrawComplete(drawing)) {
        Ok(effects) => {
            let captured = effects.into_iter().find_map(|effect| match effect {
                Effect::PresentEdit(features) => Some(features),
                _ => None,
            });
            match captured {
                Some(features) => Json(json!({
                    "captured": geojson::features_to_geojson(&features),
                }))
                .into_response(),
                None => StatusCode::NO_CONTENT.into_response(),
            }
        }
        Err(error) => ApiError::from(error).into_response(),
    }
}

async fn save(State(session): State<SharedSession>) -> Response {
    let mut session = lock_session(&session);
    match session.apply(SessionEvent::SaveClicked) {
        Ok(effects) => {
            let saved_to = effects.iter().find_map(|effect| match effect {
                Effect::FileSaved(path) => Some(path.display().to_string()),
                _ => None,
            });
            Json(json!({
                "saved_to": saved_to,
                "download": "/download",
            }))
            .into_response()
        }
        Err(error) => ApiError::from(error).into_response(),
    }
}

async fn download(State(session): State<SharedSession>) -> Response {
    // Don't hold the session lock across the file read.
    let export_path = {
        let session = lock_session(&session);
        if session.last_edit().is_none() {
            return ApiError::not_found("nothing has been exported yet").into_response();
        }
        session.export_path()
    };
    match tokio::fs::read(&export_path).await {
        Ok(contents) => (
            [
                (header::CONTENT_TYPE, "application/geo+json".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
                ),
            ],
            contents,
        )
            .into_response(),
        Err(error) => {
            log::warn!("Download of {:?} failed: {}", export_path, error);
            ApiError::not_found("nothing has been exported yet").into_response()
        }
    }
}

/// Everything the page needs to draw the map: viewport, toolbar setup and
/// the loaded features as GeoJSON.
#[derive(Serialize)]
struct ViewResponse {
    view: MapView,
    draw: DrawToolOptions,
    data: serde_json::Value,
}

fn view_response(session: &EditorSession) -> Response {
    let (collection, view) = match (session.collection(), session.view()) {
        (Some(collection), Some(view)) => (collection, view),
        _ => return ApiError::not_found("no vector file is loaded").into_response(),
    };
    let data = match serde_json::to_value(geojson::features_to_geojson(collection)) {
        Ok(data) => data,
        Err(error) => return ApiError::internal(error.to_string()).into_response(),
    };
    Json(ViewResponse {
        view,
        draw: DrawToolOptions::default(),
        data,
    })
    .into_response()
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.to_string(),
        }
    }

    fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        let status = match &error {
            SessionError::Load(_) | SessionError::Conversion(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SessionError::NothingLoaded | SessionError::NothingToSave => StatusCode::CONFLICT,
            SessionError::Export { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        log::warn!("Request failed: {}", error);
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Json, State};
    use axum::http::{header, StatusCode};
    use serde_json::json;
    use testdir::testdir;

    use crate::session::editor::EditorSession;

    use super::SharedSession;

    const TWO_POINTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [0.0, 10.0]},
                "properties": {"name": "a"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [2.0, 12.0]},
                "properties": {"name": "b"}
            }
        ]
    }"#;

    fn shared_session(test_dir: &Path, contents: &str) -> SharedSession {
        let default_path = test_dir.join("default.geojson");
        std::fs::write(&default_path, contents).unwrap();
        Arc::new(Mutex::new(EditorSession::new(
            default_path,
            test_dir.to_path_buf(),
        )))
    }

    #[tokio::test]
    async fn test_index_serves_the_editor_page() {
        let axum::response::Html(page) = super::index().await;
        assert!(page.contains("Save Changes"));
        assert!(page.contains("leaflet"));
    }

    #[tokio::test]
    async fn test_loading_the_default_file_returns_the_view() {
        let test_dir = testdir!();
        let session = shared_session(&test_dir, TWO_POINTS);

        let response = super::load_default(State(session.clone())).await;

        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(2, super::lock_session(&session).collection().unwrap().len());
    }

    #[tokio::test]
    async fn test_missing_default_file_is_unprocessable() {
        let test_dir = testdir!();
        let session: SharedSession = Arc::new(Mutex::new(EditorSession::new(
            test_dir.join("nowhere.geojson"),
            test_dir.clone(),
        )));

        let response = super::load_default(State(session)).await;

        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, response.status());
    }

    #[tokio::test]
    async fn test_view_before_loading_is_not_found() {
        let test_dir = testdir!();
        let session = shared_session(&test_dir, TWO_POINTS);

        let response = super::current_view(State(session)).await;

        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn test_drawing_before_loading_is_a_conflict() {
        let test_dir = testdir!();
        let session = shared_session(&test_dir, TWO_POINTS);

        let drawing = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        let response = super::draw_complete(State(session), Json(drawing)).await;

        assert_eq!(StatusCode::CONFLICT, response.status());
    }

    #[tokio::test]
    async fn test_saving_before_drawing_is_a_conflict() {
        let test_dir = testdir!();
        let session = shared_session(&test_dir, TWO_POINTS);
        super::load_default(State(session.clone())).await;

        let response = super::save(State(session)).await;

        assert_eq!(StatusCode::CONFLICT, response.status());
    }

    #[tokio::test]
    async fn test_download_before_saving_is_not_found() {
        let test_dir = testdir!();
        let session = shared_session(&test_dir, TWO_POINTS);

        let response = super::download(State(session)).await;

        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn test_draw_and_save_flow_produces_a_download() {
        let test_dir = testdir!();
        let session = shared_session(&test_dir, TWO_POINTS);

        let load = super::load_default(State(session.clone())).await;
        assert_eq!(StatusCode::OK, load.status());

        let drawing = json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-73.97, 40.78]},
            "properties": {}
        });
        let draw = super::draw_complete(State(session.clone()), Json(drawing)).await;
        assert_eq!(StatusCode::OK, draw.status());

        let save = super::save(State(session.clone())).await;
        assert_eq!(StatusCode::OK, save.status());

        let download = super::download(State(session)).await;
        assert_eq!(StatusCode::OK, download.status());
        let disposition = download
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap();
        assert!(disposition.to_str().unwrap().contains("edited_data.geojson"));
    }

    #[tokio::test]
    async fn test_invalid_drawing_is_unprocessable() {
        let test_dir = testdir!();
        let session = shared_session(&test_dir, TWO_POINTS);
        super::load_default(State(session.clone())).await;

        let drawing = json!({"type": "Feature", "geometry": null, "properties": {}});
        let response = super::draw_complete(State(session), Json(drawing)).await;

        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, response.status());
    }
}
