//! HTTP API for uploading documents and browsing the resulting courses.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/content/ingest` | Multipart upload (`file` field) → new course |
//! | `GET`  | `/api/ingested-courses?userId=` | Courses created by one uploader |
//! | `GET`  | `/api/ingested-courses/{courseId}` | Course detail with chapter listing |
//! | `GET`  | `/api/ingested-courses/{courseId}/chapters/{chapterId}` | Full chapter with navigation |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "unsupported_format", "message": "Unsupported file type: slides.pptx" } }
//! ```
//!
//! Ingestion failures carry the [`IngestError::code`] of the failure. Client
//! errors are `400`, unknown ids are `404`, extraction and persistence
//! failures are `500`.
//!
//! The uploader is identified by the opaque `X-User-Id` header and defaults
//! to `anonymous`. No authentication is performed.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::detect::detect_file_type;
use crate::error::IngestError;
use crate::ingest::Ingestor;
use crate::llm::create_generator;
use crate::models::CourseIngestResult;
use crate::sqlite_store::SqliteStore;
use crate::store::CourseStore;

/// Header carrying the uploader identity.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const ANONYMOUS_USER: &str = "anonymous";

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(ingestor: Arc<Ingestor>) -> Self {
        Self { ingestor }
    }
}

/// Starts the HTTP server on `[server].bind` and runs until the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = Arc::new(SqliteStore::open(config).await?);
    let generator = create_generator(&config.model)?;
    let ingestor = Arc::new(Ingestor::new(generator, store, config));

    let app = router(AppState::new(ingestor));

    info!(bind = %config.server.bind, model = %config.model.provider, "course ingest server listening");

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with all routes, CORS and the upload body limit.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(state.ingestor.max_file_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/api/content/ingest",
            post(handle_ingest).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/ingested-courses", get(handle_list_courses))
        .route("/api/ingested-courses/{course_id}", get(handle_get_course))
        .route(
            "/api/ingested-courses/{course_id}/chapters/{chapter_id}",
            get(handle_get_chapter),
        )
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    error!(error = %format!("{:#}", err), "store read failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: "Failed to read courses".to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/content/ingest ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestResponse {
    success: bool,
    message: String,
    #[serde(flatten)]
    course: CourseIngestResult,
}

fn uploader_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_USER)
        .to_string()
}

/// Handler for `POST /api/content/ingest`.
///
/// Reads the first multipart field named `file`. The extension is checked
/// before the body of the field is buffered.
async fn handle_ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError> {
    let uploader_id = uploader_id(&headers);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if detect_file_type(&file_name).is_none() {
            return Err(IngestError::UnsupportedFormat(file_name).into());
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Failed to read file: {e}")))?;
        let file_size = bytes.len() as u64;

        let result = state
            .ingestor
            .ingest(bytes.to_vec(), &file_name, file_size, &uploader_id)
            .await
            .inspect_err(|e| {
                if !e.is_client_error() {
                    error!(file_name = %file_name, error = %e, "ingestion failed");
                }
            })?;

        let message = format!(
            "Successfully created course \"{}\" with {} chapters",
            result.title, result.chapter_count
        );
        return Ok(Json(IngestResponse {
            success: true,
            message,
            course: result,
        }));
    }

    Err(bad_request("No file uploaded"))
}

// ============ GET /api/ingested-courses ============

#[derive(Deserialize)]
struct ListParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

async fn handle_list_courses(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = params
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| bad_request("userId is required"))?;

    let courses = state
        .ingestor
        .store()
        .list_courses(&user_id)
        .await
        .map_err(internal)?;

    Ok(Json(serde_json::json!({ "courses": courses })))
}

// ============ GET /api/ingested-courses/{courseId} ============

async fn handle_get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let course = state
        .ingestor
        .store()
        .get_course(&course_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("course not found: {}", course_id)))?;

    Ok(Json(
        serde_json::json!({ "course": course, "chapters": course.chapters }),
    ))
}

// ============ GET /api/ingested-courses/{courseId}/chapters/{chapterId} ============

async fn handle_get_chapter(
    State(state): State<AppState>,
    Path((course_id, chapter_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let chapter = state
        .ingestor
        .store()
        .get_chapter(&course_id, &chapter_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("chapter not found: {}", chapter_id)))?;

    let course_title = chapter.course_title.clone();
    Ok(Json(
        serde_json::json!({ "chapter": chapter, "courseTitle": course_title }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::DisabledGenerator;
    use crate::store::InMemoryStore;
    use axum::http::HeaderValue;

    async fn state_with_course() -> (AppState, String) {
        let store = Arc::new(InMemoryStore::new());
        let ingestor = Ingestor::new(Arc::new(DisabledGenerator), store, &Config::minimal());
        let text = vec!["lesson"; 2000].join(" ");
        let result = ingestor
            .ingest(text.into_bytes(), "notes.txt", 0, "u1")
            .await
            .unwrap();
        (AppState::new(Arc::new(ingestor)), result.course_id)
    }

    #[test]
    fn uploader_defaults_to_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(uploader_id(&headers), "anonymous");
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert_eq!(uploader_id(&headers), "anonymous");
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user-7"));
        assert_eq!(uploader_id(&headers), "user-7");
    }

    #[test]
    fn ingest_errors_map_to_status() {
        let e: AppError = IngestError::UnsupportedFormat("a.doc".into()).into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.code(), "unsupported_format");

        let e: AppError = IngestError::ScannedDocument.into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);

        let e: AppError = IngestError::PersistenceFailed("disk full".into()).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn list_requires_user_id() {
        let (state, _) = state_with_course().await;
        let err = handle_list_courses(State(state), Query(ListParams { user_id: None }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_and_fetch_course() {
        let (state, course_id) = state_with_course().await;

        let Json(list) = handle_list_courses(
            State(state.clone()),
            Query(ListParams {
                user_id: Some("u1".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(list["courses"][0]["id"], course_id.as_str());
        assert_eq!(list["courses"][0]["chapterCount"], 2);

        let Json(detail) = handle_get_course(State(state.clone()), Path(course_id.clone()))
            .await
            .unwrap();
        assert_eq!(detail["course"]["title"], "Notes");
        assert!(detail["course"].get("chapters").is_none());
        assert_eq!(detail["chapters"].as_array().unwrap().len(), 2);
        let first = detail["chapters"][0]["id"].as_str().unwrap().to_string();
        let second = detail["chapters"][1]["id"].as_str().unwrap().to_string();

        let Json(chapter) = handle_get_chapter(State(state), Path((course_id, first)))
            .await
            .unwrap();
        assert_eq!(chapter["courseTitle"], "Notes");
        assert_eq!(chapter["chapter"]["chapterNumber"], 1);
        assert_eq!(chapter["chapter"]["nextChapterId"], second.as_str());
        assert!(chapter["chapter"]["previousChapterId"].is_null());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (state, course_id) = state_with_course().await;
        let err = handle_get_course(State(state.clone()), Path("nope".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = handle_get_chapter(State(state), Path((course_id, "nope".into())))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
