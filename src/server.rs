// Financial Dashboard - HTTP API
//
// Every request reads a fresh snapshot and derives views from scratch.
// Responses carry the snapshot fingerprint as a strong ETag.

use crate::chart::ChartAlignment;
use crate::dashboard::{key_metrics, DerivedViews, View};
use crate::db::{input_history, load_snapshot, read_inputs, setup_database, update_inputs, Event};
use crate::error::EngineError;
use crate::model::EditableInputs;
use crate::settings::Settings;
use crate::snapshot::Snapshot;
use crate::analysis::BASE_YEAR;
use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub alignment: ChartAlignment,
}

impl AppState {
    pub fn new(conn: Connection, alignment: ChartAlignment) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            alignment,
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Storage(anyhow::anyhow!("database lock poisoned")))
    }

    fn snapshot(&self) -> Result<Snapshot, ApiError> {
        let conn = self.conn()?;
        Ok(load_snapshot(&conn, self.alignment)?)
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ApiError {
    /// Reference data missing from the snapshot (no base year, etc.)
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Engine(e) if e.is_missing_data() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

// ============================================================================
// ETag
// ============================================================================

fn etag(snapshot: &Snapshot) -> String {
    format!("\"{}\"", snapshot.fingerprint())
}

/// Wrap `data` in the envelope, or answer 304 if the client already has it
fn tagged<T: Serialize>(headers: &HeaderMap, snapshot: &Snapshot, data: T) -> Response {
    let tag = etag(snapshot);

    let unchanged = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == tag);

    if unchanged {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, tag)]).into_response();
    }

    ([(header::ETAG, tag)], Json(ApiResponse::ok(data))).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/snapshot - The seven source tables plus chart series
async fn get_snapshot(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let snapshot = state.snapshot()?;

    #[derive(Serialize)]
    struct SnapshotResponse<'a> {
        fingerprint: String,
        #[serde(flatten)]
        snapshot: &'a Snapshot,
    }

    let body = SnapshotResponse {
        fingerprint: snapshot.fingerprint(),
        snapshot: &snapshot,
    };
    Ok(tagged(&headers, &snapshot, body))
}

/// GET /api/views - Every derived view in one response
async fn get_all_views(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let snapshot = state.snapshot()?;
    let views = DerivedViews::compute(&snapshot)?;

    Ok(tagged(&headers, &snapshot, views))
}

/// GET /api/views/:view - One derived view
async fn get_view(
    State(state): State<AppState>,
    Path(view): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let view: View = view.parse().map_err(ApiError::NotFound)?;

    let snapshot = state.snapshot()?;
    let data = view.render(&snapshot)?;

    Ok(tagged(&headers, &snapshot, data))
}

/// GET /api/key-metrics - Headline figures
async fn get_key_metrics(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let snapshot = state.snapshot()?;

    Ok(tagged(&headers, &snapshot, key_metrics(&snapshot)))
}

/// GET /api/inputs - Current base-year inputs
async fn get_inputs(State(state): State<AppState>) -> Result<Json<ApiResponse<EditableInputs>>, ApiError> {
    let conn = state.conn()?;

    match read_inputs(&conn)? {
        Some(inputs) => Ok(Json(ApiResponse::ok(inputs))),
        None => Err(EngineError::MissingBaseYear { year: BASE_YEAR }.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateInputsRequest {
    #[serde(flatten)]
    pub inputs: EditableInputs,
    pub actor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateInputsResponse {
    pub inputs: EditableInputs,
    pub fingerprint: String,
}

/// PUT /api/inputs - Overwrite base-year inputs and return the new fingerprint
async fn put_inputs(
    State(state): State<AppState>,
    Json(request): Json<UpdateInputsRequest>,
) -> Result<Response, ApiError> {
    let conn = state.conn()?;

    if read_inputs(&conn)?.is_none() {
        return Err(EngineError::MissingBaseYear { year: BASE_YEAR }.into());
    }

    let actor = request.actor.as_deref().unwrap_or("api");
    let snapshot = update_inputs(&conn, &request.inputs, actor, state.alignment)?;

    let body = UpdateInputsResponse {
        inputs: request.inputs,
        fingerprint: snapshot.fingerprint(),
    };
    Ok(([(header::ETAG, etag(&snapshot))], Json(ApiResponse::ok(body))).into_response())
}

/// GET /api/inputs/history - Audit trail of input edits, newest first
async fn get_inputs_history(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Event>>>, ApiError> {
    let conn = state.conn()?;
    let events = input_history(&conn)?;

    Ok(Json(ApiResponse::ok(events)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/snapshot", get(get_snapshot))
        .route("/views", get(get_all_views))
        .route("/views/:view", get(get_view))
        .route("/key-metrics", get(get_key_metrics))
        .route("/inputs", get(get_inputs).put(put_inputs))
        .route("/inputs/history", get(get_inputs_history))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Open the configured database and serve until the process is stopped
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let conn = Connection::open(&settings.database_path)
        .with_context(|| format!("Failed to open database: {}", settings.database_path.display()))?;
    setup_database(&conn)?;

    let app = router(AppState::new(conn, settings.chart_alignment));

    let addr = settings.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, database = %settings.database_path.display(), "server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
