//! HTTP surface of the roster editor.

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::error::Error;
use crate::roster::export::EXPORT_FAILED_MESSAGE;
use crate::roster::settings::INVALID_SETTINGS_MESSAGE;
use crate::roster::RosterState;
use handlers::{
    apply_command_handler, download_settings_handler, export_image_handler, health_handler,
    import_settings_handler, roster_handler, settings_schema_handler, summary_handler,
    upload_settings_handler, utilization_handler,
};

/// Largest accepted request body
const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    /// The roster being edited
    pub roster: Arc<RwLock<RosterState>>,
}

impl AppState {
    pub fn new(roster: RosterState) -> Self {
        Self {
            roster: Arc::new(RwLock::new(roster)),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/roster", get(roster_handler))
        .route("/api/roster/commands", post(apply_command_handler))
        .route(
            "/api/settings",
            get(download_settings_handler).post(import_settings_handler),
        )
        .route("/api/settings/upload", post(upload_settings_handler))
        .route("/api/settings/schema", get(settings_schema_handler))
        .route("/api/utilization", get(utilization_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/export/image", get(export_image_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Settings(_) => (StatusCode::BAD_REQUEST, INVALID_SETTINGS_MESSAGE.to_string()),
            Error::Export(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                EXPORT_FAILED_MESSAGE.to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
