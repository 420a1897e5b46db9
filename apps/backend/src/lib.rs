//! Bundled file download service
//!
//! Serves files packaged with the service over `GET /files/download`, with
//! download disposition and cache-validation headers.
//! This library exposes modules for use in integration tests.

use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod services;

use config::Config;
use services::ResourceStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resources: Arc<dyn ResourceStore>,
}

impl AppState {
    /// Create state with the resource store selected by `config`.
    pub fn from_config(config: Config) -> Self {
        let resources = services::resources::from_config(&config.resources);
        Self {
            config: Arc::new(config),
            resources,
        }
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub version: String,
}

pub async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "File download service is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let file_routes = Router::new().route("/download", get(api::files::download_file));

    Router::new()
        .route("/health", get(health_check))
        .nest("/files", file_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
