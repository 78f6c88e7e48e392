//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{list_files, method_not_allowed, upload_file, AppState};
use crate::config::Config;

/// Create the main router.
///
/// `/upload` and `/view` are handled here; every other path falls through to
/// the static file directory when static serving is enabled.
pub fn create_router(app_state: Arc<AppState>, config: &Config) -> Router {
    let body_limit = match config.storage.max_upload_bytes() {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    let mut router = Router::new()
        .route(
            "/upload",
            post(upload_file)
                .fallback(method_not_allowed)
                .layer(body_limit),
        )
        .route("/view", any(list_files));

    if config.static_files.enabled {
        router = router.fallback_service(create_static_service(&config.static_files.path));
    }

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Create the static file service for unmatched paths.
///
/// Directories resolve to their `index.html`.
pub fn create_static_service(static_path: &str) -> ServeDir {
    if !Path::new(static_path).is_dir() {
        tracing::warn!(
            "Static directory {} not found; unmatched paths will return 404",
            static_path
        );
    }
    ServeDir::new(static_path)
}
