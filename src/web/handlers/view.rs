//! Listing handler.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// ANY /view - List stored filenames as a JSON array of strings.
pub async fn list_files(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    let names = state.storage.list().await.map_err(|e| {
        tracing::error!(
            path = %state.storage.base_path().display(),
            error = %e,
            "Failed to list storage directory"
        );
        ApiError::from(e)
    })?;

    tracing::debug!(count = names.len(), "Listed storage directory");
    Ok(Json(names))
}
