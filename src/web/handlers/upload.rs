//! Upload handler.

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use std::sync::Arc;

use crate::file::validate_filename;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Name of the multipart part carrying the file.
pub const FILE_FIELD: &str = "file";

/// POST /upload - Store the `file` part under its client-supplied filename.
///
/// Request body: multipart/form-data with a "file" part carrying a filename.
/// Other parts, including `file` parts without a filename, are skipped. The
/// part is streamed to a temporary file and moved into place once complete,
/// so a failed upload never touches a stored file of the same name.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected upload body");
        ApiError::from(rejection)
    })?;

    let mut skipped_unnamed = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read multipart field");
        ApiError::from(e)
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                skipped_unnamed = true;
                continue;
            }
        };
        return store_field(&state, filename, field).await;
    }

    if skipped_unnamed {
        tracing::warn!("Upload part \"{}\" has no filename", FILE_FIELD);
        return Err(ApiError::bad_request(format!(
            "part \"{FILE_FIELD}\" is not a file: missing filename"
        )));
    }

    tracing::warn!("Upload without a \"{}\" part", FILE_FIELD);
    Err(ApiError::bad_request(format!(
        "missing file part \"{FILE_FIELD}\""
    )))
}

/// Fallback for non-POST requests to /upload.
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

async fn store_field(
    state: &AppState,
    filename: String,
    mut field: Field<'_>,
) -> Result<String, ApiError> {
    if state.reject_unsafe_filenames {
        validate_filename(&filename).map_err(|e| {
            tracing::warn!(filename = %filename, error = %e, "Rejected upload filename");
            ApiError::from(e)
        })?;
    }

    let mut file = state.storage.create(&filename).await.map_err(|e| {
        tracing::error!(filename = %filename, error = %e, "Failed to create upload destination");
        ApiError::from(e)
    })?;

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(
                    filename = %filename,
                    received = file.written(),
                    error = %e,
                    "Upload stream failed"
                );
                file.discard().await;
                return Err(e.into());
            }
        };

        if let Err(e) = file.write_chunk(&chunk).await {
            tracing::error!(filename = %filename, error = %e, "Failed to write upload");
            file.discard().await;
            return Err(e.into());
        }
    }

    let path = file.path().to_path_buf();
    let bytes = file.finish().await.map_err(|e| {
        tracing::error!(filename = %filename, error = %e, "Failed to store upload");
        ApiError::from(e)
    })?;

    tracing::info!(path = %path.display(), bytes, "Stored upload");
    Ok(format!("Upload successful: {filename}"))
}
