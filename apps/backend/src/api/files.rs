//! File download endpoint.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::time::SystemTime;

use crate::config::{DownloadConfig, LastModifiedSource};
use crate::error::{AppError, Result};
use crate::services::cache::{etag_header, http_date};
use crate::services::transfer::{self, CHUNK_SIZE};
use crate::services::Resource;
use crate::AppState;

/// Capacity of the pipe between the relay task and the response body.
const PIPE_CAPACITY: usize = CHUNK_SIZE * 8;

/// Query parameters for `/files/download`.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub id: Option<i64>,
}

/// Map a download id to the resource name it refers to.
///
/// No validation: `Some(-3)` becomes `image-3.jpeg` with the default naming.
pub fn resolve_file_name(id: Option<i64>, naming: &DownloadConfig) -> String {
    match id {
        Some(id) => format!("{}{}{}", naming.prefix, id, naming.suffix),
        None => naming.fallback.clone(),
    }
}

/// Build the response headers for a resolved resource.
fn download_headers(
    file_name: &str,
    resource: &Resource,
    last_modified: LastModifiedSource,
    now: SystemTime,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    match mime_guess::from_path(file_name).first() {
        Some(mime) => {
            tracing::debug!("Content type: {}", mime);
            if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
                headers.insert(header::CONTENT_TYPE, value);
            }
        }
        None => tracing::debug!("No content type known for {}", file_name),
    }

    let disposition = HeaderValue::from_str(&format!("attachment;filename={}", file_name))
        .map_err(|e| AppError::Internal(format!("Invalid file name {:?}: {}", file_name, e)))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    match etag_header(resource.last_modified, resource.len) {
        Ok(etag) => {
            tracing::debug!("ETag: {:?}", etag);
            headers.insert(header::ETAG, etag);
        }
        Err(e) => tracing::error!("Failed to generate ETag: {}", e),
    }

    let modified = match last_modified {
        LastModifiedSource::RequestTime => now,
        LastModifiedSource::Resource => resource.last_modified.unwrap_or(now),
    };
    if let Ok(value) = HeaderValue::from_str(&http_date(modified)) {
        headers.insert(header::LAST_MODIFIED, value);
    }

    Ok(headers)
}

/// Stream a bundled file as an attachment.
///
/// GET /files/download?id=<integer>
pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let naming = &state.config.download;

    if query.id.is_none() {
        tracing::warn!("File ID is required, serving {}", naming.fallback);
    }

    let file_name = resolve_file_name(query.id, naming);
    let resource = state.resources.resolve(&file_name).await?;

    tracing::info!(
        "Serving {} from {} ({} bytes)",
        file_name,
        resource.origin,
        resource.len
    );

    let headers = download_headers(
        &file_name,
        &resource,
        naming.last_modified,
        SystemTime::now(),
    )?;

    // The relay owns the resource reader and the write end of the pipe; both
    // are dropped when it finishes.
    let (sink, body_reader) = tokio::io::duplex(PIPE_CAPACITY);
    tokio::spawn(transfer::send(file_name, resource.reader, sink));

    let body = Body::from_stream(transfer::body_stream(body_reader));
    Ok((headers, body).into_response())
}
