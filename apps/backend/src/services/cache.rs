//! Cache-validation headers for downloads.
//!
//! The ETag is derived from a resource's modification time and size only, not
//! its content: two files with the same size and timestamp share a tag. It is a
//! cheap change detector, not a content hash.

use axum::http::HeaderValue;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Failure to produce a usable `ETag` header.
#[derive(Error, Debug)]
pub enum EtagError {
    #[error("ETag is not a valid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),
}

/// Milliseconds since the Unix epoch, or 0 when unknown or before the epoch.
fn epoch_millis(time: Option<SystemTime>) -> u128 {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Generate the quoted ETag for a resource.
///
/// `"<base64(sha256("<mtime millis>:<len>"))>"`
pub fn generate_etag(last_modified: Option<SystemTime>, len: u64) -> String {
    let data = format!("{}:{}", epoch_millis(last_modified), len);
    let hash = Sha256::digest(data.as_bytes());
    format!("\"{}\"", STANDARD.encode(hash))
}

/// Generate the ETag as a header value.
pub fn etag_header(last_modified: Option<SystemTime>, len: u64) -> Result<HeaderValue, EtagError> {
    Ok(HeaderValue::from_str(&generate_etag(last_modified, len))?)
}

/// Format a timestamp as an HTTP-date (RFC 7231 IMF-fixdate).
pub fn http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
