//! Request utilities for HTTP endpoints.

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use percent_encoding::percent_decode_str;
use tokio::time;

use crate::router::RouterError;
use evaluacion_core::error::DbError;
use evaluacion_core::sort::Sort;

use super::header_util::Headers;

/// Content type of JSON success responses.
pub const APPLICATION_JSON_UTF8: &str = "application/json;charset=UTF-8";

/// Helper function to read request body with timeout
pub async fn read_request_body_with_timeout<B>(
    req: Request<B>,
    timeout_ms: u64,
) -> Result<Bytes, RouterError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = time::timeout(timeout_duration, req.into_body().collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(body.to_bytes())
}

/// Map DbError to appropriate RouterError
pub fn map_db_error_to_router_error(e: DbError) -> RouterError {
    match e {
        DbError::RecordNotFound { .. } => RouterError::NotFound(e.to_string()),
        DbError::IdAlreadyExists { .. } | DbError::IdPreset { .. } | DbError::InvalidSort(_) => {
            RouterError::BadRequest(e.to_string())
        }
        _ => RouterError::InternalError(format!("Store error: {}", e)),
    }
}

/// Parses an `{id}` path parameter.
pub fn parse_id(raw: &str) -> Result<u64, RouterError> {
    raw.parse()
        .map_err(|e| RouterError::BadRequest(format!("Invalid evaluacion ID '{}': {}", raw, e)))
}

/// Collects every `sort` parameter of the query string into a [`Sort`].
///
/// Other parameters are ignored.
pub fn parse_sort_params(query_str: Option<&str>) -> Result<Sort, RouterError> {
    let Some(query_str) = query_str else {
        return Ok(Sort::unsorted());
    };

    let values: Vec<String> = query_str
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == "sort")
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
        .collect();

    Sort::from_params(values.iter().map(String::as_str)).map_err(map_db_error_to_router_error)
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(status: u16, json: Vec<u8>) -> Result<Response<Bytes>, RouterError> {
    build_response_with_headers(status, json, Vec::new())
}

/// Builds a JSON response carrying extra headers.
pub fn build_response_with_headers(
    status: u16,
    json: Vec<u8>,
    headers: Headers,
) -> Result<Response<Bytes>, RouterError> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", APPLICATION_JSON_UTF8);
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Builds a bodiless response carrying extra headers.
pub fn build_empty_response(status: u16, headers: Headers) -> Result<Response<Bytes>, RouterError> {
    let mut builder = Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}
