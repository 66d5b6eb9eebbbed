//! Evaluacion resource handlers.

use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use crate::router::{AppState, RouterError, EVALUACIONS_PATH};
use evaluacion_core::error::DbError;
use evaluacion_core::persistence;
use evaluacion_core::{Evaluacion, SaveOutcome};

use super::header_util::{
    entity_creation_alert, entity_deletion_alert, entity_update_alert, failure_alert,
};
use super::request_utils::{
    build_empty_response, build_response, build_response_with_headers, map_db_error_to_router_error,
    parse_id, parse_sort_params, read_request_body_with_timeout,
};
use super::response::error_response;

/// Creates a new evaluacion.
///
/// # Endpoint
/// `POST /api/evaluacions`
///
/// # Request Body
/// ```json
/// { "status_evaluacion": 1 }
/// ```
///
/// # Response
/// - **201 Created**: the stored record with its new id, plus a `Location`
///   header and creation alert headers
///
/// # Errors
/// - **400 Bad Request**: the body already carries an `id`, or is not valid JSON
/// - **500 Internal Server Error**: the snapshot write failed
pub async fn create_evaluacion<B>(
    req: Request<B>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let evaluacion = parse_evaluacion(req, &state).await?;
    tracing::debug!("REST request to save Evaluacion: {:?}", evaluacion);

    if let Some(id) = evaluacion.id {
        let err = DbError::IdPreset { id };
        let body = serde_json::to_vec(&error_response(400, err.to_string(), None))
            .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
        return build_response_with_headers(
            400,
            body,
            failure_alert(&state.config.application_name, "idexists"),
        );
    }

    let created = state
        .store
        .create(evaluacion)
        .map_err(map_db_error_to_router_error)?;
    persist(&state).await?;
    created_response(&state, &created)
}

/// Updates an existing evaluacion, or creates it when it has no stored id.
///
/// # Endpoint
/// `PUT /api/evaluacions`
///
/// # Response
/// - **200 OK**: the record existed and was overwritten
/// - **201 Created**: the id was unset or unknown, so a new record was created
///
/// # Errors
/// - **400 Bad Request**: body is not valid JSON
/// - **500 Internal Server Error**: the snapshot write failed
pub async fn update_evaluacion<B>(
    req: Request<B>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let evaluacion = parse_evaluacion(req, &state).await?;
    tracing::debug!("REST request to update Evaluacion: {:?}", evaluacion);

    let (saved, outcome) = state
        .store
        .update(evaluacion)
        .map_err(map_db_error_to_router_error)?;
    persist(&state).await?;

    match outcome {
        SaveOutcome::Created => created_response(&state, &saved),
        SaveOutcome::Updated => {
            let id = stored_id(&saved)?;
            build_response_with_headers(
                200,
                to_json(&saved)?,
                entity_update_alert(&state.config.application_name, &id.to_string()),
            )
        }
    }
}

/// Lists all evaluacions.
///
/// # Endpoint
/// `GET /api/evaluacions?sort=id,desc`
///
/// `sort` may be repeated; each value is `property[,property...][,asc|desc]`
/// with properties `id` and `status_evaluacion`.
///
/// # Errors
/// - **400 Bad Request**: unknown sort property
pub async fn get_all_evaluacions<B>(
    req: Request<B>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    tracing::debug!("REST request to get all Evaluacions");
    let sort = parse_sort_params(req.uri().query())?;
    let records = state
        .store
        .find_all(&sort)
        .map_err(map_db_error_to_router_error)?;
    build_response(200, to_json(&records)?)
}

/// Reads one evaluacion.
///
/// # Endpoint
/// `GET /api/evaluacions/{id}`
///
/// # Errors
/// - **400 Bad Request**: id is not a number
/// - **404 Not Found**: no record with that id
pub async fn get_evaluacion(raw_id: &str, state: AppState) -> Result<Response<Bytes>, RouterError> {
    let id = parse_id(raw_id)?;
    tracing::debug!("REST request to get Evaluacion : {}", id);
    let record = state
        .store
        .find_by_id(id)
        .map_err(map_db_error_to_router_error)?;
    build_response(200, to_json(&record)?)
}

/// Deletes one evaluacion.
///
/// # Endpoint
/// `DELETE /api/evaluacions/{id}`
///
/// Deleting an id that is not stored also answers 200.
pub async fn delete_evaluacion(
    raw_id: &str,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let id = parse_id(raw_id)?;
    tracing::debug!("REST request to delete Evaluacion : {}", id);
    let removed = state
        .store
        .delete(id)
        .map_err(map_db_error_to_router_error)?;
    if removed {
        persist(&state).await?;
    }
    build_empty_response(
        200,
        entity_deletion_alert(&state.config.application_name, &id.to_string()),
    )
}

async fn parse_evaluacion<B>(req: Request<B>, state: &AppState) -> Result<Evaluacion, RouterError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    serde_json::from_slice(&body_bytes)
        .map_err(|e| RouterError::BadRequest(format!("Failed to parse request: {}", e)))
}

fn created_response(state: &AppState, created: &Evaluacion) -> Result<Response<Bytes>, RouterError> {
    let id = stored_id(created)?.to_string();
    let mut headers = entity_creation_alert(&state.config.application_name, &id);
    headers.push(("Location".to_string(), format!("{}/{}", EVALUACIONS_PATH, id)));
    build_response_with_headers(201, to_json(created)?, headers)
}

fn stored_id(record: &Evaluacion) -> Result<u64, RouterError> {
    record
        .id
        .ok_or_else(|| RouterError::InternalError("Stored evaluacion has no id".to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, RouterError> {
    serde_json::to_vec(value)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))
}

/// Writes the snapshot off the async executor when synchronous writes are on.
///
/// A failed write fails the request with 500.
async fn persist(state: &AppState) -> Result<(), RouterError> {
    if !state.config.sync_writes {
        return Ok(());
    }
    let state = state.clone();
    tokio::task::spawn_blocking(move || {
        persistence::save_after_write(&state.persistence, &state.store, &state.config)
    })
    .await
    .map_err(|e| RouterError::InternalError(format!("Snapshot task failed: {}", e)))?
    .map_err(|e| {
        tracing::error!("Failed to persist evaluacion snapshot: {}", e);
        RouterError::InternalError(format!("Failed to persist evaluacion: {}", e))
    })
}
