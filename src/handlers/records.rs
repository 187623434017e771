use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{ApiErrorResponse, TabulaError};
use crate::middleware::record_request::{CollectionPath, RecordBody, RecordPath};
use crate::router::TabulaState;

fn not_found() -> Response {
    ApiErrorResponse::new("NOT_FOUND", "Item not found.").into_response_with(StatusCode::NOT_FOUND)
}

/// POST /{collection}
pub async fn create_record(
    State(state): State<TabulaState>,
    CollectionPath(collection): CollectionPath,
    RecordBody(fields): RecordBody,
) -> Result<Response, TabulaError> {
    let id = state.collections.create(&collection, &fields).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

/// GET /{collection}/{id}
pub async fn read_record(
    State(state): State<TabulaState>,
    RecordPath(collection, id): RecordPath,
) -> Result<Response, TabulaError> {
    let Some(id) = id else {
        return Ok(not_found());
    };
    match state.collections.read(&collection, id).await? {
        Some(record) => Ok(Json(record).into_response()),
        None => Ok(not_found()),
    }
}

/// POST|PUT /{collection}/{id}
pub async fn update_record(
    State(state): State<TabulaState>,
    RecordPath(collection, id): RecordPath,
    RecordBody(fields): RecordBody,
) -> Result<Response, TabulaError> {
    let Some(id) = id else {
        return Ok(not_found());
    };
    match state.collections.update(&collection, id, &fields).await? {
        Some(record) => Ok(Json(record).into_response()),
        None => Ok(not_found()),
    }
}

/// DELETE /{collection}/{id}
pub async fn delete_record(
    State(state): State<TabulaState>,
    RecordPath(collection, id): RecordPath,
) -> Result<Response, TabulaError> {
    let Some(id) = id else {
        return Ok(not_found());
    };
    if state.collections.delete(&collection, id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok(not_found())
    }
}
