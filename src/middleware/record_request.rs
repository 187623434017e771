use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::db::{Ident, RecordId};
use crate::error::ApiErrorResponse;

/// Request fields are a JSON object keyed by column name.
pub type RecordFields = Map<String, Value>;

fn bad_request(code: &str, message: &str) -> Response {
    ApiErrorResponse::new(code, message).into_response_with(StatusCode::BAD_REQUEST)
}

fn check_collection(name: &str) -> Result<(), Response> {
    Ident::parse(name).map(|_| ()).map_err(|e| {
        debug!(error = %e, "rejected collection name");
        bad_request("INVALID_COLLECTION", "Invalid collection name.")
    })
}

/// `/{collection}` with a syntactically valid collection name.
#[derive(Debug, Clone)]
pub struct CollectionPath(pub String);

impl<S> FromRequestParts<S> for CollectionPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(collection) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        check_collection(&collection)?;
        Ok(Self(collection))
    }
}

/// `/{collection}/{id}`. An id that is not an integer cannot match any record
/// and is carried as `None`.
#[derive(Debug, Clone)]
pub struct RecordPath(pub String, pub Option<RecordId>);

impl<S> FromRequestParts<S> for RecordPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((collection, id)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        check_collection(&collection)?;
        Ok(Self(collection, id.trim().parse().ok()))
    }
}

/// JSON object body.
pub struct RecordBody(pub RecordFields);

impl<S> FromRequest<S> for RecordBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        match body {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(bad_request(
                "INVALID_BODY",
                "Request body must be a JSON object.",
            )),
        }
    }
}
