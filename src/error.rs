use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::db::ident::InvalidIdentifier;
use crate::db::schema::SchemaError;

#[derive(Debug, ThisError)]
pub enum TabulaError {
    #[error("Collection \"{0}\" not found in the schema")]
    UnknownCollection(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] InvalidIdentifier),

    #[error("Invalid value for column {column}: {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Schema load error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),
}

impl From<figment::Error> for TabulaError {
    fn from(e: figment::Error) -> Self {
        TabulaError::Config(Box::new(e))
    }
}

impl IntoResponse for TabulaError {
    fn into_response(self) -> axum::response::Response {
        // Detail stays in the server log; callers only ever see the opaque body.
        error!(error = %self, "request failed");
        ApiErrorResponse::new(
            "INTERNAL_ERROR",
            "An internal server error occurred.",
        )
        .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

impl ApiErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> axum::response::Response {
        (status, Json(self)).into_response()
    }
}
