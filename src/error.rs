use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::month::UnknownMonth;
use crate::services::sheets::SheetsError;

/// Error returned by handlers, rendered as `{ "error": message }`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    Sheets(#[from] SheetsError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UnknownMonth> for AppError {
    fn from(err: UnknownMonth) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Malformed or mistyped request bodies answer with the usual `{ "error" }` shape.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Sheets(SheetsError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Sheets(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
