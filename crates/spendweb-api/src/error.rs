//! Error types for spendweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use spendweb_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Core(err) => match err.code() {
                ErrorCode::ValidationError | ErrorCode::InvalidPage => StatusCode::BAD_REQUEST,
                ErrorCode::EmployeeNotFound | ErrorCode::TransactionNotFound => {
                    StatusCode::NOT_FOUND
                }
                ErrorCode::Busy => StatusCode::CONFLICT,
                ErrorCode::FetchFailed => StatusCode::BAD_GATEWAY,
                ErrorCode::DataError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(err) => serde_json::json!({
                "success": false,
                "error": err.to_details(),
            }),
            other => serde_json::json!({
                "success": false,
                "error": { "message": other.to_string() },
            }),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
