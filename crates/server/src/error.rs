use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use portfolio_dashboard_core::errors::CoreError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Failures surfaced by the HTTP layer, one variant per response envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Holdings document could not be loaded. Uses the bare `{error}` body.
    #[error("Failed to fetch holdings")]
    Holdings(#[source] CoreError),
    #[error("{0}")]
    StockFetch(#[from] CoreError),
    #[error("{0}")]
    StocksFetch(String),
    #[error("{0}")]
    InvalidParams(String),
    #[error("Endpoint not found: {method} {path}")]
    NotFound { method: String, path: String },
    #[error("Request timed out: {method} {path}")]
    Timeout { method: String, path: String },
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            ApiError::Holdings(_)
            | ApiError::StockFetch(_)
            | ApiError::StocksFetch(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Holdings(_) => "HOLDINGS_FETCH_ERROR",
            ApiError::StockFetch(_) => "STOCK_FETCH_ERROR",
            ApiError::StocksFetch(_) => "STOCKS_FETCH_ERROR",
            ApiError::InvalidParams(_) => "INVALID_PARAMS",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Timeout { .. } => "REQUEST_TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::REQUEST_TIMEOUT {
            tracing::warn!(error = %self, "request timed out");
        } else if status.is_server_error() {
            match &self {
                ApiError::Holdings(source) => tracing::error!(error = %source, "holdings request failed"),
                other => tracing::error!(code = other.code(), error = %other, "request failed"),
            }
        }

        if let ApiError::Holdings(_) = self {
            return (status, Json(json!({ "error": self.to_string() }))).into_response();
        }

        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
                timestamp: Utc::now(),
            },
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
