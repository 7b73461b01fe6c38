use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::screener::{FilterError, ProviderError};
use crate::store::StoreError;
use crate::sweep::SweepError;

/// Closed error taxonomy for the HTTP surface. Every response body carries a
/// machine-readable kind plus a human-readable detail string; clients must
/// never assume partial success on a non-2xx sweep response.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthorized(String),
    NotFound(String),
    Upstream(String),
    Timeout(String),
    SweepFailed(String),
    Internal(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::Unauthorized(_) => "AuthError",
            ApiError::NotFound(_) => "NotFoundError",
            ApiError::Upstream(_) => "UpstreamError",
            ApiError::Timeout(_) => "TimeoutError",
            ApiError::SweepFailed(_) => "SweepFailedError",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::SweepFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let details = match &self {
            ApiError::Validation(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Upstream(m)
            | ApiError::Timeout(m)
            | ApiError::SweepFailed(m)
            | ApiError::Internal(m) => m.clone(),
        };
        let body = json!({ "error": self.kind(), "details": details });
        (status, axum::Json(body)).into_response()
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Timeout(_) => ApiError::Timeout(e.to_string()),
            ProviderError::Upstream { .. } => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            StoreError::Validation(_) => ApiError::Validation(e.to_string()),
            StoreError::Backend(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SweepError> for ApiError {
    fn from(e: SweepError) -> Self {
        match e {
            SweepError::Scan(_) => ApiError::Internal(e.to_string()),
            SweepError::CommitFailed(_) => ApiError::SweepFailed(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{err:#}"))
    }
}
