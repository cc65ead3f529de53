use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

use crate::services::analysis_service::AnalysisError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Request timed out").into_response(),
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(value: AnalysisError) -> Self {
        match value {
            AnalysisError::Cancelled { .. } => AppError::Timeout,
            AnalysisError::Metrics(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        AppError::Internal(value.to_string())
    }
}
