//! Mapping of scoring errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ScoringError;

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
}

/// Handler error
#[derive(Debug)]
pub struct ApiError(pub ScoringError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ScoringError::Validation(_) => StatusCode::BAD_REQUEST,
            ScoringError::NotFound(_) => StatusCode::NOT_FOUND,
            ScoringError::InvalidState(_) | ScoringError::NoHistory => StatusCode::CONFLICT,
            ScoringError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
