use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::llm::GenerationError;
use crate::nutrition::services::AggregationError;
use crate::places::LookupError;
use crate::recommendations::parser::ParseError;
use crate::recommendations::services::RecommendError;
use crate::store::StoreError;

/// Error returned from every handler; rendered as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Trimmed, non-empty value of a required input field.
pub fn required(v: Option<String>, field: &str) -> ApiResult<String> {
    v.map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{field} is required")))
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(what) => ApiError::Conflict(format!("{what} already exists")),
            StoreError::Database(e) => {
                error!(error = %e, "storage failure");
                ApiError::Internal("storage failure".into())
            }
        }
    }
}

impl From<AggregationError> for ApiError {
    fn from(e: AggregationError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        warn!(error = %e, "places lookup failed");
        ApiError::Upstream("lookup failed".into())
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        warn!(error = %e, "text generation failed");
        ApiError::Upstream("failed to get food recommendations".into())
    }
}

impl From<ParseError> for ApiError {
    fn from(e: ParseError) -> Self {
        warn!(error = %e, "recommendation parse failed");
        ApiError::Internal("parse failed".into())
    }
}

impl From<RecommendError> for ApiError {
    fn from(e: RecommendError) -> Self {
        match e {
            RecommendError::UserNotFound(name) => ApiError::NotFound(format!("user {name} not found")),
            RecommendError::Aggregation(e) => e.into(),
            RecommendError::Generation(e) => e.into(),
            RecommendError::Parse(e) => e.into(),
            RecommendError::Storage(e) => e.into(),
        }
    }
}
