//! Response and error mapping.
//!
//! # Responsibilities
//! - Represent handler outcomes (JSON body or empty body with a status)
//! - Map errors to status codes with a JSON `{"message": ...}` body
//!
//! # Design Decisions
//! - Validation → 422, NotFound → 404, BadRequest → 400
//! - Store faults are programmer errors: logged, then 500 with a generic message

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::store::StoreError;

/// Successful handler outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(StatusCode, Value),
    Empty(StatusCode),
}

impl ApiResponse {
    /// 200 with `value` serialized as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        Ok(Self::Json(StatusCode::OK, serde_json::to_value(value)?))
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::Empty(status)
    }

    pub fn created() -> Self {
        Self::Empty(StatusCode::CREATED)
    }

    pub fn no_content() -> Self {
        Self::Empty(StatusCode::NO_CONTENT)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Json(status, _) | Self::Empty(status) => *status,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Json(status, value) => (status, Json(value)).into_response(),
            Self::Empty(status) => status.into_response(),
        }
    }
}

/// Handler failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(m) | Self::NotFound(m) | Self::BadRequest(m) => m.clone(),
            Self::Store(_) | Self::Serialization(_) => "Erro interno".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, ApiError>;
