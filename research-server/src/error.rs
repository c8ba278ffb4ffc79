//! Mapping of failures to HTTP responses.

use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use research_agent::ResearchError;
use research_rag::RagError;
use thiserror::Error;
use tracing::error;

use crate::protocol::StatusResponse;

/// A failed request: status code plus a message for the client.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self { status: err.status(), message: format!("invalid upload: {}", err.body_text()) }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        error!(error = %err, "ingestion failed");
        Self::internal(format!("Ingestion failed: {err}"))
    }
}

impl From<ResearchError> for ApiError {
    fn from(err: ResearchError) -> Self {
        match err {
            ResearchError::InvalidTopic(message) => Self::bad_request(message),
            other => {
                error!(error = %other, "research failed");
                Self::internal(format!("Research failed: {other}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(StatusResponse::error(self.message))).into_response()
    }
}
