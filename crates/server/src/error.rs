//! HTTP-facing error types.

use crate::hydra::HydraError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Failure of a browser-facing login, consent or logout step.
///
/// Malformed requests answer 400 with the message; everything else is logged
/// and answers a bare 500.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Hydra(#[from] HydraError),
    #[error("Failed to render template: {0}")]
    Template(#[from] askama::Error),
    #[error("Failed to generate random value: {0}")]
    Random(#[from] getrandom::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl FlowError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        FlowError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FlowError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            FlowError::BadRequest(message) => {
                tracing::warn!(%message, "Rejected malformed request");
                (status, message).into_response()
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                (status, "Internal server error").into_response()
            }
        }
    }
}

/// JSON body of every API error.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Error of the JSON API, rendered as `{"error": message}`.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Logs `err` and hides it from the client.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "Internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
