// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure at the gateway boundary becomes `{"error": "..."}` JSON with an
//! appropriate status. Backend-reported failures are not errors here; they are
//! relayed verbatim by the proxy layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    MissingCredential,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Backend unreachable on a path that reports connectivity explicitly.
    #[error("Backend unreachable")]
    BackendUnavailable,

    #[error("Backend transport error: {0}")]
    Transport(String),

    #[error("Invalid backend response: {0}")]
    InvalidBackendResponse(String),

    #[error("Feature unavailable: {0}")]
    FeatureUnavailable(&'static str),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const INTERNAL_MESSAGE: &'static str = "Internal server error";
    pub const CONNECTIVITY_MESSAGE: &'static str =
        "Unable to connect to server. Please check if the backend is running.";

    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredential => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BackendUnavailable | AppError::FeatureUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Transport(_)
            | AppError::InvalidBackendResponse(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures to reach the backend at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Transport(_) | AppError::BackendUnavailable)
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub feature_unavailable: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            feature_unavailable: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::MissingCredential => ErrorResponse::new("Authentication required"),
            AppError::BadRequest(msg) => ErrorResponse::new(msg.clone()),
            AppError::BackendUnavailable => {
                tracing::warn!("Backend unreachable");
                ErrorResponse::new(Self::CONNECTIVITY_MESSAGE)
            }
            AppError::Transport(msg) => {
                tracing::warn!(error = %msg, "Backend transport error");
                ErrorResponse::new(Self::INTERNAL_MESSAGE)
            }
            AppError::InvalidBackendResponse(msg) => {
                tracing::error!(error = %msg, "Invalid backend response");
                ErrorResponse::new(Self::INTERNAL_MESSAGE)
            }
            AppError::FeatureUnavailable(msg) => ErrorResponse {
                error: (*msg).to_string(),
                feature_unavailable: true,
            },
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ErrorResponse::new(Self::INTERNAL_MESSAGE)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
