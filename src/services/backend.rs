// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the ArmorUp backend service.
//!
//! The gateway never interprets backend payloads. It forwards a request with a
//! normalized bearer credential and hands back status plus parsed JSON body.

use crate::error::AppError;
use axum::{
    body::Bytes,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// Backend API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

/// Status and JSON body as returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: StatusCode,
    /// `None` when the backend sent an empty body (e.g. `204 No Content`).
    pub body: Option<Value>,
}

impl BackendReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `error` string of a failure body, if the backend sent one.
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(Value::as_str)
    }

    /// A string field of the body, e.g. `access_token`.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.body.as_ref().and_then(|b| b.get(key)).and_then(Value::as_str)
    }
}

impl IntoResponse for BackendReply {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward a request to `path_and_query` on the backend and parse the reply.
    ///
    /// `bearer` is sent as `Authorization: Bearer <token>`; `body` as JSON.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        bearer: Option<&str>,
        body: Option<&Value>,
    ) -> Result<BackendReply, AppError> {
        self.send(method, path_and_query, bearer, body)
            .await?
            .into_json()
    }

    /// Forward a request without interpreting the body.
    pub async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        bearer: Option<&str>,
        body: Option<&Value>,
    ) -> Result<RawReply, AppError> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path = path_and_query, "Forwarding to backend");

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("{} {}: {}", method, path_and_query, e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(format!("reading body: {}", e)))?;

        Ok(RawReply { status, bytes })
    }
}

/// Backend reply before JSON parsing.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: StatusCode,
    pub bytes: Bytes,
}

impl RawReply {
    /// Parse a non-empty body as JSON.
    pub fn into_json(self) -> Result<BackendReply, AppError> {
        if self.bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BackendReply {
                status: self.status,
                body: None,
            });
        }

        let body = serde_json::from_slice(&self.bytes).map_err(|e| {
            AppError::InvalidBackendResponse(format!(
                "HTTP {} with non-JSON body: {}",
                self.status, e
            ))
        })?;

        Ok(BackendReply {
            status: self.status,
            body: Some(body),
        })
    }
}
