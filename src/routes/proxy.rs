// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Uniform pass-through to the backend.
//!
//! Every resource route ends up here: credential already extracted by
//! `require_credential`, request forwarded with `Authorization: Bearer`, status
//! and JSON body mirrored back unchanged.

use crate::error::{AppError, Result};
use crate::middleware::BearerToken;
use crate::services::BackendReply;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    Extension,
};
use serde_json::Value;
use std::sync::Arc;

/// Backend routes that disappear entirely when an optional capability is off.
#[derive(Debug, Clone, Copy)]
pub struct FeatureGate {
    pub unavailable_message: &'static str,
}

impl FeatureGate {
    pub const INSIGHTS: FeatureGate = FeatureGate {
        unavailable_message:
            "Insights feature is currently unavailable. OpenAI integration may not be configured.",
    };

    /// A backend 404 here means "route not registered", not "resource missing".
    fn check(self, status: StatusCode) -> Result<()> {
        if status == StatusCode::NOT_FOUND {
            tracing::info!(
                feature = self.unavailable_message,
                "Feature-gated backend route not registered"
            );
            return Err(AppError::FeatureUnavailable(self.unavailable_message));
        }
        Ok(())
    }
}

/// Forward one request and relay the backend's answer.
pub async fn relay(
    state: &AppState,
    method: Method,
    path_and_query: &str,
    token: &BearerToken,
    body: Option<&Value>,
    gate: Option<FeatureGate>,
) -> Result<BackendReply> {
    let raw = state
        .backend
        .send(method, path_and_query, Some(token.as_str()), body)
        .await?;

    // Checked before parsing: an unregistered route rarely answers in JSON.
    if let Some(gate) = gate {
        gate.check(raw.status)?;
    }

    raw.into_json()
}

/// Parse an inbound JSON body. An empty body is `None`.
pub fn parse_json_body(bytes: &Bytes) -> Result<Option<Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// Path plus query string of the inbound request, forwarded as-is.
pub fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

/// Generic handler: same method, same path, same query on the backend.
pub async fn forward(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<BackendReply> {
    let body = parse_json_body(&body)?;
    relay(&state, method, path_and_query(&uri), &token, body.as_ref(), None).await
}

/// Like [`forward`] but for insights routes.
pub async fn forward_insights(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<BackendReply> {
    let body = parse_json_body(&body)?;
    relay(
        &state,
        method,
        path_and_query(&uri),
        &token,
        body.as_ref(),
        Some(FeatureGate::INSIGHTS),
    )
    .await
}
