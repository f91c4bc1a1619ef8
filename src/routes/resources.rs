// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource routes (require a credential).
//!
//! Nearly everything is a straight pass-through via [`proxy::forward`]. The few
//! handlers below only pick a different backend path or shape the body.

use crate::error::{AppError, Result};
use crate::middleware::BearerToken;
use crate::models::StruggleLog;
use crate::routes::proxy::{self, forward, forward_insights, relay, FeatureGate};
use crate::services::BackendReply;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::Method,
    routing::{delete, get, post},
    Extension, Router,
};
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_RECENT_LIMIT: &str = "7";
const DEFAULT_TREND_DAYS: &str = "30";

/// Resource routes. The credential middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/me", get(forward))
        .route("/api/ai/encourage", post(forward))
        // ─── Encouragement ───────────────────────────────────
        .route("/api/encourage", get(forward).post(forward))
        .route("/api/encourage/log-struggle", post(log_struggle))
        .route(
            "/api/encourage/{id}",
            get(forward).put(forward).delete(forward),
        )
        // ─── Journal ─────────────────────────────────────────
        .route("/api/journal", get(forward).post(forward))
        .route(
            "/api/journal/{id}",
            get(forward).put(forward).delete(forward),
        )
        // ─── Mood ────────────────────────────────────────────
        .route("/api/mood", get(list_mood).post(forward))
        .route("/api/mood/today", get(forward))
        .route("/api/mood/recent", get(forward))
        .route("/api/mood/range", get(forward))
        .route("/api/mood/trends", get(forward))
        .route("/api/mood/{id}", get(forward).put(forward).delete(forward))
        // ─── Gratitude ───────────────────────────────────────
        .route("/api/gratitude", get(forward).post(forward))
        .route("/api/gratitude/recent", get(recent_gratitude))
        .route("/api/gratitude/today", get(forward))
        .route("/api/gratitude/range", get(forward))
        .route("/api/gratitude/category", get(forward))
        .route(
            "/api/gratitude/{id}",
            get(forward).put(forward).delete(forward),
        )
        // ─── Prayer requests ─────────────────────────────────
        .route("/api/prayer", get(forward).post(forward))
        .route("/api/prayer/my-requests", get(forward))
        .route("/api/prayer/my-prayers", get(forward))
        .route("/api/prayer/answered", get(forward))
        .route("/api/prayer/{id}/pray", post(forward))
        .route("/api/prayer/{id}/answer", post(forward))
        .route("/api/prayer/{id}", get(forward).put(forward).delete(forward))
        // ─── Prayer chains ───────────────────────────────────
        .route("/api/prayer-chains", get(forward).post(forward))
        .route("/api/prayer-chains/my-chains", get(forward))
        .route("/api/prayer-chains/commit", post(forward))
        .route(
            "/api/prayer-chains/{id}/commit/{user_id}",
            delete(forward),
        )
        .route("/api/prayer-chains/{id}/join", post(forward))
        .route("/api/prayer-chains/{id}/leave", post(forward))
        .route(
            "/api/prayer-chains/{id}",
            get(forward).put(forward).delete(forward),
        )
        // ─── Insights ────────────────────────────────────────
        .route(
            "/api/insights",
            get(forward_insights).post(generate_insight),
        )
        .route("/api/insights/period", get(insight_for_period))
        .route("/api/insights/periods", get(forward_insights))
        .route("/api/insights/{id}", get(forward))
}

/// `GET /api/mood` selects a backend listing from query flags.
async fn list_mood(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<BackendReply> {
    let path = mood_listing_path(&params);
    relay(&state, Method::GET, &path, &token, None, None).await
}

fn mood_listing_path(params: &HashMap<String, String>) -> String {
    let param = |key: &str| params.get(key).map(String::as_str);

    if let (Some(start), Some(end)) = (param("start_date"), param("end_date")) {
        format!(
            "/api/mood/range?start_date={}&end_date={}",
            urlencoding::encode(start),
            urlencoding::encode(end)
        )
    } else if params.contains_key("recent") {
        format!(
            "/api/mood/recent?limit={}",
            urlencoding::encode(count_or(params, "limit", DEFAULT_RECENT_LIMIT))
        )
    } else if params.contains_key("trends") {
        format!(
            "/api/mood/trends?days={}",
            urlencoding::encode(count_or(params, "days", DEFAULT_TREND_DAYS))
        )
    } else if params.contains_key("today") {
        "/api/mood/today".to_string()
    } else {
        "/api/mood".to_string()
    }
}

/// A count parameter, or `default` when it is missing or empty.
fn count_or<'a>(params: &'a HashMap<String, String>, key: &str, default: &'a str) -> &'a str {
    params
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

#[derive(serde::Deserialize)]
struct RecentQuery {
    limit: Option<String>,
}

#[derive(serde::Deserialize)]
struct PeriodQuery {
    period: Option<String>,
}

async fn recent_gratitude(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<RecentQuery>,
) -> Result<BackendReply> {
    let limit = query
        .limit
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_RECENT_LIMIT);
    let path = format!("/api/gratitude/recent?limit={}", urlencoding::encode(limit));
    relay(&state, Method::GET, &path, &token, None, None).await
}

/// Struggle and encouragement travel as separate fields; both are required.
async fn log_struggle(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    body: Bytes,
) -> Result<BackendReply> {
    let log = proxy::parse_json_body(&body)?
        .and_then(StruggleLog::from_body)
        .ok_or_else(|| AppError::BadRequest("Struggle and message are required".to_string()))?;

    let body = serde_json::to_value(&log).map_err(|e| AppError::Internal(e.into()))?;
    relay(
        &state,
        Method::POST,
        "/api/encourage/log-struggle",
        &token,
        Some(&body),
        None,
    )
    .await
}

/// `GET /api/insights/period`: only a non-empty `period` is passed on.
async fn insight_for_period(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<PeriodQuery>,
) -> Result<BackendReply> {
    let path = period_path(query.period.as_deref());
    relay(
        &state,
        Method::GET,
        &path,
        &token,
        None,
        Some(FeatureGate::INSIGHTS),
    )
    .await
}

fn period_path(period: Option<&str>) -> String {
    match period.filter(|p| !p.is_empty()) {
        Some(period) => format!(
            "/api/insights/period?period={}",
            urlencoding::encode(period)
        ),
        None => "/api/insights/period".to_string(),
    }
}

/// `POST /api/insights` generates a new insight.
async fn generate_insight(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    body: Bytes,
) -> Result<BackendReply> {
    let body = proxy::parse_json_body(&body)?;
    relay(
        &state,
        Method::POST,
        "/api/insights/generate",
        &token,
        body.as_ref(),
        Some(FeatureGate::INSIGHTS),
    )
    .await
}
