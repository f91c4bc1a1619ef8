// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: login, registration, token refresh and logout.
//!
//! These are public. Successful token replies also set the HTTP-only session
//! cookie so browsers get an ambient credential alongside the JSON tokens.

use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, ErrorResponse, Result};
use crate::middleware::auth::{LEGACY_SESSION_COOKIE, SESSION_COOKIE};
use crate::routes::proxy::parse_json_body;
use crate::AppState;

/// Lifetime of the session cookie.
const SESSION_COOKIE_MAX_AGE: time::Duration = time::Duration::days(7);

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/refresh", post(refresh))
        .route("/api/logout", post(logout))
}

/// Which token-issuing backend call a request maps to.
#[derive(Debug, Clone, Copy)]
enum TokenCall {
    Login,
    Register,
    Refresh,
}

impl TokenCall {
    fn path(self) -> &'static str {
        match self {
            TokenCall::Login => "/api/login",
            TokenCall::Register => "/api/register",
            TokenCall::Refresh => "/api/refresh",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            TokenCall::Login => "Login failed",
            TokenCall::Register => "Registration failed",
            TokenCall::Refresh => "Token refresh failed",
        }
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Response)> {
    issue_tokens(&state, jar, &body, TokenCall::Login)
        .await
        .map_err(|e| {
            // The login form distinguishes "backend down" from other failures.
            if e.is_transport() {
                AppError::BackendUnavailable
            } else {
                e
            }
        })
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Response)> {
    issue_tokens(&state, jar, &body, TokenCall::Register).await
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Response)> {
    issue_tokens(&state, jar, &body, TokenCall::Refresh).await
}

/// Forward a token-issuing call and set the session cookie on success.
async fn issue_tokens(
    state: &AppState,
    jar: CookieJar,
    body: &Bytes,
    call: TokenCall,
) -> Result<(CookieJar, Response)> {
    let body = parse_json_body(body)?
        .ok_or_else(|| AppError::BadRequest("Request body is required".to_string()))?;

    let reply = state
        .backend
        .forward(Method::POST, call.path(), None, Some(&body))
        .await?;

    if !reply.is_success() {
        let message = reply
            .error_message()
            .unwrap_or(call.failure_message())
            .to_string();
        tracing::info!(call = ?call, status = %reply.status, "Backend rejected token request");
        return Ok((jar, (reply.status, Json(ErrorResponse::new(message))).into_response()));
    }

    let jar = match reply.str_field("access_token") {
        Some(token) if !token.is_empty() => jar.add(session_cookie(
            token.to_string(),
            SESSION_COOKIE_MAX_AGE,
            state.config.secure_cookies,
        )),
        _ => {
            tracing::warn!(call = ?call, "Token reply without access_token; no cookie set");
            jar
        }
    };

    Ok((jar, reply.into_response()))
}

/// Logout is local to the gateway: expire the session cookies.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let secure = state.config.secure_cookies;
    let jar = jar
        .add(session_cookie(String::new(), time::Duration::ZERO, secure))
        .add(
            Cookie::build((LEGACY_SESSION_COOKIE, ""))
                .path("/")
                .max_age(time::Duration::ZERO)
                .build(),
        );

    tracing::info!("Session cookies cleared");
    (jar, Json(json!({ "success": true })))
}

fn session_cookie(value: String, max_age: time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}
