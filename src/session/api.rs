// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transport seam between the session manager and the gateway.

use super::error::SessionError;
use crate::models::{Credentials, CurrentUser, Registration, TokenResponse};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Calls the session manager makes against the gateway.
pub trait AuthApi: Send + Sync {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<TokenResponse, SessionError>> + Send;

    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<TokenResponse, SessionError>> + Send;

    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<TokenResponse, SessionError>> + Send;

    /// Best-effort server-side logout.
    fn logout(&self) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// "Who am I". With `bearer` unset only ambient credentials (cookies) apply.
    fn current_user(
        &self,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<CurrentUser, SessionError>> + Send;

    /// Drop any ambient credential (session cookie) held by the transport.
    fn forget_ambient(&self);
}

/// Cookie jar that can be emptied, so a local logout also ends the cookie
/// session when the server never answered.
#[derive(Default)]
struct SessionCookies {
    jar: RwLock<Jar>,
}

impl SessionCookies {
    fn clear(&self) {
        *self.jar.write().unwrap_or_else(PoisonError::into_inner) = Jar::default();
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cookies(url)
    }
}

/// [`AuthApi`] over HTTP with a cookie store, so the gateway's HTTP-only
/// session cookie rides along on every call.
#[derive(Clone)]
pub struct HttpAuthApi {
    http: reqwest::Client,
    cookies: Arc<SessionCookies>,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SessionError> {
        let cookies = Arc::new(SessionCookies::default());
        let http = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .build()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            cookies,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Send a request and return status plus parsed JSON (`Null` for empty bodies).
    async fn call(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<(StatusCode, Value), SessionError> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok((status, Value::Null));
        }

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(path, status = %status, error = %e, "Failed to parse response");
            SessionError::InvalidResponse(SessionError::UNPARSEABLE.to_string())
        })?;

        Ok((status, value))
    }

    /// Like [`Self::call`], turning failure statuses into [`SessionError::Rejected`]
    /// and decoding the success body.
    async fn call_for<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<&(impl Serialize + Sync)>,
        action: &str,
    ) -> Result<T, SessionError> {
        let (status, value) = self.call(method, path, bearer, body).await?;

        if !status.is_success() {
            return Err(rejection(status, &value, action));
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::error!(path, error = %e, "Unexpected response shape");
            SessionError::InvalidResponse(SessionError::UNPARSEABLE.to_string())
        })
    }
}

/// Build the rejection for a failure reply, preferring the server's message.
fn rejection(status: StatusCode, body: &Value, action: &str) -> SessionError {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} failed ({})", action, status.as_u16()));

    SessionError::Rejected {
        status: status.as_u16(),
        message,
    }
}

impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, SessionError> {
        self.call_for(Method::POST, "/api/login", None, Some(credentials), "Login")
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<TokenResponse, SessionError> {
        self.call_for(
            Method::POST,
            "/api/register",
            None,
            Some(registration),
            "Registration",
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SessionError> {
        let body = json!({ "refresh_token": refresh_token });
        self.call_for(Method::POST, "/api/refresh", None, Some(&body), "Token refresh")
            .await
    }

    async fn logout(&self) -> Result<(), SessionError> {
        let (status, value) = self
            .call(Method::POST, "/api/logout", None, None::<&Value>)
            .await?;
        if !status.is_success() {
            return Err(rejection(status, &value, "Logout"));
        }
        Ok(())
    }

    async fn current_user(&self, bearer: Option<&str>) -> Result<CurrentUser, SessionError> {
        self.call_for(
            Method::GET,
            "/api/users/me",
            bearer,
            None::<&Value>,
            "Loading user",
        )
        .await
    }

    fn forget_ambient(&self) {
        self.cookies.clear();
    }
}
