// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential extraction middleware.
//!
//! Tokens are opaque here; validating them is the backend's job. This layer
//! only makes sure one is present and hands it to the proxy in a normalized
//! form.

use crate::error::AppError;
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

/// HTTP-only cookie set by the login and register routes.
pub const SESSION_COOKIE: &str = "token";
/// Cookie name read by older clients.
pub const LEGACY_SESSION_COOKIE: &str = "accessToken";

/// Bearer credential of the inbound request.
#[derive(Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Middleware that requires a credential and stores it as a request extension.
pub async fn require_credential(mut request: Request, next: Next) -> Result<Response, AppError> {
    let Some(token) = extract_credential(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Rejecting request without credential");
        return Err(AppError::MissingCredential);
    };

    request.extensions_mut().insert(token);
    Ok(next.run(request).await)
}

/// Header first, then the session cookie, then the legacy cookie.
pub fn extract_credential(headers: &HeaderMap) -> Option<BearerToken> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_from_header);

    if let Some(token) = from_header {
        return Some(BearerToken(token.to_string()));
    }

    let jar = CookieJar::from_headers(headers);
    [SESSION_COOKIE, LEGACY_SESSION_COOKIE]
        .iter()
        .filter_map(|name| jar.get(name))
        .map(|cookie| cookie.value().trim())
        .find(|value| !value.is_empty())
        .map(|value| BearerToken(value.to_string()))
}

/// Token part of `Bearer <token>`. The scheme is matched case-insensitively.
fn bearer_from_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_header_takes_precedence_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "token=from-cookie"),
        ]);
        assert_eq!(extract_credential(&map).unwrap().as_str(), "from-header");
    }

    #[test]
    fn test_session_cookie_then_legacy_cookie() {
        let map = headers(&[(header::COOKIE, "accessToken=legacy; token=current")]);
        assert_eq!(extract_credential(&map).unwrap().as_str(), "current");

        let map = headers(&[(header::COOKIE, "accessToken=legacy")]);
        assert_eq!(extract_credential(&map).unwrap().as_str(), "legacy");
    }

    #[test]
    fn test_malformed_header_falls_back_to_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "token=from-cookie"),
        ]);
        assert_eq!(extract_credential(&map).unwrap().as_str(), "from-cookie");
    }

    #[test]
    fn test_missing_credential() {
        assert!(extract_credential(&HeaderMap::new()).is_none());

        let map = headers(&[
            (header::AUTHORIZATION, "Bearer "),
            (header::COOKIE, "token=; theme=dark"),
        ]);
        assert!(extract_credential(&map).is_none());
    }

    #[test]
    fn test_bearer_scheme_case_insensitive() {
        assert_eq!(bearer_from_header("bearer abc"), Some("abc"));
        assert_eq!(bearer_from_header("BEARER  abc "), Some("abc"));
        assert_eq!(bearer_from_header("Token abc"), None);
    }
}
