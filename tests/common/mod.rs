// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use armorup_gateway::config::Config;
use armorup_gateway::routes::create_router;
use armorup_gateway::AppState;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// One request as the backend saw it.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path plus query string.
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

type ReplyKey = (Method, String);

#[derive(Clone, Default)]
struct BackendState {
    calls: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<HashMap<ReplyKey, (StatusCode, String)>>>,
}

/// In-process stand-in for the backend service.
///
/// Records every request. Unscripted routes answer `404 {"error": ...}`.
pub struct FakeBackend {
    addr: SocketAddr,
    state: BackendState,
}

#[allow(dead_code)]
impl FakeBackend {
    pub async fn start() -> Self {
        let state = BackendState::default();
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Script a raw reply for `method path` (path without query).
    pub fn reply_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.state.replies.lock().unwrap().insert(
            (method, path.to_string()),
            (StatusCode::from_u16(status).unwrap(), body.to_string()),
        );
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: Value) {
        self.reply_raw(method, path, status, &body.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> RecordedRequest {
        self.calls().pop().expect("backend was never called")
    }
}

async fn record(
    State(state): State<BackendState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    state.calls.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let scripted = state
        .replies
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();

    match scripted {
        Some((status, body)) if body.is_empty() => status.into_response(),
        Some((status, body)) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "route not registered" })),
        )
            .into_response(),
    }
}

/// Backend URL nothing listens on.
#[allow(dead_code)]
pub fn unreachable_backend_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Create a gateway router pointed at `backend_url`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(backend_url: &str) -> (Router, Arc<AppState>) {
    let config = Config::test_default().with_backend_url(backend_url);
    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Serve the gateway on an ephemeral port; returns its base URL.
#[allow(dead_code)]
pub async fn spawn_gateway(backend_url: &str) -> String {
    let (app, _) = create_test_app(backend_url);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[allow(dead_code)]
pub fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    axum::http::Request::builder().method(method).uri(uri)
}

#[allow(dead_code)]
pub fn json_body(value: Value) -> Body {
    Body::from(value.to_string())
}

/// All `Set-Cookie` header values of a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}
