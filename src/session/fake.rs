// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scriptable [`AuthApi`] for unit tests.

use super::api::AuthApi;
use super::error::SessionError;
use crate::models::{Credentials, CurrentUser, Registration, TokenResponse};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn user(id: u64, username: &str) -> CurrentUser {
    CurrentUser {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
    }
}

pub fn tokens(access: &str, refresh: &str) -> TokenResponse {
    TokenResponse {
        access_token: Some(access.to_string()),
        refresh_token: Some(refresh.to_string()),
        token_type: Some("Bearer".to_string()),
        expires_in: Some(900),
    }
}

pub fn rejected(status: u16, message: &str) -> SessionError {
    SessionError::Rejected {
        status,
        message: message.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    Register(String),
    Refresh(String),
    Logout,
    CurrentUser(Option<String>),
}

type Reply = fn() -> Result<TokenResponse, SessionError>;

fn not_scripted() -> Result<TokenResponse, SessionError> {
    Err(SessionError::Transport("not scripted".to_string()))
}

/// Identity answers come from `cookie_user` (no bearer) or `bearer_users`.
/// Token endpoints replay their scripted reply.
pub struct FakeAuthApi {
    cookie_user: Mutex<Option<CurrentUser>>,
    bearer_users: Mutex<HashMap<String, CurrentUser>>,
    login_reply: Reply,
    register_reply: Reply,
    refresh_reply: Reply,
    logout_fails: bool,
    login_delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self {
            cookie_user: Mutex::new(None),
            bearer_users: Mutex::new(HashMap::new()),
            login_reply: not_scripted,
            register_reply: not_scripted,
            refresh_reply: not_scripted,
            logout_fails: false,
            login_delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_cookie_user(self, user: CurrentUser) -> Self {
        *self.cookie_user.lock().unwrap() = Some(user);
        self
    }

    pub fn with_bearer_user(self, token: &str, user: CurrentUser) -> Self {
        self.bearer_users
            .lock()
            .unwrap()
            .insert(token.to_string(), user);
        self
    }

    pub fn with_login(mut self, reply: Reply) -> Self {
        self.login_reply = reply;
        self
    }

    pub fn with_register(mut self, reply: Reply) -> Self {
        self.register_reply = reply;
        self
    }

    pub fn with_refresh(mut self, reply: Reply) -> Self {
        self.refresh_reply = reply;
        self
    }

    pub fn with_failing_logout(mut self) -> Self {
        self.logout_fails = true;
        self
    }

    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Bearer argument of every "who am I" call, in order.
    pub fn identity_calls(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CurrentUser(bearer) => Some(bearer),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AuthApi for FakeAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, SessionError> {
        self.record(Call::Login(credentials.email.clone()));
        if let Some(delay) = self.login_delay {
            tokio::time::sleep(delay).await;
        }
        (self.login_reply)()
    }

    async fn register(&self, registration: &Registration) -> Result<TokenResponse, SessionError> {
        self.record(Call::Register(registration.username.clone()));
        (self.register_reply)()
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SessionError> {
        self.record(Call::Refresh(refresh_token.to_string()));
        (self.refresh_reply)()
    }

    async fn logout(&self) -> Result<(), SessionError> {
        self.record(Call::Logout);
        if self.logout_fails {
            return Err(SessionError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    async fn current_user(&self, bearer: Option<&str>) -> Result<CurrentUser, SessionError> {
        self.record(Call::CurrentUser(bearer.map(str::to_string)));
        let found = match bearer {
            None => self.cookie_user.lock().unwrap().clone(),
            Some(token) => self.bearer_users.lock().unwrap().get(token).cloned(),
        };
        found.ok_or_else(|| rejected(401, "Unauthorized"))
    }

    fn forget_ambient(&self) {
        *self.cookie_user.lock().unwrap() = None;
    }
}
