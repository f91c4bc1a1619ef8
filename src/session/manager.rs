// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session manager: the single owner of "who is signed in".
//!
//! Every command that mutates the session holds `in_flight` for its whole
//! duration, so overlapping logins, logouts and refreshes apply in order.

use super::api::AuthApi;
use super::error::SessionError;
use super::resolver::SessionResolver;
use super::store::TokenStore;
use crate::models::{Credentials, CurrentUser, Registration, TokenPair, TokenResponse};
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Initial state, and while a command is in flight.
    #[default]
    Loading,
    Ready,
}

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_user: Option<CurrentUser>,
    pub status: SessionStatus,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

/// Where the UI should go after a command completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Dashboard,
    Login,
}

impl Landing {
    pub fn path(&self) -> &'static str {
        match self {
            Landing::Dashboard => "/dashboard",
            Landing::Login => "/login",
        }
    }
}

pub struct SessionManager<A, S> {
    api: A,
    store: S,
    resolver: SessionResolver,
    state: watch::Sender<SessionState>,
    in_flight: Mutex<()>,
}

impl<A: AuthApi, S: TokenStore> SessionManager<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self::with_resolver(api, store, SessionResolver::default())
    }

    pub fn with_resolver(api: A, store: S, resolver: SessionResolver) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            api,
            store,
            resolver,
            state,
            in_flight: Mutex::new(()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.borrow().current_user.clone()
    }

    /// Resolve any existing session and move to `Ready`.
    pub async fn initialize(&self) {
        let _guard = self.in_flight.lock().await;
        self.set_status(SessionStatus::Loading);

        let resolution = self.resolver.resolve(&self.api, &self.store).await;
        let user = resolution.user().cloned();

        self.state.send_modify(|state| {
            state.current_user = user;
            state.status = SessionStatus::Ready;
        });
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Landing, SessionError> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let _guard = self.in_flight.lock().await;
        self.set_status(SessionStatus::Loading);

        let outcome = match self.api.login(&credentials).await {
            Ok(reply) => self.establish(reply).await,
            Err(e) => Err(e),
        };
        self.finish("Login", outcome)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Landing, SessionError> {
        let registration = Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let _guard = self.in_flight.lock().await;
        self.set_status(SessionStatus::Loading);

        let outcome = match self.api.register(&registration).await {
            Ok(reply) => self.establish(reply).await,
            Err(e) => Err(e),
        };
        self.finish("Registration", outcome)
    }

    /// End the session locally no matter what the server says.
    pub async fn logout(&self) -> Landing {
        let _guard = self.in_flight.lock().await;

        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Logout request failed");
        }
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear token storage");
        }
        self.api.forget_ambient();

        self.state.send_modify(|state| {
            state.current_user = None;
            state.status = SessionStatus::Ready;
        });
        tracing::info!("Logged out");
        Landing::Login
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// A 401 means the refresh token is no longer accepted, so the session
    /// is dropped.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let _guard = self.in_flight.lock().await;

        let tokens = self.store.get()?.ok_or(SessionError::NotAuthenticated)?;

        match self.api.refresh(&tokens.refresh_token).await {
            Ok(reply) => {
                let pair = token_pair(reply)?;
                self.store.set(&pair)?;
                tracing::debug!("Session tokens refreshed");
                Ok(())
            }
            Err(e) => {
                if e.status() == Some(401) {
                    tracing::info!("Refresh token rejected, ending session");
                    if let Err(clear_err) = self.store.clear() {
                        tracing::error!(error = %clear_err, "Failed to clear token storage");
                    }
                    self.state.send_modify(|state| state.current_user = None);
                }
                Err(e)
            }
        }
    }

    pub fn set_remember_me(&self, remember: bool) -> Result<(), SessionError> {
        self.store.set_remember_me(remember)?;
        Ok(())
    }

    /// Store the tokens from a login or registration reply, then load the user.
    async fn establish(&self, reply: TokenResponse) -> Result<(), SessionError> {
        let pair = token_pair(reply)?;
        self.store.set(&pair)?;

        match self.api.current_user(Some(pair.access_token.as_str())).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Session established");
                self.state.send_modify(|state| state.current_user = Some(user));
            }
            // The tokens are good; the user loads on the next resolve.
            Err(e) => tracing::warn!(error = %e, "Failed to load user after sign-in"),
        }
        Ok(())
    }

    fn finish(
        &self,
        action: &str,
        outcome: Result<(), SessionError>,
    ) -> Result<Landing, SessionError> {
        self.set_status(SessionStatus::Ready);
        match outcome {
            Ok(()) => Ok(Landing::Dashboard),
            Err(e) => {
                tracing::warn!(action, error = %e, "Sign-in failed");
                Err(e)
            }
        }
    }

    fn set_status(&self, status: SessionStatus) {
        self.state.send_if_modified(|state| {
            let changed = state.status != status;
            state.status = status;
            changed
        });
    }
}

fn token_pair(reply: TokenResponse) -> Result<TokenPair, SessionError> {
    reply
        .into_pair()
        .ok_or_else(|| SessionError::InvalidResponse(SessionError::MISSING_TOKENS.to_string()))
}
