// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! ArmorUp gateway: session-aware proxy in front of the ArmorUp backend.
//!
//! The crate has two halves. The axum gateway (`routes`) forwards browser
//! requests to the backend with a normalized bearer credential and relays the
//! replies. The `session` module is the client side of the same protocol:
//! token storage, start-up identity resolution, and login/register/logout.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use config::Config;
use services::BackendClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let backend = BackendClient::new(config.backend_url.clone());
        Self { config, backend }
    }
}
