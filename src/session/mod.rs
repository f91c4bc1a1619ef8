// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client side of the session protocol.
//!
//! - `store`: durable token pair and remember-me flag
//! - `resolver`: start-up identity resolution (cookie, then stored bearer)
//! - `manager`: login, registration, logout and refresh
//! - `api`: the transport the manager talks through

pub mod api;
pub mod error;
pub mod manager;
pub mod resolver;
pub mod store;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{AuthApi, HttpAuthApi};
pub use error::SessionError;
pub use manager::{Landing, SessionManager, SessionState, SessionStatus};
pub use resolver::{Resolution, ResolveStrategy, SessionResolver};
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, StoredSession, TokenStore};
