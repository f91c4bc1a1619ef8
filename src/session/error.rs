// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session client errors.

use super::store::StoreError;

/// Errors reported by session commands.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server answered with a failure status. `message` is the server's
    /// own `error` text when it sent one, so forms can show it verbatim.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// A reply that cannot be used: unparseable, or missing tokens.
    #[error("{0}")]
    InvalidResponse(String),

    #[error("Unable to reach server: {0}")]
    Transport(String),

    #[error("Token storage failed: {0}")]
    Storage(#[from] StoreError),

    #[error("No active session")]
    NotAuthenticated,
}

impl SessionError {
    pub const MISSING_TOKENS: &'static str = "Invalid response: missing authentication tokens";
    pub const UNPARSEABLE: &'static str = "Invalid response from server";

    /// HTTP status for server rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            SessionError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
