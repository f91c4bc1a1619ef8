// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models shared by the gateway and the session client.

pub mod encouragement;
pub mod token;
pub mod user;

pub use encouragement::StruggleLog;
pub use token::{TokenPair, TokenResponse};
pub use user::{Credentials, CurrentUser, Registration};
