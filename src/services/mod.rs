// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - outbound integrations.

pub mod backend;

pub use backend::{BackendClient, BackendReply, RawReply};
