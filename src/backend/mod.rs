// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trading backend REST API: user profile and server time.

pub mod client;
pub mod clock;

pub use client::{
    token_from_cookie_header, BackendClient, BackendError, ServerInfo, UserProfile, TOKEN_COOKIE,
};
pub use clock::ServerClock;
