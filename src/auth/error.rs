// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login provider errors.

/// Errors raised by the login provider or the adapter around it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthProviderError {
    /// The provider SDK could not be initialized
    #[error("Login provider init failed: {0}")]
    InitFailed(String),
    /// No key source is configured for this social provider
    #[error("Login provider `{0}` is not available")]
    ProviderUnavailable(String),
    /// The provider refused or failed the login flow
    #[error("Login failed: {0}")]
    LoginFailed(String),
    /// The provider handle is unknown or already torn down
    #[error("Unknown or expired login session")]
    UnknownSession,
    /// Operation needs a connected session
    #[error("Not logged in")]
    NotConnected,
    /// Key material could not be produced
    #[error("Key material unavailable: {0}")]
    KeyUnavailable(String),
}

impl AuthProviderError {
    /// Stable error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthProviderError::InitFailed(_) => "auth_init_failed",
            AuthProviderError::ProviderUnavailable(_) => "auth_provider_unavailable",
            AuthProviderError::LoginFailed(_) => "auth_login_failed",
            AuthProviderError::UnknownSession => "auth_unknown_session",
            AuthProviderError::NotConnected => "auth_not_connected",
            AuthProviderError::KeyUnavailable(_) => "auth_key_unavailable",
        }
    }
}
