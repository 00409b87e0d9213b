// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth session held on top of a login provider.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::AuthProviderError;
use super::provider::{AuthProvider, KeyMaterial, ProviderHandle, SocialProvider, UserInfo, UxMode};

/// The connected login session. At most one per adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSession {
    pub handle: ProviderHandle,
    pub connected_at: DateTime<Utc>,
}

/// Wraps a login provider and tracks whether a user is connected.
pub struct AuthAdapter {
    provider: Arc<dyn AuthProvider>,
    session: Option<AuthSession>,
    ux_mode: UxMode,
    initialized: bool,
}

impl AuthAdapter {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            session: None,
            ux_mode: UxMode::Popup,
            initialized: false,
        }
    }

    /// Initialize the provider once. A failure leaves the adapter
    /// disconnected and is reported to the caller; later calls retry it.
    pub async fn init(&mut self) -> Result<(), AuthProviderError> {
        if self.initialized {
            return Ok(());
        }

        match self.provider.init().await {
            Ok(restored) => {
                self.initialized = true;
                if let Some(handle) = restored {
                    tracing::info!(provider = %handle.provider, "Restored login session");
                    self.session = Some(AuthSession {
                        handle,
                        connected_at: Utc::now(),
                    });
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Login provider init error");
                Err(e)
            }
        }
    }

    /// Log in with `provider`. On failure the adapter stays disconnected.
    pub async fn login(&mut self, provider: SocialProvider) -> Result<(), AuthProviderError> {
        self.init().await?;

        match self.provider.connect(provider, self.ux_mode).await {
            Ok(handle) => {
                tracing::info!(provider = %provider, "Logged in");
                self.session = Some(AuthSession {
                    handle,
                    connected_at: Utc::now(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!(provider = %provider, error = %e, "Login error");
                Err(e)
            }
        }
    }

    /// Tear down the session. Safe to call when already logged out.
    pub async fn logout(&mut self) -> Result<(), AuthProviderError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        if let Err(e) = self.provider.disconnect(&session.handle).await {
            tracing::warn!(error = %e, "Login provider disconnect failed; session cleared locally");
        }
        tracing::info!(provider = %session.handle.provider, "Logged out");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Key material for the connected session.
    pub async fn private_key(&self) -> Result<KeyMaterial, AuthProviderError> {
        let session = self.session.as_ref().ok_or(AuthProviderError::NotConnected)?;
        self.provider.private_key(&session.handle).await
    }

    pub async fn user_info(&self) -> Result<UserInfo, AuthProviderError> {
        let session = self.session.as_ref().ok_or(AuthProviderError::NotConnected)?;
        self.provider.user_info(&session.handle).await
    }

    pub fn ux_mode(&self) -> UxMode {
        self.ux_mode
    }

    /// Recompute the login presentation for a new viewport width.
    pub fn on_viewport_resize(&mut self, width: u32) -> UxMode {
        self.ux_mode = UxMode::for_viewport_width(width);
        self.ux_mode
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::provider::{KeySource, LocalKeyProvider};
    use crate::blockchain::signing::tests::TEST_KEY_HEX;
    use async_trait::async_trait;
    use std::collections::HashMap;

    pub(crate) fn local_provider() -> Arc<dyn AuthProvider> {
        let mut sources = HashMap::new();
        sources.insert(
            SocialProvider::Google,
            KeySource::Hex(KeyMaterial::new(TEST_KEY_HEX.to_string())),
        );
        Arc::new(LocalKeyProvider::new(sources))
    }

    struct BrokenProvider;

    #[async_trait]
    impl AuthProvider for BrokenProvider {
        async fn init(&self) -> Result<Option<ProviderHandle>, AuthProviderError> {
            Err(AuthProviderError::InitFailed("sdk offline".into()))
        }
        async fn connect(
            &self,
            _provider: SocialProvider,
            _ux_mode: UxMode,
        ) -> Result<ProviderHandle, AuthProviderError> {
            unreachable!("init never succeeds")
        }
        async fn disconnect(&self, _handle: &ProviderHandle) -> Result<(), AuthProviderError> {
            Ok(())
        }
        async fn private_key(
            &self,
            _handle: &ProviderHandle,
        ) -> Result<KeyMaterial, AuthProviderError> {
            Err(AuthProviderError::UnknownSession)
        }
        async fn user_info(&self, _handle: &ProviderHandle) -> Result<UserInfo, AuthProviderError> {
            Err(AuthProviderError::UnknownSession)
        }
    }

    #[tokio::test]
    async fn login_then_logout_cycles_connection() {
        let mut adapter = AuthAdapter::new(local_provider());
        adapter.init().await.unwrap();
        adapter.init().await.unwrap();
        assert!(!adapter.is_connected());

        adapter.login(SocialProvider::Google).await.unwrap();
        assert!(adapter.is_connected());
        assert_eq!(adapter.private_key().await.unwrap().expose(), TEST_KEY_HEX);

        adapter.logout().await.unwrap();
        assert!(!adapter.is_connected());
        assert_eq!(
            adapter.private_key().await.unwrap_err(),
            AuthProviderError::NotConnected
        );

        // second logout is a no-op
        adapter.logout().await.unwrap();
    }

    #[tokio::test]
    async fn failed_login_leaves_disconnected() {
        let mut adapter = AuthAdapter::new(local_provider());
        let result = adapter.login(SocialProvider::Facebook).await;
        assert!(result.is_err());
        assert!(!adapter.is_connected());
    }

    #[tokio::test]
    async fn init_failure_leaves_disconnected() {
        let mut adapter = AuthAdapter::new(Arc::new(BrokenProvider));
        assert!(adapter.init().await.is_err());
        assert!(adapter.login(SocialProvider::Google).await.is_err());
        assert!(!adapter.is_connected());
    }

    #[test]
    fn resize_toggles_ux_mode() {
        let mut adapter = AuthAdapter::new(local_provider());
        assert_eq!(adapter.on_viewport_resize(400), UxMode::Redirect);
        assert_eq!(adapter.ux_mode(), UxMode::Redirect);
        assert_eq!(adapter.on_viewport_resize(1024), UxMode::Popup);
    }
}
