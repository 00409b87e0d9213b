// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::{AuthAdapter, AuthProvider, SocialProvider};
use crate::backend::{BackendClient, BackendError, ServerClock};
use crate::config::AppConfig;
use crate::wallet::WalletSession;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// The single wallet session; operations on it serialize
    pub session: Arc<Mutex<WalletSession>>,
    pub backend: BackendClient,
    pub clock: ServerClock,
    /// Social providers the login provider can serve
    pub login_providers: Vec<SocialProvider>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn AuthProvider>,
        login_providers: Vec<SocialProvider>,
    ) -> Result<Self, BackendError> {
        let config = Arc::new(config);
        let backend = BackendClient::new(&config.api_url)?;
        let session = WalletSession::new(config.clone(), AuthAdapter::new(provider), backend.clone());

        Ok(Self {
            config,
            session: Arc::new(Mutex::new(session)),
            backend,
            clock: ServerClock::new(),
            login_providers,
        })
    }

    /// Stop background work. Used on shutdown.
    pub async fn shutdown(&self) {
        self.session.lock().await.dispose();
    }
}
