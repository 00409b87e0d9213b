// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tracing::{info, warn};

use updown_wallet::{
    api::router, auth::LocalKeyProvider, config::AppConfig, logging::init_tracing,
    state::AppState,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let provider = LocalKeyProvider::from_env();
    let login_providers = provider.configured_providers();
    if login_providers.is_empty() {
        warn!("No login keys configured; every login will be refused");
    }

    info!(
        chain = %config.chain.display_name,
        chain_id = config.chain.chain_id,
        token = %config.token_address,
        contract = %config.contract_address,
        pool_id = %config.pool_id,
        "Configuration loaded"
    );

    let addr = SocketAddr::new(config.host, config.port);
    let state = AppState::new(config, Arc::new(provider), login_providers)?;

    {
        let mut session = state.session.lock().await;
        if let Err(e) = session.init().await {
            warn!(error = %e, "Login provider not ready; it will be retried on login");
        }
        // chain clients do not depend on the user
        if let Err(e) = session.init_clients() {
            warn!(error = %e, "Chain clients unavailable until provisioning");
        }
    }

    let app = router(state.clone());

    let handle = axum_server::Handle::new();
    tokio::spawn(shutdown_signal(handle.clone(), state));

    info!("Updown wallet listening on http://{addr} (docs at /docs)");
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(handle: axum_server::Handle<SocketAddr>, state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }

    info!("Shutdown requested");
    state.shutdown().await;
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
