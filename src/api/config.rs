// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    models::{ChainInfo, PublicConfig},
    state::AppState,
};

/// Public runtime configuration for the UI.
#[utoipa::path(
    get,
    path = "/v1/config",
    tag = "Config",
    responses((status = 200, body = PublicConfig))
)]
pub async fn get_config(State(state): State<AppState>) -> Json<PublicConfig> {
    let config = &state.config;
    let chain = &config.chain;

    Json(PublicConfig {
        is_mainnet: config.is_mainnet,
        chain: ChainInfo {
            chain_id: chain.chain_id,
            chain_id_hex: chain.chain_id_hex(),
            display_name: chain.display_name.clone(),
            native_currency_symbol: chain.native_currency_symbol.clone(),
            native_currency_name: chain.native_currency_name.clone(),
            explorer_url: chain.explorer_url.clone(),
        },
        client_id: config.client_id.clone(),
        auth_network: config.auth_network,
        ws_host: config.ws_host.clone(),
        token_address: config.token_address.into(),
        contract_address: config.contract_address.into(),
        token_decimals: config.token_decimals,
        bet_amounts: config.bet_amounts.clone(),
        default_bet_amount: config.default_bet_amount.clone(),
        pool_id: config.pool_id.clone(),
        login_providers: state.login_providers.clone(),
    })
}
