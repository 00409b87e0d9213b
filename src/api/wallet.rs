// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::HeaderMap, Json};

use super::backend_token;
use crate::{
    error::ApiError,
    models::{
        AllowanceResponse, BalanceResponse, BetAmountRequest, BetAmountResponse, SignRequest, SignResponse,
        TradeRequest, TransferRequest,
    },
    state::AppState,
    wallet::{OperationOutcome, ProvisionReport},
};

#[utoipa::path(
    post,
    path = "/v1/wallet/provision",
    tag = "Wallet",
    responses(
        (status = 200, body = ProvisionReport),
        (status = 409, description = "Not logged in"),
        (status = 502, description = "Chain or backend failure")
    )
)]
pub async fn provision(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProvisionReport>, ApiError> {
    let token = backend_token(&headers);
    let mut session = state.session.lock().await;
    let report = session.provision(token.as_deref()).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/v1/wallet/allowance",
    tag = "Wallet",
    responses(
        (status = 200, body = AllowanceResponse),
        (status = 409, description = "Sender address not resolved")
    )
)]
pub async fn get_allowance(State(state): State<AppState>) -> Result<Json<AllowanceResponse>, ApiError> {
    let allowance = state.session.lock().await.get_allowance().await?;
    Ok(Json(AllowanceResponse { allowance }))
}

/// Last balance read by the poller, formatted with the token decimals.
#[utoipa::path(
    get,
    path = "/v1/wallet/balance",
    tag = "Wallet",
    responses(
        (status = 200, body = BalanceResponse),
        (status = 404, description = "Balance not read yet")
    )
)]
pub async fn get_balance(State(state): State<AppState>) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.session.lock().await.current_balance().await?;
    Ok(Json(BalanceResponse { balance }))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/allowance",
    tag = "Wallet",
    responses(
        (status = 200, body = OperationOutcome),
        (status = 409, description = "Sender address not resolved")
    )
)]
pub async fn set_allowance(State(state): State<AppState>) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state.session.lock().await.set_allowance().await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/v1/wallet/bet-amount",
    tag = "Wallet",
    responses((status = 200, body = BetAmountResponse))
)]
pub async fn get_bet_amount(State(state): State<AppState>) -> Json<BetAmountResponse> {
    let session = state.session.lock().await;
    Json(BetAmountResponse {
        selected: session.selected_bet_amount().to_string(),
        options: state.config.bet_amounts.clone(),
    })
}

#[utoipa::path(
    put,
    path = "/v1/wallet/bet-amount",
    request_body = BetAmountRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = BetAmountResponse),
        (status = 400, description = "Amount not offered")
    )
)]
pub async fn set_bet_amount(
    State(state): State<AppState>,
    Json(request): Json<BetAmountRequest>,
) -> Result<Json<BetAmountResponse>, ApiError> {
    let mut session = state.session.lock().await;
    session.set_bet_amount(&request.amount)?;
    Ok(Json(BetAmountResponse {
        selected: session.selected_bet_amount().to_string(),
        options: state.config.bet_amounts.clone(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/trade",
    request_body = TradeRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = OperationOutcome),
        (status = 409, description = "Sender address not resolved"),
        (status = 502, description = "User operation failed")
    )
)]
pub async fn make_trade(
    State(state): State<AppState>,
    Json(request): Json<TradeRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let outcome = state.session.lock().await.make_trade(request.direction).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/transfer",
    request_body = TransferRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = OperationOutcome),
        (status = 400, description = "Invalid amount or recipient"),
        (status = 409, description = "Sender address not resolved"),
        (status = 502, description = "User operation failed")
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let to = request.to.parse().map_err(ApiError::bad_request)?;
    let outcome = state.session.lock().await.transfer(&request.amount, to).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/sign",
    request_body = SignRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = SignResponse),
        (status = 409, description = "Signer not initialized")
    )
)]
pub async fn sign_message(
    State(state): State<AppState>,
    Json(request): Json<SignRequest>,
) -> Result<Json<SignResponse>, ApiError> {
    let session = state.session.lock().await;
    let address = session.signer_address()?;
    let signature = session.sign_message(request.message.as_bytes()).await?;

    Ok(Json(SignResponse {
        address: address.into(),
        signature: alloy::hex::encode_prefixed(signature.as_bytes()),
    }))
}
