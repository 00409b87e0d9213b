// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::HeaderMap, Json};

use super::backend_token;
use crate::{
    backend::{BackendError, UserProfile},
    error::ApiError,
    state::AppState,
    wallet::WalletError,
};

/// Backend profile of the user whose `token` cookie accompanies the request.
#[utoipa::path(
    get,
    path = "/v1/profile",
    tag = "Profile",
    responses(
        (status = 200, body = UserProfile),
        (status = 400, description = "No token cookie"),
        (status = 502, description = "Backend failure")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let token = backend_token(&headers)
        .ok_or_else(|| ApiError::from(WalletError::Backend(BackendError::MissingToken)))?;

    let profile = state.backend.get_profile(&token).await.map_err(|e| {
        tracing::warn!(error = %e, "Profile fetch failed");
        ApiError::from(WalletError::Backend(e))
    })?;
    Ok(Json(profile))
}
