// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{error::ApiError, models::ClockResponse, state::AppState, wallet::WalletError};

#[utoipa::path(
    get,
    path = "/v1/clock",
    tag = "Clock",
    responses((status = 200, body = ClockResponse))
)]
pub async fn get_clock(State(state): State<AppState>) -> Json<ClockResponse> {
    Json(ClockResponse {
        offset_ms: state.clock.offset_ms(),
        server_now: state.clock.server_now(),
    })
}

/// Fetch the backend's server time and store the new offset.
#[utoipa::path(
    post,
    path = "/v1/clock/sync",
    tag = "Clock",
    responses(
        (status = 200, body = ClockResponse),
        (status = 502, description = "Backend failure")
    )
)]
pub async fn sync_clock(State(state): State<AppState>) -> Result<Json<ClockResponse>, ApiError> {
    let offset_ms = state
        .clock
        .sync(&state.backend)
        .await
        .map_err(|e| ApiError::from(WalletError::Backend(e)))?;

    Ok(Json(ClockResponse {
        offset_ms,
        server_now: state.clock.server_now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state_with_api;
    use crate::test_support::spawn_router;
    use axum::{http::StatusCode, routing::get, Router};
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn sync_stores_offset_for_later_reads() {
        let server_time = Utc::now() + chrono::Duration::minutes(10);
        let router = Router::new().route(
            "/server-info",
            get(move || async move { Json(json!({ "server_time": server_time.to_rfc3339() })) }),
        );
        let state = test_state_with_api(&spawn_router(router).await);

        let Json(synced) = sync_clock(State(state.clone())).await.expect("sync succeeds");
        assert!(synced.offset_ms <= -590_000);

        let Json(read) = get_clock(State(state)).await;
        assert_eq!(read.offset_ms, synced.offset_ms);
        let drift = (read.server_now - server_time).num_seconds().abs();
        assert!(drift < 60);
    }

    #[tokio::test]
    async fn backend_failure_is_bad_gateway() {
        let state = test_state_with_api(&"http://127.0.0.1:1/".parse().unwrap());
        let err = sync_clock(State(state.clone())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(state.clock.offset_ms(), 0);
    }
}
