// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;
use crate::wallet::SessionState;

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    pub checks: HealthChecks,
}

/// Individual readiness check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    pub service: String,
    /// Backend REST API reachability ("ok" or "unavailable").
    pub backend: String,
    pub session: SessionState,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 503 when the backend REST API does not answer `/server-info`.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Backend unavailable", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let backend_ok = state.backend.get_server_info().await.is_ok();
    let session = state.session.lock().await.state();

    let response = ReadyResponse {
        status: if backend_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            backend: if backend_ok { "ok" } else { "unavailable" }.to_string(),
            session,
        },
    };

    let status = if backend_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state_with_api;
    use crate::test_support::spawn_router;
    use axum::{routing::get, Router};
    use serde_json::json;

    #[tokio::test]
    async fn liveness_is_always_ok() {
        assert_eq!(liveness().await.status, "ok");
    }

    #[tokio::test]
    async fn readiness_follows_backend() {
        let router = Router::new().route(
            "/server-info",
            get(|| async { Json(json!({ "server_time": "2026-10-19T12:00:00Z" })) }),
        );
        let state = test_state_with_api(&spawn_router(router).await);
        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.backend, "ok");
        assert_eq!(body.checks.session, SessionState::Uninitialized);

        // nothing listens on port 1
        let down = test_state_with_api(&"http://127.0.0.1:1/".parse().unwrap());
        let (status, Json(body)) = readiness(State(down)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
    }
}
