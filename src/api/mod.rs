// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header, HeaderMap},
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{SocialProvider, UserInfo, UxMode},
    backend::{token_from_cookie_header, UserProfile},
    blockchain::Direction,
    config::AuthNetwork,
    models::{
        AllowanceResponse, BalanceResponse, BetAmountRequest, BetAmountResponse, ChainInfo,
        ClockResponse, LoginRequest, PublicConfig, SignRequest, SignResponse, TradeRequest,
        TransferRequest, ViewportRequest, ViewportResponse, WalletAddress,
    },
    state::AppState,
    wallet::{AllowanceCheck, OperationOutcome, ProvisionReport, SessionSnapshot, SessionState},
};

pub mod clock;
pub mod config;
pub mod health;
pub mod profile;
pub mod session;
pub mod wallet;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/config", get(config::get_config))
        .route("/session", get(session::get_session))
        .route("/session/login", post(session::login))
        .route("/session/logout", post(session::logout))
        .route("/session/user", get(session::get_user_info))
        .route("/session/viewport", put(session::set_viewport))
        .route("/profile", get(profile::get_profile))
        .route("/wallet/provision", post(wallet::provision))
        .route(
            "/wallet/allowance",
            get(wallet::get_allowance).post(wallet::set_allowance),
        )
        .route(
            "/wallet/bet-amount",
            get(wallet::get_bet_amount).put(wallet::set_bet_amount),
        )
        .route("/wallet/balance", get(wallet::get_balance))
        .route("/wallet/trade", post(wallet::make_trade))
        .route("/wallet/transfer", post(wallet::transfer))
        .route("/wallet/sign", post(wallet::sign_message))
        .route("/clock", get(clock::get_clock))
        .route("/clock/sync", post(clock::sync_clock))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Backend bearer token from the request's `token` cookie.
pub(crate) fn backend_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(token_from_cookie_header)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::liveness,
        health::readiness,
        config::get_config,
        session::get_session,
        session::login,
        session::logout,
        session::get_user_info,
        session::set_viewport,
        profile::get_profile,
        wallet::provision,
        wallet::get_allowance,
        wallet::set_allowance,
        wallet::get_balance,
        wallet::get_bet_amount,
        wallet::set_bet_amount,
        wallet::make_trade,
        wallet::transfer,
        wallet::sign_message,
        clock::get_clock,
        clock::sync_clock
    ),
    components(
        schemas(
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            PublicConfig,
            ChainInfo,
            AuthNetwork,
            SessionSnapshot,
            SessionState,
            SocialProvider,
            UxMode,
            UserInfo,
            LoginRequest,
            ViewportRequest,
            ViewportResponse,
            UserProfile,
            ProvisionReport,
            AllowanceCheck,
            OperationOutcome,
            AllowanceResponse,
            BalanceResponse,
            BetAmountRequest,
            BetAmountResponse,
            Direction,
            TradeRequest,
            TransferRequest,
            WalletAddress,
            SignRequest,
            SignResponse,
            ClockResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Config", description = "Public runtime configuration"),
        (name = "Session", description = "Login session and wallet state"),
        (name = "Profile", description = "Backend user profile"),
        (name = "Wallet", description = "Smart wallet provisioning and operations"),
        (name = "Clock", description = "Server time offset")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderValue, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_lists_wallet_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/v1/wallet/provision",
            "/v1/wallet/trade",
            "/v1/wallet/balance",
            "/v1/session/login",
            "/v1/clock/sync",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn backend_token_reads_any_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("token=t0k"));
        assert_eq!(backend_token(&headers).as_deref(), Some("t0k"));
        assert_eq!(backend_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn login_then_trade_before_provision_conflicts() {
        let app = router(test_state());

        let (status, body) = send(
            app.clone(),
            json_request("POST", "/v1/session/login", json!({ "provider": "google" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], json!(true));
        assert_eq!(body["state"], json!("uninitialized"));

        let (status, body) = send(
            app.clone(),
            json_request("POST", "/v1/wallet/trade", json!({ "direction": "up" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], json!("not_initialized"));

        let (status, body) = send(
            app,
            Request::builder()
                .uri("/v1/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["provider"], json!("google"));
    }

    #[tokio::test]
    async fn health_and_unknown_routes() {
        let app = router(test_state());

        let (status, body) = send(
            app.clone(),
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));

        let (status, _) = send(
            app,
            Request::builder().uri("/v1/nope").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
