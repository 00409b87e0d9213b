// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::UserInfo,
    error::ApiError,
    models::{LoginRequest, ViewportRequest, ViewportResponse},
    state::AppState,
    wallet::SessionSnapshot,
};

#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses((status = 200, body = SessionSnapshot))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let session = state.session.lock().await;
    Json(session.snapshot().await)
}

#[utoipa::path(
    post,
    path = "/v1/session/login",
    request_body = LoginRequest,
    tag = "Session",
    responses(
        (status = 200, body = SessionSnapshot),
        (status = 400, description = "Login provider unavailable"),
        (status = 502, description = "Login failed")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let mut session = state.session.lock().await;
    session.login(request.provider).await?;
    Ok(Json(session.snapshot().await))
}

#[utoipa::path(
    post,
    path = "/v1/session/logout",
    tag = "Session",
    responses((status = 200, body = SessionSnapshot))
)]
pub async fn logout(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let mut session = state.session.lock().await;
    session.logout().await?;
    Ok(Json(session.snapshot().await))
}

/// What the login provider knows about the connected user.
#[utoipa::path(
    get,
    path = "/v1/session/user",
    tag = "Session",
    responses(
        (status = 200, body = UserInfo),
        (status = 409, description = "Not logged in")
    )
)]
pub async fn get_user_info(State(state): State<AppState>) -> Result<Json<UserInfo>, ApiError> {
    let info = state.session.lock().await.user_info().await?;
    Ok(Json(info))
}

#[utoipa::path(
    put,
    path = "/v1/session/viewport",
    request_body = ViewportRequest,
    tag = "Session",
    responses((status = 200, body = ViewportResponse))
)]
pub async fn set_viewport(
    State(state): State<AppState>,
    Json(request): Json<ViewportRequest>,
) -> Json<ViewportResponse> {
    let ux_mode = state.session.lock().await.on_viewport_resize(request.width);
    Json(ViewportResponse { ux_mode })
}
