// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! REST client for the trading backend.

use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Cookie the UI stores the backend bearer token in.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Request(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Backend response was invalid: {0}")]
    InvalidResponse(String),

    #[error("No backend token in the request cookies")]
    MissingToken,
}

/// `GET /server-info` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub server_time: DateTime<Utc>,
}

/// `GET /users/profile` body. Fields this crate does not use are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    #[serde(default)]
    pub smart_wallet_address: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct StoreSmartWalletAddress<'a> {
    smart_wallet_address: &'a str,
}

/// Stateless client for the backend's profile and server-info endpoints.
/// No retries.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
}

impl BackendClient {
    pub fn new(api_url: &url::Url) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: api_url.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_server_info(&self) -> Result<ServerInfo, BackendError> {
        let response = send(self.http.get(self.endpoint("server-info"))).await?;
        decode(response).await
    }

    pub async fn get_profile(&self, token: &str) -> Result<UserProfile, BackendError> {
        let response = send(self.http.get(self.endpoint("users/profile")).bearer_auth(token)).await?;
        decode(response).await
    }

    pub async fn store_smart_wallet_address(
        &self,
        token: &str,
        smart_wallet_address: &str,
    ) -> Result<(), BackendError> {
        send(
            self.http
                .patch(self.endpoint("users/profile"))
                .bearer_auth(token)
                .json(&StoreSmartWalletAddress {
                    smart_wallet_address,
                }),
        )
        .await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    response
        .json()
        .await
        .map_err(|e| BackendError::InvalidResponse(e.to_string()))
}

/// Extract the backend token from a `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_router;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn token_cookie_is_found_among_others() {
        assert_eq!(
            token_from_cookie_header("theme=dark; token=abc.def; lang=en"),
            Some("abc.def".to_string())
        );
        assert_eq!(token_from_cookie_header("token="), None);
        assert_eq!(token_from_cookie_header("xtoken=1; tokens=2"), None);
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = BackendClient::new(&"https://api.example/v1/".parse().unwrap()).unwrap();
        assert_eq!(client.endpoint("users/profile"), "https://api.example/v1/users/profile");
    }

    #[tokio::test]
    async fn profile_calls_send_bearer_token() {
        let patched: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let store = patched.clone();

        let router = Router::new().route(
            "/users/profile",
            get(|headers: HeaderMap| async move {
                if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer tok") {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                Ok(Json(json!({ "id": 7, "smart_wallet_address": null })))
            })
            .patch(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer tok")
                );
                *store.lock().unwrap() = Some(body);
                StatusCode::OK
            }),
        );
        let url = spawn_router(router).await;
        let client = BackendClient::new(&url).unwrap();

        let profile = client.get_profile("tok").await.unwrap();
        assert_eq!(profile.smart_wallet_address, None);
        assert_eq!(profile.extra["id"], json!(7));

        client
            .store_smart_wallet_address("tok", "0x00000000000000000000000000000000000000aa")
            .await
            .unwrap();
        assert_eq!(
            patched.lock().unwrap().clone().unwrap(),
            json!({ "smart_wallet_address": "0x00000000000000000000000000000000000000aa" })
        );

        let denied = client.get_profile("wrong").await;
        assert!(matches!(denied, Err(BackendError::Status { status: 401, .. })));
    }

    #[tokio::test]
    async fn server_info_parses_iso_timestamp() {
        let router = Router::new().route(
            "/server-info",
            get(|| async { Json(json!({ "server_time": "2026-10-19T12:00:00.250Z" })) }),
        );
        let client = BackendClient::new(&spawn_router(router).await).unwrap();

        let info = client.get_server_info().await.unwrap();
        assert_eq!(info.server_time.timestamp_millis(), 1_792_411_200_250);
    }
}
