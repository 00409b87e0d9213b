// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process HTTP fixtures for tests.

use std::sync::Arc;

use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// One decoded JSON-RPC request.
#[derive(Debug, Clone)]
pub struct RpcCall {
    pub method: String,
    pub params: Value,
}

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_router(router: Router) -> url::Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/").parse().unwrap()
}

/// Serve a JSON-RPC endpoint whose results come from `handler`. An `Err`
/// becomes a JSON-RPC error object.
pub async fn spawn_json_rpc<F>(handler: F) -> url::Url
where
    F: Fn(RpcCall) -> Result<Value, String> + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    let router = Router::new().route(
        "/",
        post(move |Json(body): Json<Value>| {
            let handler = handler.clone();
            async move {
                let respond = |request: &Value| {
                    let call = RpcCall {
                        method: request["method"].as_str().unwrap_or_default().to_string(),
                        params: request["params"].clone(),
                    };
                    match handler(call) {
                        Ok(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
                        Err(message) => json!({
                            "jsonrpc": "2.0",
                            "id": request["id"],
                            "error": { "code": -32000, "message": message }
                        }),
                    }
                };

                match &body {
                    Value::Array(batch) => Json(Value::Array(batch.iter().map(respond).collect())),
                    single => Json(respond(single)),
                }
            }
        }),
    );

    spawn_router(router).await
}
