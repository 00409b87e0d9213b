// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Offset between the local clock and the backend's clock.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};

use super::client::{BackendClient, BackendError};

/// Shared store for the server-time offset, in milliseconds.
///
/// `offset = local_now - server_time`, so the server's current time is
/// `local_now - offset`. Zero until the first successful sync.
#[derive(Debug, Clone, Default)]
pub struct ServerClock {
    offset_ms: Arc<AtomicI64>,
}

impl ServerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Relaxed)
    }

    /// Record the offset between `server_time` and `local_now`.
    pub fn record(&self, server_time: DateTime<Utc>, local_now: DateTime<Utc>) -> i64 {
        let offset = local_now.timestamp_millis() - server_time.timestamp_millis();
        self.offset_ms.store(offset, Ordering::Relaxed);
        offset
    }

    /// Best estimate of the backend's current time.
    pub fn server_now(&self) -> DateTime<Utc> {
        Utc::now() - chrono::Duration::milliseconds(self.offset_ms())
    }

    /// Fetch the server time and store the new offset. On failure the
    /// previous offset is left untouched.
    pub async fn sync(&self, backend: &BackendClient) -> Result<i64, BackendError> {
        match backend.get_server_info().await {
            Ok(info) => {
                let offset = self.record(info.server_time, Utc::now());
                tracing::debug!(offset_ms = offset, "Server clock synced");
                Ok(offset)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Server clock sync failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_router;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    #[test]
    fn offset_is_local_minus_server() {
        let clock = ServerClock::new();
        assert_eq!(clock.offset_ms(), 0);

        let server = DateTime::parse_from_rfc3339("2026-10-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let local = server + chrono::Duration::milliseconds(1_500);

        assert_eq!(clock.record(server, local), 1_500);
        assert_eq!(clock.offset_ms(), 1_500);

        // local clock behind the server
        assert_eq!(clock.record(local, server), -1_500);
    }

    #[tokio::test]
    async fn sync_against_backend_updates_shared_offset() {
        let server_time = Utc::now() - chrono::Duration::hours(1);
        let router = Router::new().route(
            "/server-info",
            get(move || async move { Json(json!({ "server_time": server_time.to_rfc3339() })) }),
        );
        let backend = BackendClient::new(&spawn_router(router).await).unwrap();

        let clock = ServerClock::new();
        let shared = clock.clone();
        let offset = clock.sync(&backend).await.unwrap();

        assert!(offset >= 3_600_000);
        assert!(offset < 3_660_000);
        assert_eq!(shared.offset_ms(), offset);
    }

    #[tokio::test]
    async fn failed_sync_keeps_previous_offset() {
        let router = Router::new().route(
            "/server-info",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let backend = BackendClient::new(&spawn_router(router).await).unwrap();

        let clock = ServerClock::new();
        let now = Utc::now();
        clock.record(now, now + chrono::Duration::milliseconds(42));

        assert!(clock.sync(&backend).await.is_err());
        assert_eq!(clock.offset_ms(), 42);
    }
}
