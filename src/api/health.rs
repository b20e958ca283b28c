// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Availability of the configured store backend.
    pub store: String,
}

/// Plain-text banner served at the root path.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service banner", body = String, content_type = "text/plain"))
)]
pub async fn banner() -> &'static str {
    "License server running. Use the /admin/api endpoint to manage licenses."
}

/// Health check endpoint handler.
///
/// Returns 200 if the store probe passes, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let store = match state.service.store_health().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            warn!(
                error = %e,
                backend = state.service.backend_name(),
                "store health check failed"
            );
            "unavailable".to_string()
        }
    };

    let all_ok = store == "ok";
    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            store,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::LicenseService;
    use crate::store::{FileStore, Store};

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = Store::File(FileStore::new(dir.path().join("licenses.json")));
        (AppState::new(LicenseService::new(store)), dir)
    }

    #[tokio::test]
    async fn banner_points_at_the_admin_api() {
        let text = banner().await;
        assert!(text.contains("/admin/api"));
    }

    #[tokio::test]
    async fn health_reports_ok_over_a_writable_store() {
        let (state, _dir) = test_state();

        let (status, Json(response)) = health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.status, "ok");
        assert_eq!(response.checks.service, "ok");
        assert_eq!(response.checks.store, "ok");
    }
}
