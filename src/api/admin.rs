// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin API endpoints for license management.
//!
//! These endpoints back the admin panel and provide:
//! - The full license list
//! - Issuing new licenses
//! - Toggling, resetting, and deleting existing ones
//! - A read-only validity check
//!
//! Access control is handled outside this service; every route here is
//! reachable by whoever can reach the deployment.

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{
        ActionResponse, AddLicenseResponse, CheckValidityRequest, KeyRequest, License,
        ValidityResponse,
    },
    service::LicenseError,
    state::AppState,
};

/// Every stored license as a bare JSON array.
#[utoipa::path(
    get,
    path = "/admin/api",
    tag = "Admin",
    responses((status = 200, description = "All license records", body = [License]))
)]
pub async fn list_licenses(
    State(state): State<AppState>,
) -> Result<Json<Vec<License>>, ApiError> {
    let licenses = state.service.list().await.map_err(|e| {
        tracing::error!(error = %e, "failed to load licenses");
        ApiError::internal("Failed to load licenses")
    })?;
    Ok(Json(licenses))
}

/// Issue a new license with a freshly generated key.
#[utoipa::path(
    post,
    path = "/admin/add",
    tag = "Admin",
    responses(
        (status = 200, description = "License created", body = AddLicenseResponse),
        (status = 500, description = "Key generation exhausted its attempts")
    )
)]
pub async fn add_license(
    State(state): State<AppState>,
) -> Result<Json<AddLicenseResponse>, ApiError> {
    let license = state.service.add().await.map_err(|e| match e {
        LicenseError::GenerationExhausted => {
            ApiError::internal("Failed to generate a unique license key")
        }
        _ => {
            tracing::error!(error = %e, "failed to create license");
            ApiError::internal("Failed to create license")
        }
    })?;

    Ok(Json(AddLicenseResponse {
        success: true,
        message: "New license created".to_string(),
        license,
    }))
}

/// Flip a license between active and inactive.
#[utoipa::path(
    post,
    path = "/admin/toggle",
    request_body = KeyRequest,
    tag = "Admin",
    responses(
        (status = 200, body = ActionResponse),
        (status = 404, description = "License not found")
    )
)]
pub async fn toggle_license(
    State(state): State<AppState>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let license = state
        .service
        .toggle(&request.key)
        .await
        .map_err(|e| match e {
            LicenseError::NotFound => ApiError::not_found("License not found"),
            _ => {
                tracing::error!(error = %e, "failed to toggle license");
                ApiError::internal("Failed to toggle license")
            }
        })?;

    Ok(Json(ActionResponse {
        success: true,
        message: format!(
            "License is now {}",
            if license.active { "active" } else { "inactive" }
        ),
        key: license.key,
    }))
}

/// Remove a license entirely.
#[utoipa::path(
    post,
    path = "/admin/delete",
    request_body = KeyRequest,
    tag = "Admin",
    responses(
        (status = 200, body = ActionResponse),
        (status = 404, description = "License not found")
    )
)]
pub async fn delete_license(
    State(state): State<AppState>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    state
        .service
        .delete(&request.key)
        .await
        .map_err(|e| match e {
            LicenseError::NotFound => ApiError::not_found("License not found"),
            _ => {
                tracing::error!(error = %e, "failed to delete license");
                ApiError::internal("Failed to delete license")
            }
        })?;

    Ok(Json(ActionResponse {
        success: true,
        message: "License deleted".to_string(),
        key: request.key,
    }))
}

/// Clear a license's `used` flag so it can be redeemed again.
#[utoipa::path(
    post,
    path = "/admin/reset",
    request_body = KeyRequest,
    tag = "Admin",
    responses(
        (status = 200, body = ActionResponse),
        (status = 404, description = "License not found")
    )
)]
pub async fn reset_license(
    State(state): State<AppState>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let license = state
        .service
        .reset(&request.key)
        .await
        .map_err(|e| match e {
            LicenseError::NotFound => ApiError::not_found("License not found"),
            _ => {
                tracing::error!(error = %e, "failed to reset license");
                ApiError::internal("Failed to reset license")
            }
        })?;

    Ok(Json(ActionResponse {
        success: true,
        message: "License usage reset".to_string(),
        key: license.key,
    }))
}

/// Read-only validity check.
///
/// Always answers 200 with a validity flag; an unknown or missing key is
/// reported in the body, never as an HTTP error. The `used` flag does not
/// affect validity.
#[utoipa::path(
    post,
    path = "/admin/check-valid",
    request_body = CheckValidityRequest,
    tag = "Admin",
    responses((status = 200, description = "Validity report", body = ValidityResponse))
)]
pub async fn check_validity(
    State(state): State<AppState>,
    Json(request): Json<CheckValidityRequest>,
) -> Result<Json<ValidityResponse>, ApiError> {
    let key = request.key.unwrap_or_default();
    let reason = state.service.check_validity(&key).await.map_err(|e| {
        tracing::error!(error = %e, "failed to check license validity");
        ApiError::internal("Failed to check license")
    })?;

    Ok(Json(ValidityResponse {
        valid: reason.is_none(),
        reason,
    }))
}
