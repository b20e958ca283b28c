// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public license redemption endpoint.
//!
//! This is the one route exposed to client applications. Redemption is
//! one-shot: the first successful call marks the license used and every
//! later call is rejected with 409.

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{VerifyRequest, VerifyResponse},
    service::LicenseError,
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/verify-license",
    request_body = VerifyRequest,
    tag = "Verification",
    responses(
        (status = 200, description = "License redeemed", body = VerifyResponse),
        (status = 400, description = "Empty or unknown license key"),
        (status = 403, description = "License is not active"),
        (status = 409, description = "License has already been used")
    )
)]
pub async fn verify_license(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let raw_key = request.license_key.unwrap_or_default();
    let license = state.service.verify(&raw_key).await.map_err(|e| match e {
        LicenseError::EmptyKey => ApiError::bad_request("License key is empty"),
        LicenseError::NotFound => ApiError::bad_request("License not found"),
        LicenseError::Inactive => ApiError::forbidden("License is not active"),
        LicenseError::AlreadyUsed => ApiError::conflict("License has already been used"),
        _ => {
            tracing::error!(error = %e, "failed to verify license");
            ApiError::internal("Failed to verify license")
        }
    })?;

    Ok(Json(VerifyResponse {
        success: true,
        key: license.key,
    }))
}
