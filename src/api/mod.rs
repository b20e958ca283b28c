// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        ActionResponse, AddLicenseResponse, CheckValidityRequest, KeyRequest, License,
        ValidityReason, ValidityResponse, VerifyRequest, VerifyResponse,
    },
    state::AppState,
};

pub mod admin;
pub mod health;
pub mod verify;

/// Build the application router.
///
/// `/admin` and `/admin/api` serve the same list; dashboards fetch the
/// latter while operators tend to curl the former.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health))
        .route("/admin", get(admin::list_licenses))
        .route("/admin/api", get(admin::list_licenses))
        .route("/admin/add", post(admin::add_license))
        .route("/admin/toggle", post(admin::toggle_license))
        .route("/admin/delete", post(admin::delete_license))
        .route("/admin/reset", post(admin::reset_license))
        .route("/admin/check-valid", post(admin::check_validity))
        .route("/verify-license", post(verify::verify_license))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::banner,
        health::health,
        admin::list_licenses,
        admin::add_license,
        admin::toggle_license,
        admin::delete_license,
        admin::reset_license,
        admin::check_validity,
        verify::verify_license
    ),
    components(
        schemas(
            License,
            KeyRequest,
            CheckValidityRequest,
            VerifyRequest,
            ActionResponse,
            AddLicenseResponse,
            VerifyResponse,
            ValidityReason,
            ValidityResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Admin", description = "License administration"),
        (name = "Verification", description = "One-time license redemption"),
        (name = "Health", description = "Service banner and health probes")
    )
)]
struct ApiDoc;
