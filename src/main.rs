// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use relational_license_server::{
    api::router,
    config::{Config, LOG_FORMAT_ENV},
    service::LicenseService,
    state::AppState,
    store::Store,
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("Failed to load configuration");
    let store = Store::from_config(&config.store).expect("Failed to initialize license store");
    tracing::info!(backend = store.backend_name(), "license store ready");

    let state = AppState::new(LicenseService::new(store));
    let app = router(state);

    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!("License server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

/// Route logs through `RUST_LOG`, defaulting to info with verbose HTTP traces.
/// `LOG_FORMAT=json` switches to newline-delimited JSON for log shippers.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install shutdown signal handler");
    tracing::info!("Shutdown signal received, draining connections");
}
