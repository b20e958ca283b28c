// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::service::LicenseService;

/// Shared application state handed to every handler.
///
/// The service carries its own synchronization (the write gate), so the
/// state is just a cheaply cloned `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LicenseService>,
}

impl AppState {
    pub fn new(service: LicenseService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
