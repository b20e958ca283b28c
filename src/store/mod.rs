// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # License Store
//!
//! Persistence layer for license records. The [`LicenseStore`] trait is the
//! seam between the lifecycle service and the two interchangeable backends:
//!
//! - [`FileStore`]: a single JSON document on the local filesystem
//! - [`RemoteStore`]: a keyed JSON tree on a remote store, reached over HTTP
//!
//! The backend is selected once at startup from configuration and carried as
//! the [`Store`] enum; everything above this module is backend-agnostic.
//!
//! Neither backend offers multi-key atomicity. Callers that need a
//! read-modify-write sequence to be exclusive serialize it themselves (see
//! the lifecycle service's write gate).

pub mod file;
pub mod remote;

pub use file::FileStore;
pub use remote::RemoteStore;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::models::License;

/// Error type for license store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure reaching the remote store
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote store answered with a non-success status
    #[error("remote store returned HTTP {0}")]
    RemoteStatus(u16),

    /// The store was configured with unusable parameters
    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Abstract store for license records.
///
/// Backends are flat key-value collections: one record per license key, no
/// secondary indexes, no transactions. All operations are async; every call
/// reaches the underlying medium (no caching layer in between).
#[async_trait]
pub trait LicenseStore: Send + Sync {
    /// Retrieve every stored license. Order is not significant.
    async fn get_all(&self) -> StoreResult<Vec<License>>;

    /// Look up a single license.
    ///
    /// Returns `Ok(None)` when the key is absent; errors are reserved for
    /// storage failures.
    async fn get(&self, key: &str) -> StoreResult<Option<License>>;

    /// Create or overwrite the record stored under `key`.
    async fn set(&self, key: &str, license: &License) -> StoreResult<()>;

    /// Remove the record stored under `key`.
    ///
    /// Deleting an absent key is a no-op; callers that need to report
    /// missing keys check existence first.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Lightweight availability probe for readiness checks.
    async fn health_check(&self) -> StoreResult<()>;
}

/// Runtime-selected store backend.
///
/// Constructed once at startup from [`StoreConfig`] and injected into the
/// lifecycle service. Dispatches every trait call to the active backend.
#[derive(Debug, Clone)]
pub enum Store {
    /// Single JSON document on the local filesystem.
    File(FileStore),
    /// Remote keyed JSON tree reached over HTTP.
    Remote(RemoteStore),
}

impl Store {
    /// Build the backend selected by configuration.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        match config {
            StoreConfig::File { path } => Ok(Store::File(FileStore::new(path))),
            StoreConfig::Remote {
                base_url,
                auth_token,
            } => Ok(Store::Remote(RemoteStore::new(
                base_url,
                auth_token.clone(),
            )?)),
        }
    }

    /// Name of the active backend, for startup logs and health reports.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::File(_) => "file",
            Store::Remote(_) => "remote",
        }
    }
}

#[async_trait]
impl LicenseStore for Store {
    async fn get_all(&self) -> StoreResult<Vec<License>> {
        match self {
            Store::File(store) => store.get_all().await,
            Store::Remote(store) => store.get_all().await,
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<License>> {
        match self {
            Store::File(store) => store.get(key).await,
            Store::Remote(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, license: &License) -> StoreResult<()> {
        match self {
            Store::File(store) => store.set(key, license).await,
            Store::Remote(store) => store.set(key, license).await,
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match self {
            Store::File(store) => store.delete(key).await,
            Store::Remote(store) => store.delete(key).await,
        }
    }

    async fn health_check(&self) -> StoreResult<()> {
        match self {
            Store::File(store) => store.health_check().await,
            Store::Remote(store) => store.health_check().await,
        }
    }
}
