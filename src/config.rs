// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! typed [`Config`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LICENSE_STORE` | Store backend (`file` or `remote`) | `file` |
//! | `LICENSE_FILE` | Path of the JSON document (file backend) | `/data/licenses.json` |
//! | `LICENSE_REMOTE_URL` | Base URL of the remote keyed store | Required for `remote` |
//! | `LICENSE_REMOTE_AUTH` | Token sent as the `auth` query parameter | Optional |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

/// Environment variable selecting the store backend.
pub const STORE_BACKEND_ENV: &str = "LICENSE_STORE";
/// Environment variable for the file backend's document path.
pub const LICENSE_FILE_ENV: &str = "LICENSE_FILE";
/// Environment variable for the remote backend's base URL.
pub const REMOTE_URL_ENV: &str = "LICENSE_REMOTE_URL";
/// Environment variable for the remote backend's auth token.
pub const REMOTE_AUTH_ENV: &str = "LICENSE_REMOTE_AUTH";
/// Environment variable for the server bind address.
pub const HOST_ENV: &str = "HOST";
/// Environment variable for the server bind port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_STORE_BACKEND: &str = "file";
pub const DEFAULT_LICENSE_FILE: &str = "/data/licenses.json";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Which store backend to run against, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Single JSON document on the local filesystem.
    File { path: PathBuf },
    /// Remote keyed JSON tree reached over HTTP.
    Remote {
        base_url: String,
        auth_token: Option<String>,
    },
}

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
}

impl Config {
    /// Load the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default(HOST_ENV, DEFAULT_HOST);
        let port = match env_optional(PORT_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                var: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let store = select_store_config(
            &env_or_default(STORE_BACKEND_ENV, DEFAULT_STORE_BACKEND),
            env_or_default(LICENSE_FILE_ENV, DEFAULT_LICENSE_FILE),
            env_optional(REMOTE_URL_ENV),
            env_optional(REMOTE_AUTH_ENV),
        )?;

        Ok(Self { host, port, store })
    }

    /// Address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn select_store_config(
    backend: &str,
    file_path: String,
    remote_url: Option<String>,
    remote_auth: Option<String>,
) -> Result<StoreConfig, ConfigError> {
    match backend {
        "file" => Ok(StoreConfig::File {
            path: file_path.into(),
        }),
        "remote" => {
            let base_url = remote_url.ok_or(ConfigError::MissingVar(REMOTE_URL_ENV))?;
            Ok(StoreConfig::Remote {
                base_url,
                auth_token: remote_auth,
            })
        }
        other => Err(ConfigError::InvalidValue {
            var: STORE_BACKEND_ENV,
            value: other.to_string(),
        }),
    }
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
