// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote keyed-store backend.
//!
//! Records live in a JSON tree under a `licenses` node: the whole collection
//! at `{base}/licenses.json`, a single record at `{base}/licenses/{key}.json`.
//! Each operation is exactly one HTTP round-trip; nothing is cached. The
//! store answers `null` for absent nodes, which maps to `None`/empty here.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;
use url::Url;

use super::{LicenseStore, StoreError, StoreResult};
use crate::models::License;

/// Store backend over a remote keyed JSON tree.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    base_url: Url,
    auth_token: Option<String>,
    http: Client,
}

impl RemoteStore {
    /// Create a client for the tree rooted at `base_url`.
    ///
    /// An `auth_token`, when present, is appended to every request as an
    /// `auth` query parameter.
    pub fn new(base_url: &str, auth_token: Option<String>) -> StoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Config(format!("invalid remote store URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "remote store URL cannot be a base: {base_url}"
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| StoreError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            auth_token,
            http,
        })
    }

    /// URL of one record node, or of the whole collection for `None`.
    fn node_url(&self, key: Option<&str>) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                StoreError::Config("remote store URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty();
            match key {
                Some(key) => {
                    segments.push("licenses");
                    segments.push(&format!("{key}.json"));
                }
                None => {
                    segments.push("licenses.json");
                }
            }
        }

        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }

        Ok(url)
    }

    /// GET a node and parse the body as JSON.
    async fn fetch(&self, url: Url) -> StoreResult<Value> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("GET {} failed: {e}", url.path())))?;

        check_status(&url, &response)?;

        response
            .json()
            .await
            .map_err(|e| StoreError::Connection(format!("reading {} failed: {e}", url.path())))
    }
}

#[async_trait]
impl LicenseStore for RemoteStore {
    async fn get_all(&self) -> StoreResult<Vec<License>> {
        let value = self.fetch(self.node_url(None)?).await?;
        decode_collection(value)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<License>> {
        // An empty key would address the collection node itself.
        if key.is_empty() {
            return Ok(None);
        }
        let value = self.fetch(self.node_url(Some(key))?).await?;
        decode_record(value)
    }

    async fn set(&self, key: &str, license: &License) -> StoreResult<()> {
        let url = self.node_url(Some(key))?;
        let response = self
            .http
            .put(url.clone())
            .json(license)
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("PUT {} failed: {e}", url.path())))?;

        check_status(&url, &response)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        // An empty key would address the collection node itself.
        if key.is_empty() {
            return Ok(());
        }
        // The remote tree treats DELETE on an absent node as success, which
        // matches the trait's no-op contract.
        let url = self.node_url(Some(key))?;
        let response = self
            .http
            .delete(url.clone())
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("DELETE {} failed: {e}", url.path())))?;

        check_status(&url, &response)
    }

    async fn health_check(&self) -> StoreResult<()> {
        // shallow=true keeps the probe response tiny on large stores
        let mut url = self.node_url(None)?;
        url.query_pairs_mut().append_pair("shallow", "true");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("GET {} failed: {e}", url.path())))?;

        check_status(&url, &response)
    }
}

fn check_status(url: &Url, response: &reqwest::Response) -> StoreResult<()> {
    let status = response.status();
    if !status.is_success() {
        warn!(%status, path = url.path(), "remote store request failed");
        return Err(StoreError::RemoteStatus(status.as_u16()));
    }
    Ok(())
}

/// A `null` node means the record does not exist.
fn decode_record(value: Value) -> StoreResult<Option<License>> {
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

/// A `null` node means the collection is empty.
fn decode_collection(value: Value) -> StoreResult<Vec<License>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let map: BTreeMap<String, License> = serde_json::from_value(value)?;
    Ok(map.into_values().collect())
}
