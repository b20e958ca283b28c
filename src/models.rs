// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! ## License Record
//!
//! The [`License`] struct is the only persisted entity. It is stored exactly
//! as it is served: the wire format and the store format are the same JSON
//! object.
//!
//! ## Model Categories
//!
//! - **Requests**: key-bearing admin bodies and the public verify body
//! - **Responses**: action envelopes, the verify receipt, validity reports

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// License Record
// =============================================================================

/// A single issued license key and its status flags.
///
/// Keys have the fixed format `XXXX-XXXX-XXXX` where each segment is four
/// characters from `[0-9A-Z]`. A license is created active and unused;
/// verification consumes it exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct License {
    /// The license key (unique across the store).
    pub key: String,
    /// Whether the license may currently be redeemed.
    pub active: bool,
    /// Whether the license has already been redeemed.
    pub used: bool,
}

impl License {
    /// A freshly issued license: active and not yet used.
    pub fn new(key: impl Into<String>) -> Self {
        License {
            key: key.into(),
            active: true,
            used: false,
        }
    }
}

// =============================================================================
// Request Models
// =============================================================================

/// Admin request addressing an existing license by key.
///
/// Used by the toggle, delete, and reset endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KeyRequest {
    /// The license key to operate on.
    pub key: String,
}

/// Request body for the validity check endpoint.
///
/// The `key` field is optional: a missing key is reported as an invalid
/// license, never as a malformed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckValidityRequest {
    /// The license key to check.
    #[serde(default)]
    pub key: Option<String>,
}

/// Request body for license redemption.
///
/// The field is optional so that an absent key yields the same empty-key
/// rejection as a blank one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// The license key to redeem.
    #[serde(default, rename = "licenseKey")]
    pub license_key: Option<String>,
}

// =============================================================================
// Response Models
// =============================================================================

/// Envelope for admin mutations that act on an existing key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// The key the action was applied to.
    pub key: String,
}

/// Envelope returned when a new license is issued.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddLicenseResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// The newly created license record.
    pub license: License,
}

/// Receipt returned by a successful redemption.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The redeemed key, as stored (whitespace trimmed).
    pub key: String,
}

/// Why a license failed the validity check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum ValidityReason {
    /// No license with the given key exists.
    NotFound,
    /// The license exists but is administratively disabled.
    Inactive,
}

/// Result of the read-only validity check.
///
/// Always served with HTTP 200; invalidity is data, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidityResponse {
    /// Whether the license exists and is active.
    pub valid: bool,
    /// Present only when `valid` is `false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ValidityReason>,
}
