// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational License Server - License Key Issuance and Verification
//!
//! This crate provides a small HTTP service for issuing, administering, and
//! redeeming software license keys, backed by either a remote keyed store or
//! a local JSON document.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `service` - License lifecycle operations
//! - `store` - Store backends (local JSON document, remote keyed tree)
//! - `config` - Environment-driven runtime configuration

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod state;
pub mod store;
