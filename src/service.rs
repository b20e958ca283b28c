// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # License Lifecycle Service
//!
//! [`LicenseService`] owns every operation on license records: issuing,
//! listing, toggling, resetting, deleting, one-time redemption, and the
//! read-only validity check. It sits between the HTTP handlers and the
//! [`Store`] backend and is the only place that mutates records.
//!
//! ## Write gate
//!
//! Neither store backend has a compare-and-swap primitive, so every
//! read-modify-write sequence here runs behind a process-level async mutex.
//! Two concurrent redemptions of the same key therefore serialize: the first
//! marks the record used, the second observes that and fails. Read-only
//! operations take no lock.

use rand::Rng;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{License, ValidityReason};
use crate::store::{LicenseStore, Store, StoreError};

/// Characters a license key is drawn from.
const KEY_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Segments per key and characters per segment: `XXXX-XXXX-XXXX`.
const KEY_SEGMENTS: usize = 3;
const KEY_SEGMENT_LEN: usize = 4;

/// Candidate keys drawn before issuing gives up.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// Error type for license lifecycle operations.
///
/// HTTP status mapping happens in the handlers; the same variant maps
/// differently per endpoint (redemption reports an unknown key as a bad
/// request, the admin surface as a missing resource).
#[derive(Debug, thiserror::Error)]
pub enum LicenseError {
    /// No license with the given key exists.
    #[error("license not found")]
    NotFound,

    /// The submitted key was empty after trimming.
    #[error("license key is empty")]
    EmptyKey,

    /// The license is administratively disabled.
    #[error("license is not active")]
    Inactive,

    /// The license was already redeemed.
    #[error("license has already been used")]
    AlreadyUsed,

    /// Every candidate key collided with an existing record.
    #[error("failed to generate an unused license key after {} attempts", MAX_GENERATION_ATTEMPTS)]
    GenerationExhausted,

    /// The store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// License lifecycle operations over an injected store backend.
pub struct LicenseService {
    store: Store,
    write_gate: Mutex<()>,
}

impl LicenseService {
    /// Create a service over the given backend.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    /// Name of the active store backend, for logs and health reports.
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Probe the underlying store.
    pub async fn store_health(&self) -> Result<(), LicenseError> {
        self.store.health_check().await?;
        Ok(())
    }

    /// Every stored license.
    pub async fn list(&self) -> Result<Vec<License>, LicenseError> {
        Ok(self.store.get_all().await?)
    }

    /// Issue a new license: active, unused, with a key no other record has.
    pub async fn add(&self) -> Result<License, LicenseError> {
        let _gate = self.write_gate.lock().await;

        let key = generate_unique_key(&self.store, generate_key).await?;
        let license = License::new(key);
        self.store.set(&license.key, &license).await?;
        info!(key = %license.key, "license issued");
        Ok(license)
    }

    /// Flip the `active` flag. Returns the updated record.
    pub async fn toggle(&self, key: &str) -> Result<License, LicenseError> {
        let _gate = self.write_gate.lock().await;

        let mut license = self.store.get(key).await?.ok_or(LicenseError::NotFound)?;
        license.active = !license.active;
        self.store.set(key, &license).await?;
        info!(key = %license.key, active = license.active, "license toggled");
        Ok(license)
    }

    /// Clear the `used` flag so the license can be redeemed again.
    pub async fn reset(&self, key: &str) -> Result<License, LicenseError> {
        let _gate = self.write_gate.lock().await;

        let mut license = self.store.get(key).await?.ok_or(LicenseError::NotFound)?;
        license.used = false;
        self.store.set(key, &license).await?;
        info!(key = %license.key, "license usage reset");
        Ok(license)
    }

    /// Remove the record entirely.
    pub async fn delete(&self, key: &str) -> Result<(), LicenseError> {
        let _gate = self.write_gate.lock().await;

        if self.store.get(key).await?.is_none() {
            return Err(LicenseError::NotFound);
        }
        self.store.delete(key).await?;
        info!(key, "license deleted");
        Ok(())
    }

    /// Redeem a license. This is the one-time consumption path.
    ///
    /// The key is trimmed before anything else; an empty result is rejected
    /// without touching the store. Preconditions are checked in order
    /// (exists, active, unused) and the first failure wins. On success the
    /// record is persisted with `used = true`.
    pub async fn verify(&self, raw_key: &str) -> Result<License, LicenseError> {
        let key = raw_key.trim();
        if key.is_empty() {
            return Err(LicenseError::EmptyKey);
        }

        let _gate = self.write_gate.lock().await;

        let mut license = self.store.get(key).await?.ok_or(LicenseError::NotFound)?;
        if !license.active {
            return Err(LicenseError::Inactive);
        }
        if license.used {
            return Err(LicenseError::AlreadyUsed);
        }

        license.used = true;
        self.store.set(key, &license).await?;
        info!(key = %license.key, "license redeemed");
        Ok(license)
    }

    /// Read-only validity check: `None` means valid.
    ///
    /// Unknown and inactive keys are data, not errors; only a store failure
    /// is an `Err`. The `used` flag is not part of validity, so a redeemed
    /// license still reports as valid.
    pub async fn check_validity(&self, key: &str) -> Result<Option<ValidityReason>, LicenseError> {
        match self.store.get(key).await? {
            None => Ok(Some(ValidityReason::NotFound)),
            Some(license) if !license.active => Ok(Some(ValidityReason::Inactive)),
            Some(_) => Ok(None),
        }
    }
}

/// One candidate key in the `XXXX-XXXX-XXXX` format.
fn generate_key() -> String {
    let mut rng = rand::thread_rng();
    let mut segments = Vec::with_capacity(KEY_SEGMENTS);
    for _ in 0..KEY_SEGMENTS {
        let segment: String = (0..KEY_SEGMENT_LEN)
            .map(|_| KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())] as char)
            .collect();
        segments.push(segment);
    }
    segments.join("-")
}

/// Draw candidate keys until one is unused, giving up after
/// [`MAX_GENERATION_ATTEMPTS`] colliding draws.
async fn generate_unique_key<F>(store: &Store, mut generate: F) -> Result<String, LicenseError>
where
    F: FnMut() -> String,
{
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let candidate = generate();
        if store.get(&candidate).await?.is_none() {
            return Ok(candidate);
        }
    }
    Err(LicenseError::GenerationExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use std::sync::Arc;

    fn test_service() -> (LicenseService, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = Store::File(FileStore::new(dir.path().join("licenses.json")));
        (LicenseService::new(store), dir)
    }

    #[test]
    fn generated_keys_match_the_wire_format() {
        for _ in 0..200 {
            let key = generate_key();
            let segments: Vec<&str> = key.split('-').collect();
            assert_eq!(segments.len(), 3, "bad segment count in {key}");
            for segment in segments {
                assert_eq!(segment.len(), 4, "bad segment length in {key}");
                assert!(
                    segment
                        .chars()
                        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
                    "bad character in {key}"
                );
            }
        }
    }

    #[tokio::test]
    async fn add_issues_an_active_unused_license() {
        let (service, _dir) = test_service();

        let license = service.add().await.unwrap();
        assert!(license.active);
        assert!(!license.used);

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![license]);
    }

    #[tokio::test]
    async fn generation_skips_colliding_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::File(FileStore::new(dir.path().join("licenses.json")));
        let taken = License::new("AAAA-AAAA-AAAA");
        store.set(&taken.key, &taken).await.unwrap();

        let mut draws = 0;
        let key = generate_unique_key(&store, || {
            draws += 1;
            if draws == 1 {
                "AAAA-AAAA-AAAA".to_string()
            } else {
                "BBBB-BBBB-BBBB".to_string()
            }
        })
        .await
        .unwrap();

        assert_eq!(key, "BBBB-BBBB-BBBB");
        assert_eq!(draws, 2);
    }

    #[tokio::test]
    async fn generation_gives_up_after_ten_colliding_draws() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::File(FileStore::new(dir.path().join("licenses.json")));
        let taken = License::new("AAAA-AAAA-AAAA");
        store.set(&taken.key, &taken).await.unwrap();

        let mut draws = 0;
        let result = generate_unique_key(&store, || {
            draws += 1;
            "AAAA-AAAA-AAAA".to_string()
        })
        .await;

        assert!(matches!(result, Err(LicenseError::GenerationExhausted)));
        assert_eq!(draws, 10);
    }

    #[tokio::test]
    async fn verify_trims_whitespace_and_marks_used() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();

        let padded = format!("  {}  ", license.key);
        let redeemed = service.verify(&padded).await.unwrap();
        assert_eq!(redeemed.key, license.key);
        assert!(redeemed.used);

        let listed = service.list().await.unwrap();
        assert!(listed[0].used);
    }

    #[tokio::test]
    async fn verify_twice_fails_with_already_used() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();

        service.verify(&license.key).await.unwrap();
        let second = service.verify(&license.key).await;
        assert!(matches!(second, Err(LicenseError::AlreadyUsed)));
    }

    #[tokio::test]
    async fn verify_rejects_an_inactive_license() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();

        let toggled = service.toggle(&license.key).await.unwrap();
        assert!(!toggled.active);

        let result = service.verify(&license.key).await;
        assert!(matches!(result, Err(LicenseError::Inactive)));
    }

    #[tokio::test]
    async fn verify_rejects_unknown_keys() {
        let (service, _dir) = test_service();
        let result = service.verify("ZZZZ-ZZZZ-ZZZZ").await;
        assert!(matches!(result, Err(LicenseError::NotFound)));
    }

    #[tokio::test]
    async fn empty_key_is_rejected_without_touching_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("licenses.json");
        let service = LicenseService::new(Store::File(FileStore::new(&path)));

        let result = service.verify("   ").await;
        assert!(matches!(result, Err(LicenseError::EmptyKey)));
        // No lookup and no write happened, so the document was never created.
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn toggle_twice_restores_the_active_flag() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();

        let once = service.toggle(&license.key).await.unwrap();
        assert!(!once.active);
        let twice = service.toggle(&license.key).await.unwrap();
        assert!(twice.active);
    }

    #[tokio::test]
    async fn toggle_on_unknown_key_fails() {
        let (service, _dir) = test_service();
        let result = service.toggle("ZZZZ-ZZZZ-ZZZZ").await;
        assert!(matches!(result, Err(LicenseError::NotFound)));
    }

    #[tokio::test]
    async fn reset_clears_the_used_flag() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();
        service.verify(&license.key).await.unwrap();

        let reset = service.reset(&license.key).await.unwrap();
        assert!(!reset.used);

        // Redeemable again after the reset.
        service.verify(&license.key).await.unwrap();
    }

    #[tokio::test]
    async fn reset_on_a_fresh_license_is_harmless() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();

        let reset = service.reset(&license.key).await.unwrap();
        assert!(!reset.used);
        assert!(reset.active);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();

        service.delete(&license.key).await.unwrap();

        assert!(service.list().await.unwrap().is_empty());
        let again = service.delete(&license.key).await;
        assert!(matches!(again, Err(LicenseError::NotFound)));
    }

    #[tokio::test]
    async fn check_validity_reports_reasons_without_erroring() {
        let (service, _dir) = test_service();

        let missing = service.check_validity("ZZZZ-ZZZZ-ZZZZ").await.unwrap();
        assert_eq!(missing, Some(ValidityReason::NotFound));

        let license = service.add().await.unwrap();
        let valid = service.check_validity(&license.key).await.unwrap();
        assert_eq!(valid, None);

        service.toggle(&license.key).await.unwrap();
        let inactive = service.check_validity(&license.key).await.unwrap();
        assert_eq!(inactive, Some(ValidityReason::Inactive));
    }

    #[tokio::test]
    async fn check_validity_ignores_the_used_flag() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();
        service.verify(&license.key).await.unwrap();

        // A redeemed license is still a valid license.
        let validity = service.check_validity(&license.key).await.unwrap();
        assert_eq!(validity, None);
    }

    #[tokio::test]
    async fn concurrent_verifies_redeem_exactly_once() {
        let (service, _dir) = test_service();
        let license = service.add().await.unwrap();
        let service = Arc::new(service);

        let first = tokio::spawn({
            let service = Arc::clone(&service);
            let key = license.key.clone();
            async move { service.verify(&key).await }
        });
        let second = tokio::spawn({
            let service = Arc::clone(&service);
            let key = license.key.clone();
            async move { service.verify(&key).await }
        });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(LicenseError::AlreadyUsed))));
    }
}
