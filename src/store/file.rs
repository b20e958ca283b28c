// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Flat-file store backend.
//!
//! All licenses live in one JSON document: a map of license key to record.
//! Every read loads the whole document and every mutation rewrites it
//! wholesale, which is O(total records) per write but keeps the on-disk
//! format trivially inspectable and editable.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{LicenseStore, StoreError, StoreResult};
use crate::models::License;

/// Store backend persisting to a single JSON document.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the document at `path`.
    ///
    /// The document is created lazily on the first write; a store pointed at
    /// a path that does not exist yet reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole document. A missing file reads as an empty map.
    fn read_document(&self) -> StoreResult<BTreeMap<String, License>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        let document = serde_json::from_reader(reader)?;
        Ok(document)
    }

    /// Rewrite the whole document (atomic write via rename).
    fn write_document(&self, document: &BTreeMap<String, License>) -> StoreResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, document)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl LicenseStore for FileStore {
    async fn get_all(&self) -> StoreResult<Vec<License>> {
        Ok(self.read_document()?.into_values().collect())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<License>> {
        let mut document = self.read_document()?;
        Ok(document.remove(key))
    }

    async fn set(&self, key: &str, license: &License) -> StoreResult<()> {
        let mut document = self.read_document()?;
        document.insert(key.to_string(), license.clone());
        self.write_document(&document)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut document = self.read_document()?;
        if document.remove(key).is_some() {
            self.write_document(&document)?;
        }
        Ok(())
    }

    /// Write-read-delete probe next to the document.
    async fn health_check(&self) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let test_file = dir.join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StoreError::Io(io::Error::new(
                ErrorKind::InvalidData,
                "health check data mismatch",
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (FileStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = FileStore::new(dir.path().join("licenses.json"));
        (store, dir)
    }

    #[tokio::test]
    async fn missing_document_reads_as_empty() {
        let (store, _dir) = test_store();

        assert!(store.get_all().await.unwrap().is_empty());
        assert_eq!(store.get("AAAA-BBBB-CCCC").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_returns_the_record() {
        let (store, _dir) = test_store();
        let license = License::new("AB12-CD34-EF56");

        store.set(&license.key, &license).await.unwrap();

        let loaded = store.get("AB12-CD34-EF56").await.unwrap();
        assert_eq!(loaded, Some(license));
    }

    #[tokio::test]
    async fn set_overwrites_an_existing_record() {
        let (store, _dir) = test_store();
        let mut license = License::new("AB12-CD34-EF56");
        store.set(&license.key, &license).await.unwrap();

        license.used = true;
        store.set(&license.key, &license).await.unwrap();

        let loaded = store.get("AB12-CD34-EF56").await.unwrap().unwrap();
        assert!(loaded.used);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_only_the_given_key() {
        let (store, _dir) = test_store();
        let first = License::new("1111-1111-1111");
        let second = License::new("2222-2222-2222");
        store.set(&first.key, &first).await.unwrap();
        store.set(&second.key, &second).await.unwrap();

        store.delete("1111-1111-1111").await.unwrap();

        assert_eq!(store.get("1111-1111-1111").await.unwrap(), None);
        assert_eq!(store.get("2222-2222-2222").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn delete_on_absent_key_is_a_noop() {
        let (store, _dir) = test_store();

        store.delete("ZZZZ-ZZZZ-ZZZZ").await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
        // The document is never created by a no-op delete.
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn writes_leave_no_temp_file_behind() {
        let (store, _dir) = test_store();
        let license = License::new("AB12-CD34-EF56");

        store.set(&license.key, &license).await.unwrap();

        assert!(store.path().exists());
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn document_survives_reopening_the_store() {
        let (store, _dir) = test_store();
        let license = License::new("AB12-CD34-EF56");
        store.set(&license.key, &license).await.unwrap();

        let reopened = FileStore::new(store.path());
        assert_eq!(reopened.get_all().await.unwrap(), vec![license]);
    }

    #[tokio::test]
    async fn health_check_passes_in_a_writable_directory() {
        let (store, _dir) = test_store();
        store.health_check().await.unwrap();
    }
}
