//! Connection store
//!
//! A small JSON file keyed by conn_id. The refresh task replaces the
//! registry record wholesale on each run; the container task reads it back.
//! Writes go through a temp file and an atomic rename so a failed write
//! never leaves the store without the record it was replacing.

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::ConnectionRecord;
use crate::error::ConnectionStoreError;

/// File-backed store of connection records
pub struct ConnectionStore {
    path: PathBuf,
}

impl ConnectionStore {
    /// Open a store at the given path. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing file is an empty store.
    pub fn load_all(&self) -> Result<Vec<ConnectionRecord>, ConnectionStoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| ConnectionStoreError::ReadFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        serde_json::from_str(&content).map_err(|e| ConnectionStoreError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Look up a record by conn_id
    pub fn get(&self, conn_id: &str) -> Result<Option<ConnectionRecord>, ConnectionStoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|record| record.conn_id == conn_id))
    }

    /// Look up a record that must exist
    pub fn require(&self, conn_id: &str) -> Result<ConnectionRecord, ConnectionStoreError> {
        self.get(conn_id)?
            .ok_or_else(|| ConnectionStoreError::NotFound {
                conn_id: conn_id.to_string(),
            })
    }

    /// Replace any record with the same conn_id, then insert the new one.
    ///
    /// Whatever the prior state, exactly one record remains for the id.
    pub fn upsert(&self, record: ConnectionRecord) -> Result<(), ConnectionStoreError> {
        let mut records = self.load_all()?;
        records.retain(|existing| existing.conn_id != record.conn_id);
        let conn_id = record.conn_id.clone();
        records.push(record);
        self.persist(&records)?;
        info!("Stored connection {} in {}", conn_id, self.path.display());
        Ok(())
    }

    /// Delete a record. Returns whether one existed.
    pub fn remove(&self, conn_id: &str) -> Result<bool, ConnectionStoreError> {
        let mut records = self.load_all()?;
        let before = records.len();
        records.retain(|record| record.conn_id != conn_id);
        if records.len() == before {
            return Ok(false);
        }
        self.persist(&records)?;
        Ok(true)
    }

    fn persist(&self, records: &[ConnectionRecord]) -> Result<(), ConnectionStoreError> {
        let write_err = |message: String| ConnectionStoreError::WriteFailed {
            path: self.path.display().to_string(),
            message,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let json =
            serde_json::to_string_pretty(records).map_err(|e| write_err(e.to_string()))?;

        // Temp file in the same directory so the rename stays on one filesystem
        let mut tmp =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| write_err(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| write_err(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::RegistryCredentials;

    fn record(conn_id: &str, password: &str) -> ConnectionRecord {
        ConnectionRecord::docker(
            conn_id,
            "https://123456789012.dkr.ecr.us-east-1.amazonaws.com",
            RegistryCredentials {
                username: "AWS".to_string(),
                password: password.to_string(),
            },
        )
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConnectionStore::new(dir.path().join("connections.json"));
        assert!(store.load_all().unwrap().is_empty());
        assert!(store.get("docker_ecr").unwrap().is_none());
    }

    #[test]
    fn test_upsert_creates_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConnectionStore::new(dir.path().join("connections.json"));

        store.upsert(record("docker_ecr", "first")).unwrap();

        let stored = store.require("docker_ecr").unwrap();
        assert_eq!(stored.password, "first");
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_replaces_leaving_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConnectionStore::new(dir.path().join("connections.json"));

        store.upsert(record("docker_ecr", "first")).unwrap();
        store.upsert(record("docker_ecr", "second")).unwrap();

        let records = store.load_all().unwrap();
        let matching: Vec<_> = records
            .iter()
            .filter(|r| r.conn_id == "docker_ecr")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].password, "second");
    }

    #[test]
    fn test_upsert_preserves_other_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConnectionStore::new(dir.path().join("connections.json"));

        store.upsert(record("docker_ecr", "ecr")).unwrap();
        store.upsert(record("docker_ghcr", "ghcr")).unwrap();
        store.upsert(record("docker_ecr", "rotated")).unwrap();

        assert_eq!(store.load_all().unwrap().len(), 2);
        assert_eq!(store.require("docker_ghcr").unwrap().password, "ghcr");
        assert_eq!(store.require("docker_ecr").unwrap().password, "rotated");
    }

    #[test]
    fn test_remove_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConnectionStore::new(dir.path().join("connections.json"));

        store.upsert(record("docker_ecr", "secret")).unwrap();
        assert!(store.remove("docker_ecr").unwrap());
        assert!(!store.remove("docker_ecr").unwrap());
        assert!(store.get("docker_ecr").unwrap().is_none());
    }

    #[test]
    fn test_require_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConnectionStore::new(dir.path().join("connections.json"));
        let err = store.require("docker_ecr").unwrap_err();
        assert!(matches!(err, ConnectionStoreError::NotFound { .. }));
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connections.json");
        std::fs::write(&path, "not json").unwrap();

        let store = ConnectionStore::new(&path);
        assert!(matches!(
            store.load_all(),
            Err(ConnectionStoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConnectionStore::new(dir.path().join("nested/state/connections.json"));
        store.upsert(record("docker_ecr", "secret")).unwrap();
        assert!(store.path().exists());
    }
}
