//! # File-Backed Document Store
//!
//! The memory engine plus a snapshot file rewritten after every mutation
//! that changed something.
//!
//! Snapshot layout:
//!
//! ```text
//! {"checksum":<crc32 of body>,"documents":<n>,"format_version":1}\n
//! <body: compact JSON array of documents>
//! ```
//!
//! The snapshot is written to `<path>.tmp` and renamed over `<path>`.
//! If the write fails the in-memory state is rolled back to what the
//! snapshot on disk still holds, and the error is returned to the caller.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::observability::{log_event_with_fields, Event};
use crate::query::{GroupCount, GroupSpec, Predicate, SortSpec, Update};

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StoreError, StoreResult};
use super::memory::MemoryStore;
use super::{DocumentStore, StoreFuture, UpdateOutcome};

const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotHeader {
    checksum: u32,
    documents: usize,
    format_version: u32,
}

/// A collection persisted to a single snapshot file
#[derive(Debug)]
pub struct FileStore {
    memory: MemoryStore,
    path: PathBuf,
    /// Serializes mutate-then-persist so snapshots land in mutation order
    write_gate: Mutex<()>,
}

impl FileStore {
    /// Open the snapshot at `path`, starting empty if it does not exist
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let documents = match tokio::fs::read(&path).await {
            Ok(bytes) => decode_snapshot(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let count = documents.len().to_string();
        let memory = MemoryStore::with_documents(documents)?;
        log_event_with_fields(
            Event::SnapshotLoaded,
            &[("documents", &count), ("path", &path.display().to_string())],
        );

        Ok(Self {
            memory,
            path,
            write_gate: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> StoreResult<usize> {
        self.memory.len()
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.memory.is_empty()
    }

    /// Write the current contents to the snapshot file
    pub async fn flush(&self) -> StoreResult<()> {
        let _gate = self.write_gate.lock().await;
        self.persist().await
    }

    async fn persist(&self) -> StoreResult<()> {
        let documents = self.memory.snapshot()?;
        let count = documents.len();
        let bytes = encode_snapshot(&documents)?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        log_event_with_fields(Event::SnapshotPersisted, &[("documents", &count.to_string())]);
        Ok(())
    }

    /// Run a memory-engine mutation and persist it when it reports a change.
    /// A failed persist puts the previous documents back.
    async fn mutate<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&MemoryStore) -> StoreResult<(T, bool)>,
    {
        let _gate = self.write_gate.lock().await;
        let before = self.memory.snapshot()?;
        let (out, dirty) = op(&self.memory)?;
        if dirty {
            if let Err(err) = self.persist().await {
                self.memory.restore(before)?;
                return Err(err);
            }
        }
        Ok(out)
    }
}

fn encode_snapshot(documents: &[Value]) -> StoreResult<Vec<u8>> {
    let body = serde_json::to_vec(documents)?;
    let header = SnapshotHeader {
        checksum: compute_checksum(&body),
        documents: documents.len(),
        format_version: SNAPSHOT_FORMAT_VERSION,
    };

    let mut bytes = serde_json::to_vec(&header)?;
    bytes.push(b'\n');
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

fn decode_snapshot(bytes: &[u8]) -> StoreResult<Vec<Value>> {
    let split = bytes
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| StoreError::corrupted("missing snapshot header"))?;
    let (header_bytes, body) = (&bytes[..split], &bytes[split + 1..]);

    let header: SnapshotHeader = serde_json::from_slice(header_bytes)
        .map_err(|e| StoreError::corrupted(format!("unreadable snapshot header: {}", e)))?;

    if header.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(StoreError::corrupted(format!(
            "unsupported snapshot format version {}",
            header.format_version
        )));
    }
    if !verify_checksum(body, header.checksum) {
        return Err(StoreError::corrupted("snapshot checksum mismatch"));
    }

    let documents: Vec<Value> = serde_json::from_slice(body)
        .map_err(|e| StoreError::corrupted(format!("unreadable snapshot body: {}", e)))?;
    if documents.len() != header.documents {
        return Err(StoreError::corrupted(format!(
            "header declares {} documents, body holds {}",
            header.documents,
            documents.len()
        )));
    }
    Ok(documents)
}

impl DocumentStore for FileStore {
    fn insert_one(&self, document: Value) -> StoreFuture<'_, Value> {
        Box::pin(async move {
            self.mutate(move |m| m.insert_now(document).map(|doc| (doc, true)))
                .await
        })
    }

    fn find<'a>(
        &'a self,
        filter: &'a Predicate,
        sort: Option<&'a SortSpec>,
    ) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move { self.memory.find_now(filter, sort) })
    }

    fn find_one<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async move { self.memory.find_one_now(filter) })
    }

    fn update_one<'a>(
        &'a self,
        filter: &'a Predicate,
        update: &'a Update,
    ) -> StoreFuture<'a, UpdateOutcome> {
        Box::pin(async move {
            self.mutate(|m| {
                m.update_now(filter, update, false)
                    .map(|out| {
                        let dirty = out.modified > 0;
                        (out, dirty)
                    })
            })
            .await
        })
    }

    fn update_many<'a>(
        &'a self,
        filter: &'a Predicate,
        update: &'a Update,
    ) -> StoreFuture<'a, UpdateOutcome> {
        Box::pin(async move {
            self.mutate(|m| {
                m.update_now(filter, update, true)
                    .map(|out| {
                        let dirty = out.modified > 0;
                        (out, dirty)
                    })
            })
            .await
        })
    }

    fn delete_one<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            self.mutate(|m| m.delete_one_now(filter).map(|n| (n, n > 0)))
                .await
        })
    }

    fn count<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, u64> {
        Box::pin(async move { self.memory.count_now(filter) })
    }

    fn distinct<'a>(&'a self, field: &'a str) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move { self.memory.distinct_now(field) })
    }

    fn group_count<'a>(&'a self, spec: &'a GroupSpec) -> StoreFuture<'a, Vec<GroupCount>> {
        Box::pin(async move { self.memory.group_count_now(spec) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path().join("walks.json")).await.unwrap();
        assert!(store.is_empty().unwrap());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("walks.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.insert_one(json!({"name": "A", "geo": [48.8584, 2.2945]})).await.unwrap();
            store.insert_one(json!({"name": "B"})).await.unwrap();
        }

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.len().unwrap(), 2);
        let docs = reopened.find(&Predicate::All, None).await.unwrap();
        assert_eq!(docs[0]["name"], "A");
    }

    #[tokio::test]
    async fn test_tampered_snapshot_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("walks.json");
        {
            let store = FileStore::open(&path).await.unwrap();
            store.insert_one(json!({"name": "Original"})).await.unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, content.replace("Original", "Tampered")).unwrap();

        let result = FileStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Corrupted(_))));
    }

    #[tokio::test]
    async fn test_failed_persist_restores_memory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data");
        std::fs::create_dir(&dir).unwrap();

        let store = FileStore::open(dir.join("walks.json")).await.unwrap();
        store.insert_one(json!({"name": "A"})).await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(store.insert_one(json!({"name": "B"})).await.is_err());
        assert!(store
            .update_many(&Predicate::All, &Update::set_field("name", json!("C")))
            .await
            .is_err());

        let docs = store.find(&Predicate::All, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["name"], "A");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_snapshot(b"no header"), Err(StoreError::Corrupted(_))));
        assert!(matches!(decode_snapshot(b"{}\n[]"), Err(StoreError::Corrupted(_))));
    }

    #[test]
    fn test_encode_decode_snapshot() {
        let docs = vec![json!({"_id": "65a1f0c2e4b0a1b2c3d4e5f6", "name": "A"})];
        let bytes = encode_snapshot(&docs).unwrap();
        assert_eq!(decode_snapshot(&bytes).unwrap(), docs);
    }
}
