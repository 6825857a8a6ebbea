//! # In-Memory Document Store

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::query::group::{distinct_values, group_count};
use crate::query::{GroupCount, GroupSpec, Predicate, SortSpec, Update, ID_FIELD};

use super::errors::{StoreError, StoreResult};
use super::object_id::ObjectId;
use super::{DocumentStore, StoreFuture, UpdateOutcome};

/// One collection held in process memory, in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, validating each document as an insert would
    pub fn with_documents(documents: Vec<Value>) -> StoreResult<Self> {
        let mut seen = HashSet::with_capacity(documents.len());
        let mut seeded = Vec::with_capacity(documents.len());
        for doc in documents {
            let (id, doc) = prepare_insert(doc)?;
            if !seen.insert(id) {
                return Err(StoreError::DuplicateId(id.to_hex()));
            }
            seeded.push(doc);
        }
        Ok(Self {
            documents: RwLock::new(seeded),
        })
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Copy of every document, in insertion order
    pub(crate) fn snapshot(&self) -> StoreResult<Vec<Value>> {
        Ok(self.read()?.clone())
    }

    /// Put back the contents captured by [`Self::snapshot`]
    pub(crate) fn restore(&self, documents: Vec<Value>) -> StoreResult<()> {
        *self.write()? = documents;
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<Value>>> {
        self.documents.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<Value>>> {
        self.documents.write().map_err(|_| StoreError::LockPoisoned)
    }

    pub(crate) fn insert_now(&self, document: Value) -> StoreResult<Value> {
        let mut documents = self.write()?;
        let (id, document) = prepare_insert(document)?;
        let same_id = Predicate::IdEquals(id);
        if documents.iter().any(|doc| same_id.matches(doc)) {
            return Err(StoreError::DuplicateId(id.to_hex()));
        }
        documents.push(document.clone());
        Ok(document)
    }

    pub(crate) fn find_now(
        &self,
        filter: &Predicate,
        sort: Option<&SortSpec>,
    ) -> StoreResult<Vec<Value>> {
        let documents = self.read()?;
        let mut found: Vec<Value> = documents
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        if let Some(sort) = sort {
            // Stable, so ties keep insertion order
            found.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(found)
    }

    pub(crate) fn find_one_now(&self, filter: &Predicate) -> StoreResult<Option<Value>> {
        let documents = self.read()?;
        Ok(documents.iter().find(|doc| filter.matches(doc)).cloned())
    }

    /// Apply `update` to the first match, or to every match when `multi`.
    /// All-or-nothing: a failure on any document leaves the collection untouched.
    pub(crate) fn update_now(
        &self,
        filter: &Predicate,
        update: &Update,
        multi: bool,
    ) -> StoreResult<UpdateOutcome> {
        let mut documents = self.write()?;

        let mut staged = Vec::new();
        for (idx, doc) in documents.iter().enumerate() {
            if !filter.matches(doc) {
                continue;
            }
            let mut next = doc.clone();
            let changed = update.apply(&mut next)?;
            staged.push((idx, next, changed));
            if !multi {
                break;
            }
        }

        let mut outcome = UpdateOutcome {
            matched: staged.len() as u64,
            ..Default::default()
        };
        for (idx, next, changed) in staged {
            if changed {
                outcome.modified += 1;
            }
            if !multi {
                outcome.document = Some(next.clone());
            }
            documents[idx] = next;
        }
        Ok(outcome)
    }

    pub(crate) fn delete_one_now(&self, filter: &Predicate) -> StoreResult<u64> {
        let mut documents = self.write()?;
        match documents.iter().position(|doc| filter.matches(doc)) {
            Some(idx) => {
                documents.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    pub(crate) fn count_now(&self, filter: &Predicate) -> StoreResult<u64> {
        let documents = self.read()?;
        Ok(documents.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    pub(crate) fn distinct_now(&self, field: &str) -> StoreResult<Vec<Value>> {
        let documents = self.read()?;
        Ok(distinct_values(documents.iter(), field))
    }

    pub(crate) fn group_count_now(&self, spec: &GroupSpec) -> StoreResult<Vec<GroupCount>> {
        let documents = self.read()?;
        Ok(group_count(documents.iter(), spec))
    }
}

/// Validate a new document and give it a normalized `_id`
fn prepare_insert(mut document: Value) -> StoreResult<(ObjectId, Value)> {
    let obj = document
        .as_object_mut()
        .ok_or_else(|| StoreError::invalid_document("document must be a JSON object"))?;

    let id = match obj.get(ID_FIELD) {
        None | Some(Value::Null) => ObjectId::generate(),
        Some(Value::String(raw)) => raw
            .parse::<ObjectId>()
            .map_err(|e| StoreError::invalid_document(e.to_string()))?,
        Some(_) => return Err(StoreError::invalid_document("_id must be a string")),
    };

    obj.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
    Ok((id, document))
}

impl DocumentStore for MemoryStore {
    fn insert_one(&self, document: Value) -> StoreFuture<'_, Value> {
        Box::pin(async move { self.insert_now(document) })
    }

    fn find<'a>(
        &'a self,
        filter: &'a Predicate,
        sort: Option<&'a SortSpec>,
    ) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move { self.find_now(filter, sort) })
    }

    fn find_one<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async move { self.find_one_now(filter) })
    }

    fn update_one<'a>(
        &'a self,
        filter: &'a Predicate,
        update: &'a Update,
    ) -> StoreFuture<'a, UpdateOutcome> {
        Box::pin(async move { self.update_now(filter, update, false) })
    }

    fn update_many<'a>(
        &'a self,
        filter: &'a Predicate,
        update: &'a Update,
    ) -> StoreFuture<'a, UpdateOutcome> {
        Box::pin(async move { self.update_now(filter, update, true) })
    }

    fn delete_one<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, u64> {
        Box::pin(async move { self.delete_one_now(filter) })
    }

    fn count<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, u64> {
        Box::pin(async move { self.count_now(filter) })
    }

    fn distinct<'a>(&'a self, field: &'a str) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move { self.distinct_now(field) })
    }

    fn group_count<'a>(&'a self, spec: &'a GroupSpec) -> StoreFuture<'a, Vec<GroupCount>> {
        Box::pin(async move { self.group_count_now(spec) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Pattern;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryStore::new();
        let doc = store.insert_one(json!({"name": "A"})).await.unwrap();
        let id = doc[ID_FIELD].as_str().unwrap();
        assert!(ObjectId::is_valid(id));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_and_malformed_ids() {
        let store = MemoryStore::new();
        let id = "65a1f0c2e4b0a1b2c3d4e5f6";
        store.insert_one(json!({"_id": id})).await.unwrap();

        let dup = store.insert_one(json!({"_id": id.to_uppercase()})).await;
        assert!(matches!(dup, Err(StoreError::DuplicateId(_))));

        let bad = store.insert_one(json!({"_id": "nope"})).await;
        assert!(matches!(bad, Err(StoreError::InvalidDocument(_))));

        let not_object = store.insert_one(json!(["a"])).await;
        assert!(matches!(not_object, Err(StoreError::InvalidDocument(_))));
    }

    #[test]
    fn test_with_documents_rejects_duplicate_ids() {
        let seeded = MemoryStore::with_documents(vec![
            json!({"_id": "65a1f0c2e4b0a1b2c3d4e5f6", "name": "A"}),
            json!({"name": "B"}),
        ])
        .unwrap();
        assert_eq!(seeded.len().unwrap(), 2);

        let dup = MemoryStore::with_documents(vec![
            json!({"_id": "65a1f0c2e4b0a1b2c3d4e5f6"}),
            json!({"_id": "65A1F0C2E4B0A1B2C3D4E5F6"}),
        ]);
        assert!(matches!(dup, Err(StoreError::DuplicateId(_))));
    }

    #[test]
    fn test_restore_replaces_contents() {
        let store = MemoryStore::new();
        store.insert_now(json!({"name": "A"})).unwrap();
        let saved = store.snapshot().unwrap();

        store.insert_now(json!({"name": "B"})).unwrap();
        store.restore(saved).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_with_sort() {
        let store = MemoryStore::new();
        for n in [3, 1, 2] {
            store.insert_one(json!({"n": n})).await.unwrap();
        }
        let sort = SortSpec::ascending("n");
        let found = store.find(&Predicate::All, Some(&sort)).await.unwrap();
        let ns: Vec<i64> = found.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_one_returns_document_after() {
        let store = MemoryStore::new();
        let doc = store.insert_one(json!({"name": "Old"})).await.unwrap();
        let id: ObjectId = doc[ID_FIELD].as_str().unwrap().parse().unwrap();

        let update = Update::set_field("name", json!("New"));
        let outcome = store.update_one(&Predicate::IdEquals(id), &update).await.unwrap();
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.modified, 1);
        assert_eq!(outcome.document.unwrap()["name"], "New");
    }

    #[tokio::test]
    async fn test_update_many_counts_modified() {
        let store = MemoryStore::new();
        store.insert_one(json!({"d": "garden", "name": "A"})).await.unwrap();
        store.insert_one(json!({"d": "GARDEN", "name": "X"})).await.unwrap();
        store.insert_one(json!({"d": "street", "name": "C"})).await.unwrap();

        let filter = Predicate::matches_pattern("d", Pattern::contains("garden").unwrap());
        let outcome = store
            .update_many(&filter, &Update::set_field("name", json!("X")))
            .await
            .unwrap();
        assert_eq!(outcome.matched, 2);
        assert_eq!(outcome.modified, 1);
        assert!(outcome.document.is_none());
    }

    #[tokio::test]
    async fn test_failed_update_many_leaves_collection_untouched() {
        let store = MemoryStore::new();
        store.insert_one(json!({"k": ["a"]})).await.unwrap();
        store.insert_one(json!({"k": "scalar"})).await.unwrap();

        let result = store
            .update_many(&Predicate::All, &Update::add_to_set("k", json!("b")))
            .await;
        assert!(result.is_err());

        let docs = store.find(&Predicate::All, None).await.unwrap();
        assert_eq!(docs[0]["k"], json!(["a"]));
    }

    #[tokio::test]
    async fn test_delete_one() {
        let store = MemoryStore::new();
        let doc = store.insert_one(json!({"name": "A"})).await.unwrap();
        let id: ObjectId = doc[ID_FIELD].as_str().unwrap().parse().unwrap();

        assert_eq!(store.delete_one(&Predicate::IdEquals(id)).await.unwrap(), 1);
        assert_eq!(store.delete_one(&Predicate::IdEquals(id)).await.unwrap(), 0);
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_count_and_distinct() {
        let store = MemoryStore::new();
        for c in ["park", "park", "museum"] {
            store.insert_one(json!({"category": c})).await.unwrap();
        }
        assert_eq!(store.count(&Predicate::All).await.unwrap(), 3);
        assert_eq!(
            store.distinct("category").await.unwrap(),
            vec![json!("park"), json!("museum")]
        );
    }
}
