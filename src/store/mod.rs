//! # Document Store
//!
//! A single-collection JSON document store. The catalog only talks to it
//! through [`DocumentStore`]; two engines are provided:
//!
//! - [`MemoryStore`]: process-local, lost on exit
//! - [`FileStore`]: memory engine persisted as a checksummed JSON snapshot
//!
//! Each primitive is atomic with respect to the others. Nothing spans more
//! than one call.

mod checksum;
mod errors;
mod file;
mod memory;
mod object_id;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use object_id::{InvalidObjectId, ObjectId, OBJECT_ID_HEX_LEN};

use crate::query::{GroupCount, GroupSpec, Predicate, SortSpec, Update};

/// Boxed future returned by every store primitive
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Result of an update primitive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    /// Documents the filter selected
    pub matched: u64,

    /// Documents that actually changed
    pub modified: u64,

    /// For single-document updates, the document after the update
    pub document: Option<Value>,
}

/// Primitives over one collection of JSON documents
pub trait DocumentStore: Send + Sync {
    /// Insert a document, assigning `_id` if absent. Returns the stored document.
    fn insert_one(&self, document: Value) -> StoreFuture<'_, Value>;

    /// All matching documents, in insertion order unless `sort` is given
    fn find<'a>(
        &'a self,
        filter: &'a Predicate,
        sort: Option<&'a SortSpec>,
    ) -> StoreFuture<'a, Vec<Value>>;

    /// First matching document
    fn find_one<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, Option<Value>>;

    /// Update the first matching document
    fn update_one<'a>(
        &'a self,
        filter: &'a Predicate,
        update: &'a Update,
    ) -> StoreFuture<'a, UpdateOutcome>;

    /// Update every matching document
    fn update_many<'a>(
        &'a self,
        filter: &'a Predicate,
        update: &'a Update,
    ) -> StoreFuture<'a, UpdateOutcome>;

    /// Delete the first matching document. Returns how many were removed.
    fn delete_one<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, u64>;

    fn count<'a>(&'a self, filter: &'a Predicate) -> StoreFuture<'a, u64>;

    /// Unique non-null values of a field
    fn distinct<'a>(&'a self, field: &'a str) -> StoreFuture<'a, Vec<Value>>;

    /// Count documents per group key
    fn group_count<'a>(&'a self, spec: &'a GroupSpec) -> StoreFuture<'a, Vec<GroupCount>>;
}
