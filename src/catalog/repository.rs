//! # Walk Repository
//!
//! The only component that talks to the document store. Takes already
//! validated identifiers, predicates and plans; converts store documents
//! into [`Walk`]s and store failures into [`CatalogError::Persistence`].

use std::sync::Arc;

use serde_json::Value;

use crate::query::{GroupCount, Predicate, SortSpec, Update};
use crate::store::DocumentStore;

use super::aggregation::{CountPlan, DistinctPlan, GroupPlan};
use super::errors::{CatalogError, CatalogResult};
use super::filter::FilterBuilder;
use super::identifier::WalkId;
use super::walk::{fields, NewWalk, Walk, WalkPatch};

#[derive(Clone)]
pub struct WalkRepository {
    store: Arc<dyn DocumentStore>,
}

impl WalkRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, walk: NewWalk) -> CatalogResult<Walk> {
        let stored = self.store.insert_one(walk.into_document()).await?;
        Walk::from_document(stored)
    }

    pub async fn find_all(&self) -> CatalogResult<Vec<Walk>> {
        self.find_many(&Predicate::All, None).await
    }

    pub async fn find_by_id(&self, id: &WalkId) -> CatalogResult<Option<Walk>> {
        self.store
            .find_one(&id.predicate())
            .await?
            .map(Walk::from_document)
            .transpose()
    }

    pub async fn find_many(
        &self,
        predicate: &Predicate,
        sort: Option<&SortSpec>,
    ) -> CatalogResult<Vec<Walk>> {
        self.store
            .find(predicate, sort)
            .await?
            .into_iter()
            .map(Walk::from_document)
            .collect()
    }

    /// Merge the patch into the record. `None` when no record has this id.
    pub async fn update_by_id(&self, id: &WalkId, patch: WalkPatch) -> CatalogResult<Option<Walk>> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }
        let outcome = self
            .store
            .update_one(&id.predicate(), &patch.into_update())
            .await?;
        outcome.document.map(Walk::from_document).transpose()
    }

    /// Append a keyword unless already present. The presence check and the
    /// append are one store-level add-to-set, so concurrent appends of the
    /// same keyword cannot both succeed.
    pub async fn append_keyword(&self, id: &WalkId, keyword: &str) -> CatalogResult<Walk> {
        let update = Update::add_to_set(fields::KEYWORDS, Value::String(keyword.to_string()));
        let outcome = self.store.update_one(&id.predicate(), &update).await?;

        if outcome.matched == 0 {
            return Err(CatalogError::not_found(format!("walk {}", id)));
        }
        if outcome.modified == 0 {
            return Err(CatalogError::conflict(format!(
                "keyword '{}' already present on walk {}",
                keyword, id
            )));
        }
        let doc = outcome
            .document
            .ok_or_else(|| CatalogError::not_found(format!("walk {}", id)))?;
        Walk::from_document(doc)
    }

    /// Rename every walk whose description contains `pattern` (ignoring
    /// case). Returns how many records changed; zero is `NotFound`.
    pub async fn replace_name_where_description_matches(
        &self,
        pattern: &str,
        new_name: &str,
    ) -> CatalogResult<u64> {
        let filter = FilterBuilder::description_matches(pattern)?;
        let update = Update::set_field(fields::NAME, Value::String(new_name.to_string()));
        let outcome = self.store.update_many(&filter, &update).await?;

        if outcome.modified == 0 {
            return Err(CatalogError::not_found(format!(
                "no walk to rename for description pattern '{}' ({} matched, none changed)",
                pattern, outcome.matched
            )));
        }
        Ok(outcome.modified)
    }

    /// True if a record was removed
    pub async fn delete_by_id(&self, id: &WalkId) -> CatalogResult<bool> {
        Ok(self.store.delete_one(&id.predicate()).await? > 0)
    }

    pub async fn aggregate(&self, plan: &GroupPlan) -> CatalogResult<Vec<GroupCount>> {
        Ok(self.store.group_count(&plan.spec).await?)
    }

    pub async fn distinct_values(&self, plan: &DistinctPlan) -> CatalogResult<Vec<String>> {
        let values = self.store.distinct(plan.field).await?;
        Ok(values
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    pub async fn count(&self, plan: &CountPlan) -> CatalogResult<u64> {
        Ok(self.store.count(&plan.predicate).await?)
    }
}
