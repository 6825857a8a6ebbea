//! # Catalog Service
//!
//! One method per external operation. Each takes raw caller input, runs it
//! through the identifier parser, filter builder or aggregation planner,
//! and only then calls the repository. Rejections and store failures are
//! logged here.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};
use crate::store::DocumentStore;

use super::aggregation::AggregationPlanner;
use super::errors::{CatalogError, CatalogResult};
use super::filter::{DistrictCode, FilterBuilder, PublicationYear};
use super::identifier::WalkId;
use super::repository::WalkRepository;
use super::walk::{NewWalk, Walk, WalkPatch};

/// Walks with many keywords, and how many there are
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordRich {
    pub count: usize,
    pub walks: Vec<Walk>,
}

/// Number of walks in one district
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictTally {
    pub district: Option<String>,
    pub count: u64,
}

#[derive(Clone)]
pub struct WalkCatalog {
    repo: WalkRepository,
}

impl WalkCatalog {
    pub fn new(repo: WalkRepository) -> Self {
        Self { repo }
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(WalkRepository::new(store))
    }

    pub async fn create(&self, body: Value) -> CatalogResult<Walk> {
        let result: CatalogResult<Walk> = async {
            let new_walk = NewWalk::from_json(body)?;
            self.repo.create(new_walk).await
        }
        .await;

        if let Ok(walk) = &result {
            log_event_with_fields(
                Event::WalkCreated,
                &[("id", &walk.id.to_string()), ("name", &walk.name)],
            );
        }
        observe("create", result)
    }

    pub async fn get_all(&self) -> CatalogResult<Vec<Walk>> {
        observe("get_all", self.repo.find_all().await)
    }

    pub async fn get_by_id(&self, raw_id: &str) -> CatalogResult<Walk> {
        let result = async {
            let id = WalkId::parse(raw_id)?;
            self.repo
                .find_by_id(&id)
                .await?
                .ok_or_else(|| CatalogError::not_found(format!("walk {}", id)))
        }
        .await;
        observe("get_by_id", result)
    }

    pub async fn search(&self, query: &str) -> CatalogResult<Vec<Walk>> {
        let result = async {
            let predicate = FilterBuilder::text_search(query)?;
            self.repo.find_many(&predicate, None).await
        }
        .await;
        observe("search", result)
    }

    pub async fn with_site(&self) -> CatalogResult<Vec<Walk>> {
        let predicate = FilterBuilder::has_site();
        observe("with_site", self.repo.find_many(&predicate, None).await)
    }

    pub async fn many_keywords(&self) -> CatalogResult<KeywordRich> {
        let predicate = FilterBuilder::many_keywords();
        let result = self
            .repo
            .find_many(&predicate, None)
            .await
            .map(|walks| KeywordRich {
                count: walks.len(),
                walks,
            });
        observe("many_keywords", result)
    }

    /// Walks published in the year, oldest first
    pub async fn published_in(&self, raw_year: &str) -> CatalogResult<Vec<Walk>> {
        let result = async {
            let year = PublicationYear::parse(raw_year)?;
            let predicate = FilterBuilder::published_in_year(&year);
            let order = FilterBuilder::publication_order();
            self.repo.find_many(&predicate, Some(&order)).await
        }
        .await;
        observe("published_in", result)
    }

    pub async fn district_count(&self, raw_code: &str) -> CatalogResult<u64> {
        let result = async {
            let code = DistrictCode::parse(raw_code)?;
            let plan = AggregationPlanner::count_matching(FilterBuilder::in_district(&code)?);
            self.repo.count(&plan).await
        }
        .await;
        observe("district_count", result)
    }

    pub async fn district_synthesis(&self) -> CatalogResult<Vec<DistrictTally>> {
        let plan = AggregationPlanner::group_count_by_district();
        let result = self.repo.aggregate(&plan).await.map(|rows| {
            rows.into_iter()
                .map(|row| DistrictTally {
                    district: row.key,
                    count: row.count,
                })
                .collect()
        });
        observe("district_synthesis", result)
    }

    pub async fn categories(&self) -> CatalogResult<Vec<String>> {
        let plan = AggregationPlanner::distinct_categories();
        observe("categories", self.repo.distinct_values(&plan).await)
    }

    pub async fn update_by_id(&self, raw_id: &str, body: Value) -> CatalogResult<Walk> {
        let result = async {
            let id = WalkId::parse(raw_id)?;
            let patch = WalkPatch::from_json(body)?;
            let fields = patch.field_names().collect::<Vec<_>>().join(",");

            let walk = self
                .repo
                .update_by_id(&id, patch)
                .await?
                .ok_or_else(|| CatalogError::not_found(format!("walk {}", id)))?;

            log_event_with_fields(
                Event::WalkUpdated,
                &[("id", &id.to_string()), ("fields", &fields)],
            );
            Ok(walk)
        }
        .await;
        observe("update_by_id", result)
    }

    /// Body: `{"keyword": "..."}`
    pub async fn add_keyword(&self, raw_id: &str, body: Value) -> CatalogResult<Walk> {
        let result = async {
            let id = WalkId::parse(raw_id)?;
            let keyword = required_text(&body, "keyword")?;

            let walk = self.repo.append_keyword(&id, keyword).await?;
            log_event_with_fields(
                Event::KeywordAdded,
                &[("id", &id.to_string()), ("keyword", keyword)],
            );
            Ok(walk)
        }
        .await;
        observe("add_keyword", result)
    }

    /// Body: `{"name": "..."}`. Returns how many walks were renamed.
    pub async fn bulk_rename(&self, pattern: &str, body: Value) -> CatalogResult<u64> {
        let result = async {
            let new_name = required_text(&body, "name")?;

            let modified = self
                .repo
                .replace_name_where_description_matches(pattern, new_name)
                .await?;
            log_event_with_fields(
                Event::WalksRenamed,
                &[("modified", &modified.to_string()), ("pattern", pattern)],
            );
            Ok(modified)
        }
        .await;
        observe("bulk_rename", result)
    }

    pub async fn delete_by_id(&self, raw_id: &str) -> CatalogResult<WalkId> {
        let result = async {
            let id = WalkId::parse(raw_id)?;
            if !self.repo.delete_by_id(&id).await? {
                return Err(CatalogError::not_found(format!("walk {}", id)));
            }
            log_event_with_fields(Event::WalkDeleted, &[("id", &id.to_string())]);
            Ok(id)
        }
        .await;
        observe("delete_by_id", result)
    }
}

/// A non-blank string field of a JSON object body
fn required_text<'a>(body: &'a Value, field: &str) -> CatalogResult<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            CatalogError::invalid_input(format!("'{}' is required and must be a non-empty string", field))
        })
}

fn observe<T>(operation: &str, result: CatalogResult<T>) -> CatalogResult<T> {
    if let Err(err) = &result {
        let event = match err {
            CatalogError::Persistence(_) => Event::StoreFailure,
            _ => Event::RequestRejected,
        };
        log_event_with_fields(
            event,
            &[
                ("error", &err.to_string()),
                ("kind", err.kind().as_str()),
                ("operation", operation),
            ],
        );
    }
    result
}
