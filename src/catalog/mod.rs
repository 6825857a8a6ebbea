//! # Walk Catalog
//!
//! Domain layer over the document store.
//!
//! - `identifier` validates record identifiers
//! - `filter` maps named queries onto predicates
//! - `aggregation` builds group, distinct and count plans
//! - `repository` is the only component that calls the store
//! - `service` exposes one method per external operation

pub mod aggregation;
pub mod errors;
pub mod filter;
pub mod identifier;
pub mod repository;
pub mod service;
pub mod walk;

pub use aggregation::{AggregationPlanner, CountPlan, DistinctPlan, GroupPlan};
pub use errors::{CatalogError, CatalogResult, ErrorKind, ErrorResponse};
pub use filter::{DistrictCode, FilterBuilder, PublicationYear, MANY_KEYWORDS_THRESHOLD};
pub use identifier::{is_valid_identifier, WalkId};
pub use repository::WalkRepository;
pub use service::{DistrictTally, KeywordRich, WalkCatalog};
pub use walk::{fields, NewWalk, Walk, WalkPatch, REQUIRED_FIELDS};
