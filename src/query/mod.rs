//! # Query Model
//!
//! The structured language shared by the catalog and the document store:
//! predicates, sort orders, update operators and grouping specs.
//! Building these values never touches a store.

pub mod group;
pub mod predicate;
pub mod update;

pub use group::{GroupCount, GroupSpec, KeyExpr};
pub use predicate::{parse_timestamp, Pattern, Predicate, SortSpec, ID_FIELD};
pub use update::Update;
