//! walkdb - a catalog of walks over a document store
//!
//! Layers, leaves first: `store` (memory and snapshot-file engines),
//! `query` (predicates, updates, grouping), `catalog` (validation and
//! the walk operations), `http_server` and `cli`.

pub mod catalog;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod store;
