//! # walkdb HTTP Server Module
//!
//! Axum server exposing the walk catalog.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/walks` - Create and list walks
//! - `/walks/:id` - Read, update and delete one walk
//! - `/walks/:id/keywords` - Append a keyword
//! - `/walks/search/:query`, `/walks/with-site`, `/walks/many-keywords`,
//!   `/walks/published/:year` - Named queries
//! - `/walks/districts`, `/walks/districts/:code/count`,
//!   `/walks/categories` - Aggregations
//! - `/walks/rename/:pattern` - Bulk rename by description

pub mod config;
pub mod response;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use routes::{health_routes, walk_routes};
pub use server::HttpServer;
