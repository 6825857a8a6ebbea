//! # HTTP Server
//!
//! Serves the walk catalog routes plus `/health` behind a CORS layer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::catalog::WalkCatalog;
use crate::observability::{log_event_with_fields, Event};

use super::config::HttpServerConfig;
use super::routes::{health_routes, walk_routes};

/// HTTP server for the walk catalog
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(catalog: Arc<WalkCatalog>) -> Self {
        Self::with_config(HttpServerConfig::default(), catalog)
    }

    pub fn with_config(config: HttpServerConfig, catalog: Arc<WalkCatalog>) -> Self {
        let router = Self::build_router(&config, catalog);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, catalog: Arc<WalkCatalog>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(walk_routes(catalog))
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(Event::HttpServerStart, &[("addr", &addr.to_string())]);
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
