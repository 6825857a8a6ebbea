//! Walk HTTP Routes
//!
//! One handler per catalog operation. Handlers only extract path segments
//! and bodies; all validation happens in [`WalkCatalog`].

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;

use crate::catalog::{
    CatalogError, CatalogResult, DistrictTally, KeywordRich, Walk, WalkCatalog,
};

use super::response::{CountResponse, DeleteResponse, HealthResponse, RenameResponse};

type CatalogState = State<Arc<WalkCatalog>>;

/// Create walk routes
pub fn walk_routes(catalog: Arc<WalkCatalog>) -> Router {
    Router::new()
        .route("/walks", get(list_handler).post(create_handler))
        .route("/walks/search/:query", get(search_handler))
        .route("/walks/with-site", get(with_site_handler))
        .route("/walks/many-keywords", get(many_keywords_handler))
        .route("/walks/published/:year", get(published_handler))
        .route("/walks/districts", get(district_synthesis_handler))
        .route("/walks/districts/:code/count", get(district_count_handler))
        .route("/walks/categories", get(categories_handler))
        .route("/walks/rename/:pattern", put(rename_handler))
        .route(
            "/walks/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/walks/:id/keywords", put(add_keyword_handler))
        .with_state(catalog)
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Malformed JSON becomes an `InvalidInput` error body instead of axum's
/// plain-text rejection.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> CatalogResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|e| CatalogError::invalid_input(format!("request body: {}", e.body_text())))
}

async fn create_handler(
    State(catalog): CatalogState,
    body: Result<Json<Value>, JsonRejection>,
) -> CatalogResult<(StatusCode, Json<Walk>)> {
    let walk = catalog.create(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(walk)))
}

async fn list_handler(State(catalog): CatalogState) -> CatalogResult<Json<Vec<Walk>>> {
    Ok(Json(catalog.get_all().await?))
}

async fn get_handler(
    State(catalog): CatalogState,
    Path(id): Path<String>,
) -> CatalogResult<Json<Walk>> {
    Ok(Json(catalog.get_by_id(&id).await?))
}

async fn search_handler(
    State(catalog): CatalogState,
    Path(query): Path<String>,
) -> CatalogResult<Json<Vec<Walk>>> {
    Ok(Json(catalog.search(&query).await?))
}

async fn with_site_handler(State(catalog): CatalogState) -> CatalogResult<Json<Vec<Walk>>> {
    Ok(Json(catalog.with_site().await?))
}

async fn many_keywords_handler(State(catalog): CatalogState) -> CatalogResult<Json<KeywordRich>> {
    Ok(Json(catalog.many_keywords().await?))
}

async fn published_handler(
    State(catalog): CatalogState,
    Path(year): Path<String>,
) -> CatalogResult<Json<Vec<Walk>>> {
    Ok(Json(catalog.published_in(&year).await?))
}

async fn district_count_handler(
    State(catalog): CatalogState,
    Path(code): Path<String>,
) -> CatalogResult<Json<CountResponse>> {
    let count = catalog.district_count(&code).await?;
    Ok(Json(CountResponse::new(count)))
}

async fn district_synthesis_handler(
    State(catalog): CatalogState,
) -> CatalogResult<Json<Vec<DistrictTally>>> {
    Ok(Json(catalog.district_synthesis().await?))
}

async fn categories_handler(State(catalog): CatalogState) -> CatalogResult<Json<Vec<String>>> {
    Ok(Json(catalog.categories().await?))
}

async fn update_handler(
    State(catalog): CatalogState,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> CatalogResult<Json<Walk>> {
    Ok(Json(catalog.update_by_id(&id, json_body(body)?).await?))
}

async fn add_keyword_handler(
    State(catalog): CatalogState,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> CatalogResult<Json<Walk>> {
    Ok(Json(catalog.add_keyword(&id, json_body(body)?).await?))
}

async fn rename_handler(
    State(catalog): CatalogState,
    Path(pattern): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> CatalogResult<Json<RenameResponse>> {
    let modified = catalog.bulk_rename(&pattern, json_body(body)?).await?;
    Ok(Json(RenameResponse::new(modified)))
}

async fn delete_handler(
    State(catalog): CatalogState,
    Path(id): Path<String>,
) -> CatalogResult<Json<DeleteResponse>> {
    let deleted = catalog.delete_by_id(&id).await?;
    Ok(Json(DeleteResponse::new(deleted)))
}
