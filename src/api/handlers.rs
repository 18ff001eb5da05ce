//! API Handlers
//!
//! HTTP request handlers, one per distiller operation.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::CacheRecord;
use crate::distiller::{Distiller, ListOptions, Listing};
use crate::error::{DistillerError, Result};
use crate::models::{
    DropResponse, FollowerCountResponse, HealthResponse, ListQuery, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub distiller: Arc<Distiller>,
}

impl AppState {
    pub fn new(distiller: Distiller) -> Self {
        Self {
            distiller: Arc::new(distiller),
        }
    }
}

fn list_options(query: &ListQuery, defaults: ListOptions) -> Result<ListOptions> {
    if let Some(error_msg) = query.validate() {
        return Err(DistillerError::InvalidRequest(error_msg));
    }
    Ok(query.options(defaults))
}

/// Handler for GET /content/:address
pub async fn content_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<CacheRecord>> {
    let record = state.distiller.get_content(address).await?;
    Ok(Json(record))
}

/// Handler for GET /children/:address
pub async fn children_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing>> {
    let options = list_options(&query, ListOptions::default())?;
    let listing = state.distiller.get_children(address, options).await?;
    Ok(Json(listing))
}

/// Handler for GET /tag/:tag
pub async fn tag_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing>> {
    let options = list_options(&query, ListOptions::default())?;
    let listing = state.distiller.get_tag(&tag, options).await?;
    Ok(Json(listing))
}

/// Handler for GET /posts/:address
///
/// Feed defaults differ from the other listings: ten items, hydrated.
pub async fn posts_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing>> {
    let options = list_options(&query, ListOptions::feed())?;
    let listing = state.distiller.get_posts(address, options).await?;
    Ok(Json(listing))
}

/// Handler for GET /account/:address
pub async fn account_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<CacheRecord>> {
    let record = state.distiller.get_account(address).await?;
    Ok(Json(record))
}

/// Handler for GET /followers/:address
pub async fn followers_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<FollowerCountResponse>> {
    let count = state.distiller.get_follower_count(address.as_str()).await?;
    Ok(Json(FollowerCountResponse::new(address, count)))
}

/// Handler for DELETE /cache
///
/// Wipes every record. Meant for maintenance and test setup.
pub async fn drop_handler(State(state): State<AppState>) -> Result<Json<DropResponse>> {
    let dropped = state.distiller.stats().await.total_entries;
    state.distiller.drop_all().await?;
    Ok(Json(DropResponse::new(dropped)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.distiller.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
