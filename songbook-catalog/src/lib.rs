//! songbook-catalog library - song catalog service
//!
//! Stores songs in SQLite, serves filtered and paginated listings over HTTP
//! and enriches new songs from an external lyrics lookup service.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod filter;
pub mod lookup;
pub mod models;
pub mod pagination;
pub mod services;

use db::SqliteSongStore;
use lookup::LyricsLookup;
use services::CatalogService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog }
    }

    /// State backed by the SQLite store on `pool`
    pub fn with_pool(pool: SqlitePool, lookup: Arc<dyn LyricsLookup>) -> Self {
        let store = Arc::new(SqliteSongStore::new(pool));
        Self::new(CatalogService::new(store, lookup))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::song_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
