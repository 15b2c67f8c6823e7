//! songbook-info library - stand-in lyrics lookup service
//!
//! Answers `GET /info?group=..&song=..` with a fixed song detail so the
//! catalog service can be run and tested without the real lookup backend.

use std::future::Future;
use std::io;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use songbook_common::api::{HealthResponse, SongDetail};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Default listen port
pub const DEFAULT_PORT: u16 = 8081;

/// Query parameters for `/info`
#[derive(Debug, Default, Deserialize)]
pub struct InfoQuery {
    pub group: Option<String>,
    pub song: Option<String>,
}

/// Detail returned for every well-formed request
pub fn canned_detail() -> SongDetail {
    SongDetail {
        release_date: "16.07.2006".to_string(),
        text: "Ooh baby, don't you know I suffer?\n\
               Ooh baby, can you hear me moan?\n\
               You caught me under false pretenses\n\
               How long before you let me go?\n\
               \n\
               Ooh\n\
               You set my soul alight\n\
               Ooh\n\
               You set my soul alight"
            .to_string(),
        link: "https://example.com".to_string(),
    }
}

/// GET /info
///
/// 400 unless both `group` and `song` are present and non-empty.
pub async fn song_info(Query(query): Query<InfoQuery>) -> Response {
    let group = query.group.unwrap_or_default();
    let song = query.song.unwrap_or_default();

    if group.is_empty() || song.is_empty() {
        debug!(group = %group, song = %song, "Rejecting incomplete info request");
        return StatusCode::BAD_REQUEST.into_response();
    }

    debug!(group = %group, song = %song, "Serving song info");
    Json(canned_detail()).into_response()
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Build application router
pub fn build_router() -> Router {
    Router::new()
        .route("/info", get(song_info))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
}

/// Resolves once `signal` fires
///
/// If the handler cannot be installed the error is logged and the future
/// never resolves, so the server keeps running instead of exiting at once.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
