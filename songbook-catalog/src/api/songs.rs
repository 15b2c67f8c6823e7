//! Song CRUD endpoints
//!
//! `page` and `size` are read from the query string on both list and get;
//! every other query key on the list route is treated as a filter.

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::filter::FilterSet;
use crate::models::{Page, Song, SongData, SongDraft};
use crate::pagination::PageRequest;
use crate::AppState;

/// `{"data": ...}` envelope for write responses
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Split `page`/`size` out of the query map
///
/// Values that are not integers fall back to defaults.
fn take_page_request(params: &mut HashMap<String, String>) -> PageRequest {
    let page = params.remove("page").and_then(|v| v.parse().ok());
    let size = params.remove("size").and_then(|v| v.parse().ok());
    PageRequest::new(page, size)
}

fn parse_song_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid song id: {}", raw)))
}

/// GET /api/songs
pub async fn list_songs(
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<Vec<Song>>>> {
    let request = take_page_request(&mut params);
    let filters: FilterSet = params;

    let page = state.catalog.list_songs(request, &filters).await?;
    Ok(Json(page))
}

/// GET /api/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(mut params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<Song>>> {
    let id = parse_song_id(&id)?;
    let request = take_page_request(&mut params);

    let page = state.catalog.get_song(id, request).await?;
    Ok(Json(page))
}

/// POST /api/songs
///
/// Body `{"group": .., "song": ..}`; responds 201 with the new id.
pub async fn create_song(
    State(state): State<AppState>,
    body: Result<Json<SongDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<i64>>)> {
    let Json(draft) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let id = state.catalog.create_song(&draft).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: id })))
}

/// PUT /api/songs/:id
///
/// Full replace: every field of the body is required.
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SongData>, JsonRejection>,
) -> ApiResult<Json<DataResponse<&'static str>>> {
    let id = parse_song_id(&id)?;
    let Json(data) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    state.catalog.update_song(id, &data).await?;
    Ok(Json(DataResponse { data: "OK" }))
}

/// DELETE /api/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_song_id(&id)?;

    state.catalog.delete_song(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build song CRUD routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list_songs).post(create_song))
        .route(
            "/api/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
}
