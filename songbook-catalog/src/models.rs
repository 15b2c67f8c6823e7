//! Catalog data model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::pagination::{calculate_pagination, PageRequest};

/// Stored song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub group: String,
    pub song: String,
    pub release_date: NaiveDate,
    /// Verses in song order (possibly a page of them, see `get_song`)
    pub lyrics: Vec<String>,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied create request
///
/// Only the natural key is taken from the client. Any release date, lyrics
/// or link in the request body are ignored; they come from the lookup service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongDraft {
    pub group: String,
    pub song: String,
}

impl SongDraft {
    pub fn new(group: impl Into<String>, song: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            song: song.into(),
        }
    }

    /// Group and title are both required
    pub fn validate(&self) -> CatalogResult<()> {
        validate_natural_key(&self.group, &self.song)
    }
}

/// Every mutable song field, written together
///
/// Produced by enrichment for inserts and decoded from the request body for
/// updates (full replace: all fields are required).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongData {
    pub group: String,
    pub song: String,
    pub release_date: NaiveDate,
    pub lyrics: Vec<String>,
    pub link: String,
}

impl SongData {
    pub fn validate(&self) -> CatalogResult<()> {
        validate_natural_key(&self.group, &self.song)
    }
}

fn validate_natural_key(group: &str, song: &str) -> CatalogResult<()> {
    if group.trim().is_empty() {
        return Err(CatalogError::Validation("missing group".to_string()));
    }
    if song.trim().is_empty() {
        return Err(CatalogError::Validation("missing song".to_string()));
    }
    Ok(())
}

/// Paginated view over `T`
///
/// `Page<Vec<Song>>` for the song list, `Page<Song>` for a single song whose
/// lyrics hold one page of verses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: T,
    /// Total matching rows (list) or total verses (single song)
    pub count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    /// Wrap `data` with pagination fields computed from `count`
    pub fn new(data: T, count: i64, request: PageRequest) -> Self {
        let p = calculate_pagination(count, request.page, request.size);
        Self {
            data,
            count,
            total_pages: p.total_pages,
            current_page: request.page,
            has_next_page: p.has_next_page,
        }
    }
}
