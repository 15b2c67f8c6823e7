//! Catalog service
//!
//! Thin orchestration over [`SongStore`] plus the create-song enrichment
//! workflow: the client supplies only group and title, the rest comes from
//! the lyrics lookup before anything is persisted.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::db::SongStore;
use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterSet;
use crate::lookup::LyricsLookup;
use crate::models::{Page, Song, SongData, SongDraft};
use crate::pagination::PageRequest;

/// Release date format used by the lookup service (`16.07.2006`)
pub const LOOKUP_DATE_FORMAT: &str = "%d.%m.%Y";

/// Verse separator in lookup lyric text
const VERSE_SEPARATOR: &str = "\n\n";

/// Split lyric text into verses on blank-line boundaries
///
/// Verse order follows the text. Non-empty text without a blank line is a
/// single verse; empty text has no verses.
///
/// # Examples
/// ```
/// use songbook_catalog::services::split_verses;
///
/// assert_eq!(split_verses("A\n\nB"), vec!["A", "B"]);
/// assert!(split_verses("").is_empty());
/// ```
pub fn split_verses(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(VERSE_SEPARATOR).map(str::to_string).collect()
}

fn log_failure(op: &'static str, err: &CatalogError) {
    debug!(op, error = %err, "Catalog operation failed");
}

/// Song catalog operations
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn SongStore>,
    lookup: Arc<dyn LyricsLookup>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn SongStore>, lookup: Arc<dyn LyricsLookup>) -> Self {
        Self { store, lookup }
    }

    pub async fn list_songs(
        &self,
        request: PageRequest,
        filters: &FilterSet,
    ) -> CatalogResult<Page<Vec<Song>>> {
        debug!(op = "list_songs", page = request.page, size = request.size, filters = ?filters);
        self.store
            .list_songs(request, filters)
            .await
            .inspect_err(|e| log_failure("list_songs", e))
    }

    pub async fn get_song(&self, id: i64, request: PageRequest) -> CatalogResult<Page<Song>> {
        debug!(op = "get_song", id, page = request.page, size = request.size);
        self.store
            .get_song(id, request)
            .await
            .inspect_err(|e| log_failure("get_song", e))
    }

    /// Enrich a draft from the lookup service and persist it
    ///
    /// Nothing is written when the lookup fails or returns an unparseable
    /// release date.
    pub async fn create_song(&self, draft: &SongDraft) -> CatalogResult<i64> {
        self.enrich_and_store(draft)
            .await
            .inspect_err(|e| log_failure("create_song", e))
    }

    async fn enrich_and_store(&self, draft: &SongDraft) -> CatalogResult<i64> {
        draft.validate()?;
        debug!(op = "create_song", group = %draft.group, song = %draft.song, "Fetching song detail");

        let detail = self
            .lookup
            .fetch_song_detail(&draft.group, &draft.song)
            .await?;

        let release_date = NaiveDate::parse_from_str(&detail.release_date, LOOKUP_DATE_FORMAT)
            .map_err(|source| CatalogError::DateParse {
                value: detail.release_date.clone(),
                source,
            })?;

        let data = SongData {
            group: draft.group.clone(),
            song: draft.song.clone(),
            release_date,
            lyrics: split_verses(&detail.text),
            link: detail.link,
        };

        let id = self.store.create_song(&data).await?;

        info!(
            op = "create_song",
            id,
            group = %data.group,
            song = %data.song,
            verses = data.lyrics.len(),
            "Song created"
        );

        Ok(id)
    }

    pub async fn update_song(&self, id: i64, data: &SongData) -> CatalogResult<()> {
        debug!(op = "update_song", id);
        data.validate()
            .inspect_err(|e| log_failure("update_song", e))?;
        self.store
            .update_song(id, data)
            .await
            .inspect_err(|e| log_failure("update_song", e))?;
        info!(op = "update_song", id, "Song updated");
        Ok(())
    }

    pub async fn delete_song(&self, id: i64) -> CatalogResult<()> {
        debug!(op = "delete_song", id);
        self.store
            .delete_song(id)
            .await
            .inspect_err(|e| log_failure("delete_song", e))?;
        info!(op = "delete_song", id, "Song deleted");
        Ok(())
    }
}
