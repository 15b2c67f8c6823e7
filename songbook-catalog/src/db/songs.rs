//! Song persistence
//!
//! `SongStore` is the seam the catalog service depends on; `SqliteSongStore`
//! is the production implementation on top of the shared `SqlitePool`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, types::Json, Row, SqlitePool};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::filter::{compile_filters, fold_case, FilterSet};
use crate::models::{Page, Song, SongData};
use crate::pagination::PageRequest;

/// Columns selected for a full song row
const SONG_COLUMNS: &str =
    "id, group_name, song_name, release_date, lyrics, link, created_at, updated_at";

/// Song persistence operations
#[async_trait]
pub trait SongStore: Send + Sync {
    /// One page of songs matching `filters`, ordered by id
    async fn list_songs(
        &self,
        request: PageRequest,
        filters: &FilterSet,
    ) -> CatalogResult<Page<Vec<Song>>>;

    /// A song with one page of its verses; `count` is the total verse count
    async fn get_song(&self, id: i64, request: PageRequest) -> CatalogResult<Page<Song>>;

    /// Insert a song, returning its id; `AlreadyExists` on a natural-key clash
    async fn create_song(&self, song: &SongData) -> CatalogResult<i64>;

    /// Replace every mutable field of an existing song
    async fn update_song(&self, id: i64, song: &SongData) -> CatalogResult<()>;

    async fn delete_song(&self, id: i64) -> CatalogResult<()>;
}

/// SQLite-backed song store
#[derive(Debug, Clone)]
pub struct SqliteSongStore {
    pool: SqlitePool,
}

impl SqliteSongStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// `NotFound` unless a row with `id` exists
    async fn ensure_exists(&self, id: i64) -> CatalogResult<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM songs WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        found.map(|_| ()).ok_or(CatalogError::NotFound)
    }
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn list_songs(
        &self,
        request: PageRequest,
        filters: &FilterSet,
    ) -> CatalogResult<Page<Vec<Song>>> {
        let clause = compile_filters(filters);
        let where_sql = clause.where_sql();
        let limit_at = clause.next_placeholder();

        let select_sql = format!(
            "SELECT {} FROM songs{} ORDER BY id LIMIT ?{} OFFSET ?{}",
            SONG_COLUMNS,
            where_sql,
            limit_at,
            limit_at + 1
        );
        let count_sql = format!("SELECT COUNT(*) FROM songs{}", where_sql);

        debug!(sql = %select_sql, args = ?clause.args(), "Listing songs");

        // Count and page are read from the same snapshot
        let mut tx = self.pool.begin().await?;

        let mut query = sqlx::query(&select_sql);
        for arg in clause.args() {
            query = query.bind(arg.as_str());
        }
        let rows = query
            .bind(request.size)
            .bind(request.offset())
            .fetch_all(&mut *tx)
            .await?;

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in clause.args() {
            count_query = count_query.bind(arg.as_str());
        }
        let count = count_query.fetch_one(&mut *tx).await?;

        tx.commit().await?;

        let songs = rows
            .iter()
            .map(song_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(songs, count, request))
    }

    async fn get_song(&self, id: i64, request: PageRequest) -> CatalogResult<Page<Song>> {
        // 1-based verse window [offset + 1, offset + size], sliced by SQLite
        let first = request.offset().saturating_add(1);
        let last = request.offset().saturating_add(request.size);

        let row = sqlx::query(
            r#"
            SELECT id, group_name, song_name, release_date, link, created_at, updated_at,
                   (SELECT json_group_array(value ORDER BY key)
                      FROM json_each(songs.lyrics)
                     WHERE key + 1 BETWEEN ?2 AND ?3) AS lyrics,
                   json_array_length(songs.lyrics) AS verse_count
            FROM songs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(first)
        .bind(last)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CatalogError::NotFound)?;

        let song = song_from_row(&row)?;
        let verse_count: i64 = row.try_get("verse_count")?;

        Ok(Page::new(song, verse_count, request))
    }

    async fn create_song(&self, song: &SongData) -> CatalogResult<i64> {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM songs WHERE group_name = ?1 AND song_name = ?2")
                .bind(&song.group)
                .bind(&song.song)
                .fetch_optional(&self.pool)
                .await?;

        if existing.is_some() {
            return Err(CatalogError::AlreadyExists);
        }

        // A concurrent insert of the same pair still fails on the unique index
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO songs (group_name, song_name, release_date, lyrics, link, created_at, updated_at,
                               group_name_folded, song_name_folded, link_folded)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7, ?8, ?9)
            RETURNING id
            "#,
        )
        .bind(&song.group)
        .bind(&song.song)
        .bind(song.release_date)
        .bind(Json(&song.lyrics))
        .bind(&song.link)
        .bind(now)
        .bind(fold_case(&song.group))
        .bind(fold_case(&song.song))
        .bind(fold_case(&song.link))
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;

        Ok(id)
    }

    async fn update_song(&self, id: i64, song: &SongData) -> CatalogResult<()> {
        self.ensure_exists(id).await?;

        let result = sqlx::query(
            r#"
            UPDATE songs
            SET group_name = ?1, song_name = ?2, release_date = ?3, lyrics = ?4, link = ?5,
                updated_at = ?6, group_name_folded = ?8, song_name_folded = ?9, link_folded = ?10
            WHERE id = ?7
            "#,
        )
        .bind(&song.group)
        .bind(&song.song)
        .bind(song.release_date)
        .bind(Json(&song.lyrics))
        .bind(&song.link)
        .bind(Utc::now())
        .bind(id)
        .bind(fold_case(&song.group))
        .bind(fold_case(&song.song))
        .bind(fold_case(&song.link))
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;

        // Deleted between the check and the update
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        Ok(())
    }

    async fn delete_song(&self, id: i64) -> CatalogResult<()> {
        self.ensure_exists(id).await?;

        let result = sqlx::query("DELETE FROM songs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        Ok(())
    }
}

fn song_from_row(row: &SqliteRow) -> Result<Song, sqlx::Error> {
    let Json(lyrics): Json<Vec<String>> = row.try_get("lyrics")?;

    Ok(Song {
        id: row.try_get("id")?,
        group: row.try_get("group_name")?,
        song: row.try_get("song_name")?,
        release_date: row.try_get("release_date")?,
        lyrics,
        link: row.try_get("link")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Unique-index violations mean the natural key is taken
fn classify_write_error(err: sqlx::Error) -> CatalogError {
    let unique = err
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation());

    if unique {
        CatalogError::AlreadyExists
    } else {
        CatalogError::Store(err)
    }
}
