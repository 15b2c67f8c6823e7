//! Database schema migrations
//!
//! Versioned, idempotent schema changes applied on top of the base tables
//! created by [`crate::db::init::create_tables`]. Progress is tracked in the
//! `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field already ran them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Keep them idempotent** - use `IF NOT EXISTS` or check `pragma_table_info`

use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
///
/// Creates the base tables first, so this alone is enough to prepare an
/// empty database (tests use it on `sqlite::memory:` pools).
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    crate::db::init::create_tables(pool).await?;

    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("✓ Migration v3 completed");
    }

    Ok(())
}

/// Migration v1: unique index on the (group, title) natural key
///
/// Refuses to run while duplicate pairs exist; they must be resolved by hand.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add natural key index to songs");

    let duplicates: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM (
            SELECT 1 FROM songs
            GROUP BY group_name, song_name
            HAVING COUNT(*) > 1
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if duplicates > 0 {
        return Err(Error::Config(format!(
            "songs table has {} duplicate (group, song) pairs; remove them before upgrading",
            duplicates
        )));
    }

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_songs_natural_key ON songs(group_name, song_name)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Migration v2: index release_date for range filters
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Add release_date index to songs");

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_release_date ON songs(release_date)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Lowercased copies of the substring-filterable columns
///
/// SQLite's `lower()` and `LIKE` only fold ASCII, so the folded values are
/// computed in Rust and kept current by every write.
const FOLDED_COLUMNS: [&str; 3] = ["group_name_folded", "song_name_folded", "link_folded"];

/// Migration v3: case-folded filter columns, backfilled from existing rows
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: Add case-folded filter columns to songs");

    for folded in FOLDED_COLUMNS {
        let has_column: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pragma_table_info('songs') WHERE name = ?1)",
        )
        .bind(folded)
        .fetch_one(pool)
        .await?;

        if !has_column {
            sqlx::query(&format!(
                "ALTER TABLE songs ADD COLUMN {} TEXT NOT NULL DEFAULT ''",
                folded
            ))
            .execute(pool)
            .await?;
        }
    }

    let rows: Vec<(i64, String, String, String)> =
        sqlx::query_as("SELECT id, group_name, song_name, link FROM songs")
            .fetch_all(pool)
            .await?;

    let mut tx = pool.begin().await?;
    for (id, group, song, link) in &rows {
        sqlx::query(
            "UPDATE songs SET group_name_folded = ?1, song_name_folded = ?2, link_folded = ?3 WHERE id = ?4",
        )
        .bind(group.to_lowercase())
        .bind(song.to_lowercase())
        .bind(link.to_lowercase())
        .bind(*id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Backfilled folded columns for {} songs", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_reach_current_version() {
        let pool = memory_pool().await;
        assert_eq!(get_schema_version(&pool).await.unwrap(), 0);

        run_migrations(&pool).await.unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);

        // Second run is a no-op
        run_migrations(&pool).await.unwrap();
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, CURRENT_SCHEMA_VERSION as i64);
    }

    #[tokio::test]
    async fn test_natural_key_index_rejects_duplicates() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();

        let insert = "INSERT INTO songs (group_name, song_name, release_date) VALUES ('Muse', 'Uprising', '2009-09-07')";
        sqlx::query(insert).execute(&pool).await.unwrap();
        let err = sqlx::query(insert).execute(&pool).await.unwrap_err();

        let is_unique = err
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false);
        assert!(is_unique, "expected unique violation, got {err:?}");
    }

    #[tokio::test]
    async fn test_v1_refuses_existing_duplicates() {
        let pool = memory_pool().await;
        crate::db::init::create_tables(&pool).await.unwrap();

        for _ in 0..2 {
            sqlx::query(
                "INSERT INTO songs (group_name, song_name, release_date) VALUES ('Muse', 'Uprising', '2009-09-07')",
            )
            .execute(&pool)
            .await
            .unwrap();
        }

        let result = run_migrations(&pool).await;
        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(get_schema_version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_v3_backfills_folded_columns() {
        let pool = memory_pool().await;
        crate::db::init::create_tables(&pool).await.unwrap();
        sqlx::query(
            "INSERT INTO songs (group_name, song_name, release_date, link) VALUES ('Кино', 'Группа Крови', '1988-01-04', 'HTTPS://Example.com/Kino')",
        )
        .execute(&pool)
        .await
        .unwrap();

        run_migrations(&pool).await.unwrap();

        let (group, song, link): (String, String, String) = sqlx::query_as(
            "SELECT group_name_folded, song_name_folded, link_folded FROM songs",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(group, "кино");
        assert_eq!(song, "группа крови");
        assert_eq!(link, "https://example.com/kino");
    }

    #[tokio::test]
    async fn test_v3_column_add_is_idempotent() {
        let pool = memory_pool().await;
        crate::db::init::create_tables(&pool).await.unwrap();

        migrate_v3(&pool).await.unwrap();
        migrate_v3(&pool).await.unwrap();

        let folded: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('songs') WHERE name LIKE '%_folded'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(folded, 3);
    }
}
