//! Relational warehouse fed by whole-store migration
//!
//! Migration is a one-shot replace: every staged document is read,
//! flattened into its typed record, and the four tables are dropped and
//! recreated with the fresh contents. The four replacements run inside a
//! single transaction, so a failed migration leaves the previous warehouse
//! visible. Concurrent migrations are not serialized here; run one at a
//! time.

use crate::error::{Error, Result};
use crate::models::{ChannelRecord, Collection, CommentRecord, PlaylistRecord, VideoRecord};
use crate::staging::StagingStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row};
use std::path::Path;
use tracing::{debug, info, warn};

/// Row counts written by one migration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationStats {
    pub channels: usize,
    pub playlists: usize,
    pub videos: usize,
    pub comments: usize,
}

/// A query result with its column names, row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Warehouse database handle
#[derive(Clone)]
pub struct Warehouse {
    pool: SqlitePool,
}

impl Warehouse {
    /// Open (creating if missing) the warehouse database at the given path
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to warehouse database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Migrate every staged document into the relational tables.
    ///
    /// Whole-store, not incremental: the same staged data migrated twice
    /// produces identical tables.
    pub async fn migrate(&self, staging: &StagingStore) -> Result<MigrationStats> {
        info!("Starting warehouse migration");

        let channels: Vec<ChannelRecord> =
            read_records(staging, Collection::ChannelDetails).await?;
        let playlists: Vec<PlaylistRecord> =
            read_records(staging, Collection::PlaylistDetails).await?;
        let videos: Vec<VideoRecord> = read_records(staging, Collection::VideoDetails).await?;
        let comments: Vec<CommentRecord> =
            read_records(staging, Collection::CommentDetails).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS channels").execute(&mut *tx).await?;
        sqlx::query(
            r#"
            CREATE TABLE channels (
                channel_id TEXT NOT NULL,
                channel_name TEXT NOT NULL,
                channel_description TEXT NOT NULL,
                subscribers_count INTEGER NOT NULL,
                views_count INTEGER NOT NULL,
                video_count INTEGER NOT NULL,
                uploads_playlist_id TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;
        for c in &channels {
            sqlx::query("INSERT INTO channels VALUES (?, ?, ?, ?, ?, ?, ?)")
                .bind(&c.channel_id)
                .bind(&c.channel_name)
                .bind(&c.channel_description)
                .bind(c.subscribers_count as i64)
                .bind(c.views_count as i64)
                .bind(c.video_count as i64)
                .bind(&c.uploads_playlist_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DROP TABLE IF EXISTS playlists").execute(&mut *tx).await?;
        sqlx::query(
            r#"
            CREATE TABLE playlists (
                playlist_id TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                title TEXT NOT NULL,
                item_count INTEGER NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;
        for p in &playlists {
            sqlx::query("INSERT INTO playlists VALUES (?, ?, ?, ?)")
                .bind(&p.playlist_id)
                .bind(&p.channel_id)
                .bind(&p.title)
                .bind(p.item_count as i64)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DROP TABLE IF EXISTS videos").execute(&mut *tx).await?;
        sqlx::query(
            r#"
            CREATE TABLE videos (
                video_id TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                title TEXT NOT NULL,
                published_at TEXT NOT NULL,
                view_count INTEGER NOT NULL,
                like_count INTEGER NOT NULL,
                comment_count INTEGER NOT NULL,
                duration TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;
        for v in &videos {
            sqlx::query("INSERT INTO videos VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
                .bind(&v.video_id)
                .bind(&v.channel_id)
                .bind(&v.title)
                .bind(&v.published_at)
                .bind(v.view_count as i64)
                .bind(v.like_count as i64)
                .bind(v.comment_count as i64)
                .bind(&v.duration)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DROP TABLE IF EXISTS comments").execute(&mut *tx).await?;
        sqlx::query(
            r#"
            CREATE TABLE comments (
                comment_id TEXT NOT NULL,
                video_id TEXT NOT NULL,
                author TEXT NOT NULL,
                text TEXT NOT NULL,
                like_count INTEGER NOT NULL,
                published_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;
        for c in &comments {
            sqlx::query("INSERT INTO comments VALUES (?, ?, ?, ?, ?, ?)")
                .bind(&c.comment_id)
                .bind(&c.video_id)
                .bind(&c.author)
                .bind(&c.text)
                .bind(c.like_count as i64)
                .bind(&c.published_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let stats = MigrationStats {
            channels: channels.len(),
            playlists: playlists.len(),
            videos: videos.len(),
            comments: comments.len(),
        };
        info!(
            "Migration complete: {} channels, {} playlists, {} videos, {} comments",
            stats.channels, stats.playlists, stats.videos, stats.comments
        );
        Ok(stats)
    }

    /// Run a catalog query and decode every row dynamically
    pub async fn run_sql(&self, sql: &str) -> Result<QueryOutput> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| match e {
                // Tables only exist after the first migration
                sqlx::Error::Database(ref db) if db.message().contains("no such table") => {
                    Error::Migration(
                        "Warehouse tables missing: run 'tubevault migrate' first".to_string(),
                    )
                }
                other => Error::Storage(other),
            })?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows.iter().map(row_to_values).collect();
        Ok(QueryOutput { columns, rows })
    }

    /// True once the warehouse has been populated at least once
    pub async fn is_populated(&self) -> Result<bool> {
        let found: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='channels'",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }
}

/// Deserialize one staged collection, skipping documents that no longer
/// match the record shape (logged, never fatal).
async fn read_records<T: DeserializeOwned>(
    staging: &StagingStore,
    collection: Collection,
) -> Result<Vec<T>> {
    let documents = staging.read_collection(collection).await?;
    let mut records = Vec::with_capacity(documents.len());
    for doc in documents {
        match serde_json::from_value(doc) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed {} document: {}", collection, e),
        }
    }
    Ok(records)
}

/// SQLite stores dynamically-typed values; probe integer, then real, then
/// text.
fn row_to_values(row: &SqliteRow) -> Vec<serde_json::Value> {
    (0..row.columns().len())
        .map(|i| {
            if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
                return v.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
                return v.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null);
            }
            match row.try_get::<Option<String>, _>(i) {
                Ok(v) => v.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null),
                Err(_) => serde_json::Value::Null,
            }
        })
        .collect()
}
