//! Schemaless staging store backed by SQLite
//!
//! Extracted batches land here as raw JSON documents, one logical
//! collection per resource kind. The store is append-only by design:
//! re-extracting a channel appends duplicate documents rather than
//! upserting (known limitation, surfaced through `status` counts). There
//! is no transaction spanning the four collections; a failed extraction
//! can leave a partially-staged channel behind, which the next successful
//! migration simply carries along.

mod schema;

pub use schema::SCHEMA_SQL;

use crate::error::Result;
use crate::models::{ChannelBatch, Collection};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Extraction run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    NotFound,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::NotFound => write!(f, "not_found"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "not_found" => Ok(RunStatus::NotFound),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(crate::error::Error::Config(format!(
                "Unknown run status: {}",
                s
            ))),
        }
    }
}

/// One extraction run record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExtractionRun {
    pub id: String,
    pub channel_id: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub status: String,
    pub playlists_staged: i64,
    pub videos_staged: i64,
    pub comments_staged: i64,
    pub error: Option<String>,
}

impl ExtractionRun {
    /// Parse the stored status label back to the typed value
    pub fn run_status(&self) -> Result<RunStatus> {
        self.status.parse()
    }

    pub fn new(channel_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            channel_id,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
            status: RunStatus::Running.to_string(),
            playlists_staged: 0,
            videos_staged: 0,
            comments_staged: 0,
            error: None,
        }
    }
}

/// Per-collection document counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingStats {
    pub channel_documents: usize,
    pub playlist_documents: usize,
    pub video_documents: usize,
    pub comment_documents: usize,
}

/// Staging store handle
#[derive(Clone)]
pub struct StagingStore {
    pool: SqlitePool,
}

impl StagingStore {
    /// Open (creating if missing) the staging database at the given path
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to staging database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Append a batch of JSON documents to one collection.
    ///
    /// No dedup and no validation: normalization happened upstream.
    pub async fn insert_documents(
        &self,
        collection: Collection,
        documents: &[serde_json::Value],
    ) -> Result<usize> {
        let staged_at = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        for doc in documents {
            sqlx::query(
                "INSERT INTO staged_documents (collection, body, staged_at) VALUES (?, ?, ?)",
            )
            .bind(collection.as_str())
            .bind(doc.to_string())
            .bind(&staged_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("Staged {} documents into {}", documents.len(), collection);
        Ok(documents.len())
    }

    /// Stage one channel's four batches, collection by collection.
    ///
    /// Deliberately not atomic across collections: a failure after the
    /// channel document is staged leaves earlier collections behind.
    pub async fn stage_batch(&self, batch: &ChannelBatch) -> Result<()> {
        self.insert_documents(
            Collection::ChannelDetails,
            &[serde_json::to_value(&batch.channel)?],
        )
        .await?;

        let playlists = batch
            .playlists
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.insert_documents(Collection::PlaylistDetails, &playlists)
            .await?;

        let videos = batch
            .videos
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.insert_documents(Collection::VideoDetails, &videos)
            .await?;

        let comments = batch
            .comments
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.insert_documents(Collection::CommentDetails, &comments)
            .await?;

        info!(
            "Staged channel '{}' ({} playlists, {} videos, {} comments)",
            batch.channel.channel_id,
            batch.playlists.len(),
            batch.videos.len(),
            batch.comments.len()
        );
        Ok(())
    }

    /// Read every document body in a collection, oldest first.
    ///
    /// The store-assigned row id is internal and never leaves this method;
    /// only the JSON body crosses to the migrator.
    pub async fn read_collection(&self, collection: Collection) -> Result<Vec<serde_json::Value>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM staged_documents WHERE collection = ? ORDER BY id",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        bodies
            .iter()
            .map(|b| serde_json::from_str(b).map_err(Into::into))
            .collect()
    }

    /// Count documents in one collection
    pub async fn count_documents(&self, collection: Collection) -> Result<usize> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM staged_documents WHERE collection = ?")
                .bind(collection.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count as usize)
    }

    /// Per-collection counts for the status command
    pub async fn stats(&self) -> Result<StagingStats> {
        Ok(StagingStats {
            channel_documents: self.count_documents(Collection::ChannelDetails).await?,
            playlist_documents: self.count_documents(Collection::PlaylistDetails).await?,
            video_documents: self.count_documents(Collection::VideoDetails).await?,
            comment_documents: self.count_documents(Collection::CommentDetails).await?,
        })
    }

    // ===== Extraction run history =====

    /// Record the start of an extraction run
    pub async fn start_run(&self, channel_id: &str) -> Result<ExtractionRun> {
        let run = ExtractionRun::new(channel_id.to_string());
        sqlx::query(
            r#"
            INSERT INTO extraction_runs (id, channel_id, started_at, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&run.id)
        .bind(&run.channel_id)
        .bind(&run.started_at)
        .bind(&run.status)
        .execute(&self.pool)
        .await?;
        Ok(run)
    }

    /// Complete an extraction run with its outcome
    pub async fn complete_run(
        &self,
        id: &str,
        status: RunStatus,
        playlists_staged: usize,
        videos_staged: usize,
        comments_staged: usize,
        error: Option<String>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE extraction_runs SET
                completed_at = ?,
                status = ?,
                playlists_staged = ?,
                videos_staged = ?,
                comments_staged = ?,
                error = ?
            WHERE id = ?
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(status.to_string())
        .bind(playlists_staged as i64)
        .bind(videos_staged as i64)
        .bind(comments_staged as i64)
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent runs, newest first
    pub async fn recent_runs(&self, limit: usize) -> Result<Vec<ExtractionRun>> {
        let runs = sqlx::query_as::<_, ExtractionRun>(
            "SELECT * FROM extraction_runs ORDER BY started_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelRecord, PlaylistRecord};
    use serde_json::json;
    use tempfile::TempDir;

    async fn setup_store() -> (StagingStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = StagingStore::new(&tmp.path().join("staging.db"))
            .await
            .unwrap();
        (store, tmp)
    }

    #[tokio::test]
    async fn test_insert_and_read_collection() {
        let (store, _tmp) = setup_store().await;

        let docs = vec![json!({"video_id": "v1"}), json!({"video_id": "v2"})];
        store
            .insert_documents(Collection::VideoDetails, &docs)
            .await
            .unwrap();

        let read = store.read_collection(Collection::VideoDetails).await.unwrap();
        assert_eq!(read, docs);
        assert!(store
            .read_collection(Collection::CommentDetails)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_appends_do_not_dedupe() {
        let (store, _tmp) = setup_store().await;

        let doc = vec![json!({"channel_id": "UC1"})];
        store
            .insert_documents(Collection::ChannelDetails, &doc)
            .await
            .unwrap();
        store
            .insert_documents(Collection::ChannelDetails, &doc)
            .await
            .unwrap();

        assert_eq!(
            store.count_documents(Collection::ChannelDetails).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_stage_batch_fills_all_collections() {
        let (store, _tmp) = setup_store().await;

        let batch = ChannelBatch {
            channel: ChannelRecord {
                channel_id: "UC1".to_string(),
                channel_name: "Chan".to_string(),
                channel_description: String::new(),
                subscribers_count: 1,
                views_count: 2,
                video_count: 0,
                uploads_playlist_id: "UU1".to_string(),
            },
            playlists: vec![PlaylistRecord {
                playlist_id: "PL1".to_string(),
                channel_id: "UC1".to_string(),
                title: "Mix".to_string(),
                item_count: 4,
            }],
            videos: Vec::new(),
            comments: Vec::new(),
        };

        store.stage_batch(&batch).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.channel_documents, 1);
        assert_eq!(stats.playlist_documents, 1);
        assert_eq!(stats.video_documents, 0);
        assert_eq!(stats.comment_documents, 0);
    }

    #[tokio::test]
    async fn test_run_history() {
        let (store, _tmp) = setup_store().await;

        let run = store.start_run("UC1").await.unwrap();
        store
            .complete_run(&run.id, RunStatus::Completed, 2, 10, 50, None)
            .await
            .unwrap();

        let runs = store.recent_runs(10).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_status().unwrap(), RunStatus::Completed);
        assert_eq!(runs[0].videos_staged, 10);
        assert!(runs[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn test_run_status_round_trips_through_storage() {
        let (store, _tmp) = setup_store().await;

        for status in [RunStatus::Completed, RunStatus::NotFound, RunStatus::Failed] {
            let run = store.start_run("UC1").await.unwrap();
            store
                .complete_run(&run.id, status, 0, 0, 0, None)
                .await
                .unwrap();
        }

        let runs = store.recent_runs(10).await.unwrap();
        let parsed: Vec<RunStatus> = runs
            .iter()
            .map(|r| r.run_status().unwrap())
            .collect();
        assert_eq!(parsed.len(), 3);
        assert!(parsed.contains(&RunStatus::Failed));
        assert!(parsed.contains(&RunStatus::NotFound));
        assert!("bogus".parse::<RunStatus>().is_err());
    }
}
