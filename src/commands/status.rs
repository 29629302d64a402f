//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::staging::{ExtractionRun, RunStatus, StagingStats, StagingStore};
use crate::warehouse::Warehouse;
use serde::{Deserialize, Serialize};

/// Row counts in the warehouse tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarehouseCounts {
    pub channels: i64,
    pub playlists: i64,
    pub videos: i64,
    pub comments: i64,
}

/// Full system status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub base_dir: String,
    pub config_file: String,
    pub staging_db: String,
    pub warehouse_db: String,
    pub staging: StagingStats,
    /// None until the first migration has run
    pub warehouse: Option<WarehouseCounts>,
    pub recent_runs: Vec<ExtractionRun>,
}

/// Gather status across both stores
pub async fn cmd_status(
    config: &Config,
    staging: &StagingStore,
    warehouse: &Warehouse,
) -> Result<StatusInfo> {
    let warehouse_counts = if warehouse.is_populated().await? {
        Some(WarehouseCounts {
            channels: table_count(warehouse, "channels").await?,
            playlists: table_count(warehouse, "playlists").await?,
            videos: table_count(warehouse, "videos").await?,
            comments: table_count(warehouse, "comments").await?,
        })
    } else {
        None
    };

    Ok(StatusInfo {
        base_dir: config.paths.base_dir.display().to_string(),
        config_file: config.paths.config_file.display().to_string(),
        staging_db: config.paths.staging_db.display().to_string(),
        warehouse_db: config.paths.warehouse_db.display().to_string(),
        staging: staging.stats().await?,
        warehouse: warehouse_counts,
        recent_runs: staging.recent_runs(5).await?,
    })
}

async fn table_count(warehouse: &Warehouse, table: &str) -> Result<i64> {
    // table comes from the fixed list above, never from user input
    let out = warehouse
        .run_sql(&format!("SELECT COUNT(*) FROM {}", table))
        .await?;
    Ok(out
        .rows
        .first()
        .and_then(|r| r.first())
        .and_then(|v| v.as_i64())
        .unwrap_or(0))
}

/// Human-readable status report
pub fn print_status(status: &StatusInfo) {
    println!("tubevault status");
    println!("  Base dir:     {}", status.base_dir);
    println!("  Config:       {}", status.config_file);
    println!("  Staging db:   {}", status.staging_db);
    println!("  Warehouse db: {}", status.warehouse_db);

    println!("\nStaging documents:");
    println!("  Channels:  {}", status.staging.channel_documents);
    println!("  Playlists: {}", status.staging.playlist_documents);
    println!("  Videos:    {}", status.staging.video_documents);
    println!("  Comments:  {}", status.staging.comment_documents);

    match &status.warehouse {
        Some(counts) => {
            println!("\nWarehouse rows:");
            println!("  Channels:  {}", counts.channels);
            println!("  Playlists: {}", counts.playlists);
            println!("  Videos:    {}", counts.videos);
            println!("  Comments:  {}", counts.comments);
        }
        None => println!("\nWarehouse: not migrated yet (run 'tubevault migrate')"),
    }

    if !status.recent_runs.is_empty() {
        println!("\nRecent extraction runs:");
        for run in &status.recent_runs {
            let marker = match run.run_status() {
                Ok(RunStatus::Completed) => "✓",
                Ok(RunStatus::Running) => "…",
                _ => "✗",
            };
            println!(
                "  {} {}  {}  {} ({} playlists, {} videos, {} comments)",
                marker, run.started_at, run.channel_id, run.status,
                run.playlists_staged, run.videos_staged, run.comments_staged
            );
            if let Some(error) = &run.error {
                println!("      error: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Collection;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_before_and_after_migration() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));

        let staging = StagingStore::new(&config.paths.staging_db).await.unwrap();
        let warehouse = Warehouse::new(&config.paths.warehouse_db).await.unwrap();

        staging
            .insert_documents(
                Collection::VideoDetails,
                &[json!({"video_id": "v1", "channel_id": "UC1", "title": "A",
                         "published_at": "2022-01-01T00:00:00Z", "view_count": 1,
                         "like_count": 0, "comment_count": 0, "duration": "PT1M"})],
            )
            .await
            .unwrap();

        let before = cmd_status(&config, &staging, &warehouse).await.unwrap();
        assert_eq!(before.staging.video_documents, 1);
        assert!(before.warehouse.is_none());

        warehouse.migrate(&staging).await.unwrap();

        let after = cmd_status(&config, &staging, &warehouse).await.unwrap();
        let counts = after.warehouse.unwrap();
        assert_eq!(counts.videos, 1);
        assert_eq!(counts.channels, 0);
    }
}
