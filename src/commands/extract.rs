//! Extract command implementation
//!
//! Harvests one or more channels into the staging store. Channels are
//! isolated from each other: a failed channel is logged, recorded in the
//! run history, and never stops its siblings.

use crate::config::Config;
use crate::error::Result;
use crate::extract::extract_channel;
use crate::staging::{RunStatus, StagingStore};
use crate::youtube::ApiClient;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Aggregate outcome of one extract invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractStats {
    pub channels_requested: usize,
    pub channels_staged: usize,
    pub channels_not_found: usize,
    pub channels_failed: usize,
    pub playlists_staged: usize,
    pub videos_staged: usize,
    pub comments_staged: usize,
}

/// Extract and stage every requested channel
pub async fn cmd_extract(
    config: &Config,
    client: &ApiClient,
    staging: &StagingStore,
    channel_ids: &[String],
) -> Result<ExtractStats> {
    let mut stats = ExtractStats {
        channels_requested: channel_ids.len(),
        ..Default::default()
    };

    let pb = start_progress_bar(channel_ids.len());

    for channel_id in channel_ids {
        if let Some(pb) = &pb {
            pb.set_message(channel_id.clone());
        }

        let run = staging.start_run(channel_id).await?;

        match extract_channel(client, &config.extract, channel_id).await {
            Ok(Some(batch)) => {
                staging.stage_batch(&batch).await?;
                staging
                    .complete_run(
                        &run.id,
                        RunStatus::Completed,
                        batch.playlists.len(),
                        batch.videos.len(),
                        batch.comments.len(),
                        None,
                    )
                    .await?;

                stats.channels_staged += 1;
                stats.playlists_staged += batch.playlists.len();
                stats.videos_staged += batch.videos.len();
                stats.comments_staged += batch.comments.len();
            }
            Ok(None) => {
                staging
                    .complete_run(&run.id, RunStatus::NotFound, 0, 0, 0, None)
                    .await?;
                stats.channels_not_found += 1;
            }
            Err(e) => {
                error!("Extraction failed for channel '{}': {}", channel_id, e);
                staging
                    .complete_run(&run.id, RunStatus::Failed, 0, 0, 0, Some(e.to_string()))
                    .await?;
                stats.channels_failed += 1;
            }
        }

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!(
        "Extract finished: {} staged, {} not found, {} failed",
        stats.channels_staged, stats.channels_not_found, stats.channels_failed
    );
    Ok(stats)
}

fn start_progress_bar(len: usize) -> Option<ProgressBar> {
    if len < 2 {
        return None;
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Human-readable extract summary
pub fn print_extract_stats(stats: &ExtractStats) {
    println!("\n✓ Extraction complete");
    println!("  Channels requested: {}", stats.channels_requested);
    println!("  Channels staged:    {}", stats.channels_staged);
    if stats.channels_not_found > 0 {
        println!("  Channels not found: {}", stats.channels_not_found);
    }
    if stats.channels_failed > 0 {
        println!("  Channels failed:    {}", stats.channels_failed);
    }
    println!("  Playlists staged:   {}", stats.playlists_staged);
    println!("  Videos staged:      {}", stats.videos_staged);
    println!("  Comments staged:    {}", stats.comments_staged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> Config {
        let mut config = Config::default();
        config.api = ApiConfig {
            base_url: base_url.to_string(),
            requests_per_second: 1000,
            ..ApiConfig::default()
        };
        config.extract.fetch_comments = false;
        config
    }

    async fn mount_channel(server: &MockServer, channel_id: &str) {
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("id", channel_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": channel_id,
                    "snippet": {"title": "Chan", "description": ""},
                    "statistics": {"videoCount": "0"},
                    "contentDetails": {"relatedPlaylists": {}}
                }]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_failed_channel_spares_siblings() {
        let server = MockServer::start().await;
        mount_channel(&server, "UCgood").await;

        // UCbad: channel lookup itself fails
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("id", "UCbad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let staging = StagingStore::new(&tmp.path().join("staging.db"))
            .await
            .unwrap();
        let config = test_config(&server.uri());
        let client = ApiClient::new(&config.api, "test-key".to_string()).unwrap();

        let ids = vec!["UCbad".to_string(), "UCgood".to_string()];
        let stats = cmd_extract(&config, &client, &staging, &ids).await.unwrap();

        assert_eq!(stats.channels_requested, 2);
        assert_eq!(stats.channels_staged, 1);
        assert_eq!(stats.channels_failed, 1);

        let runs = staging.recent_runs(10).await.unwrap();
        assert_eq!(runs.len(), 2);
        let failed = runs.iter().find(|r| r.channel_id == "UCbad").unwrap();
        assert_eq!(failed.run_status().unwrap(), RunStatus::Failed);
        assert!(failed.error.is_some());
    }

    #[tokio::test]
    async fn test_not_found_channel_is_recorded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let staging = StagingStore::new(&tmp.path().join("staging.db"))
            .await
            .unwrap();
        let config = test_config(&server.uri());
        let client = ApiClient::new(&config.api, "test-key".to_string()).unwrap();

        let stats = cmd_extract(&config, &client, &staging, &["UCmissing".to_string()])
            .await
            .unwrap();

        assert_eq!(stats.channels_not_found, 1);
        assert_eq!(stats.channels_staged, 0);

        let runs = staging.recent_runs(10).await.unwrap();
        assert_eq!(runs[0].run_status().unwrap(), RunStatus::NotFound);
    }
}
