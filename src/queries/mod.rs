//! Fixed catalog of analytical queries against the warehouse
//!
//! The catalog is a static lookup table: ten named questions, each mapped
//! to a canned statement. No user-supplied SQL crosses this boundary. All
//! joins are LEFT JOINs so rows with a missing parent still surface.

use crate::error::{Error, Result};
use crate::warehouse::{QueryOutput, Warehouse};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::warn;

/// How a catalog entry is answered
#[derive(Debug)]
enum QueryKind {
    /// Runs as-is against the warehouse
    Sql(&'static str),
    /// Average video duration per channel; durations are ISO-8601 strings
    /// the relational layer cannot aggregate, so the averaging happens
    /// here after a plain row fetch.
    AverageDuration,
}

/// One catalog entry
#[derive(Debug)]
pub struct CatalogQuery {
    pub name: &'static str,
    pub description: &'static str,
    kind: QueryKind,
}

/// The ten analytical questions, in dashboard order
pub const CATALOG: &[CatalogQuery] = &[
    CatalogQuery {
        name: "video-channels",
        description: "Names of all videos and their channels",
        kind: QueryKind::Sql(
            "SELECT v.title AS video_title, c.channel_name \
             FROM videos v LEFT JOIN channels c ON v.channel_id = c.channel_id \
             ORDER BY c.channel_name, v.title",
        ),
    },
    CatalogQuery {
        name: "most-videos",
        description: "Channel with the most videos",
        kind: QueryKind::Sql(
            "SELECT c.channel_name, COUNT(v.video_id) AS video_count \
             FROM channels c LEFT JOIN videos v ON v.channel_id = c.channel_id \
             GROUP BY c.channel_id ORDER BY video_count DESC LIMIT 1",
        ),
    },
    CatalogQuery {
        name: "top-viewed",
        description: "Top 10 most viewed videos and their channels",
        kind: QueryKind::Sql(
            "SELECT v.title AS video_title, v.view_count, c.channel_name \
             FROM videos v LEFT JOIN channels c ON v.channel_id = c.channel_id \
             ORDER BY v.view_count DESC LIMIT 10",
        ),
    },
    CatalogQuery {
        name: "comment-counts",
        description: "Number of comments per video",
        kind: QueryKind::Sql(
            "SELECT v.title AS video_title, COUNT(cm.comment_id) AS comment_count \
             FROM videos v LEFT JOIN comments cm ON cm.video_id = v.video_id \
             GROUP BY v.video_id ORDER BY comment_count DESC",
        ),
    },
    CatalogQuery {
        name: "top-liked",
        description: "Top 10 videos by likes with channel names",
        kind: QueryKind::Sql(
            "SELECT v.title AS video_title, v.like_count, c.channel_name \
             FROM videos v LEFT JOIN channels c ON v.channel_id = c.channel_id \
             ORDER BY v.like_count DESC LIMIT 10",
        ),
    },
    CatalogQuery {
        name: "video-likes",
        description: "Like totals per video",
        kind: QueryKind::Sql(
            "SELECT title AS video_title, like_count FROM videos \
             ORDER BY like_count DESC",
        ),
    },
    CatalogQuery {
        name: "channel-views",
        description: "Total views per channel",
        // Summed over the harvested videos, not the channel-level lifetime
        // statistic: the two disagree whenever the uploads playlist does
        // not cover the channel's full history.
        kind: QueryKind::Sql(
            "SELECT c.channel_name, SUM(v.view_count) AS total_views \
             FROM videos v LEFT JOIN channels c ON v.channel_id = c.channel_id \
             GROUP BY c.channel_name ORDER BY total_views DESC",
        ),
    },
    CatalogQuery {
        name: "published-2022",
        description: "Channels that published videos in 2022",
        kind: QueryKind::Sql(
            "SELECT DISTINCT c.channel_name \
             FROM videos v LEFT JOIN channels c ON v.channel_id = c.channel_id \
             WHERE strftime('%Y', v.published_at) = '2022' \
             ORDER BY c.channel_name",
        ),
    },
    CatalogQuery {
        name: "avg-duration",
        description: "Average video duration (minutes) per channel",
        kind: QueryKind::AverageDuration,
    },
    CatalogQuery {
        name: "top-commented",
        description: "Top 10 videos by comment count with channel names",
        kind: QueryKind::Sql(
            "SELECT v.title AS video_title, v.comment_count, c.channel_name \
             FROM videos v LEFT JOIN channels c ON v.channel_id = c.channel_id \
             ORDER BY v.comment_count DESC LIMIT 10",
        ),
    },
];

/// Look up a catalog entry by name
pub fn find(name: &str) -> Result<&'static CatalogQuery> {
    CATALOG
        .iter()
        .find(|q| q.name == name)
        .ok_or_else(|| Error::UnknownQuery(name.to_string()))
}

/// Run one named query against the warehouse
pub async fn run(warehouse: &Warehouse, name: &str) -> Result<QueryOutput> {
    let query = find(name)?;
    match query.kind {
        QueryKind::Sql(sql) => warehouse.run_sql(sql).await,
        QueryKind::AverageDuration => average_duration(warehouse).await,
    }
}

async fn average_duration(warehouse: &Warehouse) -> Result<QueryOutput> {
    let raw = warehouse
        .run_sql(
            "SELECT COALESCE(c.channel_name, v.channel_id) AS channel_name, v.duration \
             FROM videos v LEFT JOIN channels c ON v.channel_id = c.channel_id",
        )
        .await?;

    // channel name -> (minute sum, parsed count); BTreeMap keeps output
    // ordering stable
    let mut per_channel: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in &raw.rows {
        let channel = row
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let duration = row.get(1).and_then(|v| v.as_str()).unwrap_or_default();
        match duration_minutes(duration) {
            Some(minutes) => {
                let entry = per_channel.entry(channel).or_insert((0.0, 0));
                entry.0 += minutes;
                entry.1 += 1;
            }
            None => warn!("Unparseable duration '{}' skipped for averaging", duration),
        }
    }

    let rows = per_channel
        .into_iter()
        .map(|(channel, (sum, count))| vec![json!(channel), json!(sum / count as f64)])
        .collect();

    Ok(QueryOutput {
        columns: vec![
            "channel_name".to_string(),
            "avg_duration_minutes".to_string(),
        ],
        rows,
    })
}

/// Parse an ISO-8601 duration of the `PnDTnHnMnS` family into minutes.
///
/// Only the units the platform emits for videos (days, hours, minutes,
/// seconds) are accepted; anything else returns `None`.
pub fn duration_minutes(duration: &str) -> Option<f64> {
    let rest = duration.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut minutes = 0.0;
    for (part, is_time) in [(date_part, false), (time_part, true)] {
        let mut digits = String::new();
        for ch in part.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            let value: f64 = digits.parse().ok()?;
            digits.clear();
            minutes += match (ch, is_time) {
                ('D', false) => value * 24.0 * 60.0,
                ('H', true) => value * 60.0,
                ('M', true) => value,
                ('S', true) => value / 60.0,
                _ => return None,
            };
        }
        if !digits.is_empty() {
            return None;
        }
    }
    Some(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Collection;
    use crate::staging::StagingStore;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_duration_parsing() {
        assert_eq!(duration_minutes("PT10M"), Some(10.0));
        assert_eq!(duration_minutes("PT1H30M"), Some(90.0));
        assert_eq!(duration_minutes("PT90S"), Some(1.5));
        assert_eq!(duration_minutes("P1DT1H"), Some(25.0 * 60.0));
        assert_eq!(duration_minutes("PT1H2M30S"), Some(62.5));
        assert_eq!(duration_minutes("P0D"), Some(0.0));
        assert_eq!(duration_minutes(""), None);
        assert_eq!(duration_minutes("10M"), None);
        assert_eq!(duration_minutes("PT10X"), None);
        assert_eq!(duration_minutes("PT10"), None);
    }

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(CATALOG.len(), 10);
        assert!(find("top-viewed").is_ok());
        let err = find("nope").unwrap_err();
        assert!(matches!(err, Error::UnknownQuery(_)));
    }

    async fn populated_warehouse(tmp: &TempDir) -> Warehouse {
        let staging = StagingStore::new(&tmp.path().join("staging.db"))
            .await
            .unwrap();
        staging
            .insert_documents(
                Collection::ChannelDetails,
                &[json!({
                    "channel_id": "UC1", "channel_name": "Chan",
                    "channel_description": "", "subscribers_count": 5,
                    // Lifetime statistic, deliberately larger than the sum
                    // of the harvested videos' views
                    "views_count": 999999, "video_count": 2,
                    "uploads_playlist_id": "UU1"
                })],
            )
            .await
            .unwrap();
        staging
            .insert_documents(
                Collection::VideoDetails,
                &[
                    json!({"video_id": "v1", "channel_id": "UC1", "title": "A",
                           "published_at": "2022-03-01T00:00:00Z", "view_count": 30,
                           "like_count": 3, "comment_count": 1, "duration": "PT10M"}),
                    json!({"video_id": "v2", "channel_id": "UC1", "title": "B",
                           "published_at": "2023-01-01T00:00:00Z", "view_count": 70,
                           "like_count": 7, "comment_count": 0, "duration": "PT20M"}),
                ],
            )
            .await
            .unwrap();

        let warehouse = Warehouse::new(&tmp.path().join("warehouse.db"))
            .await
            .unwrap();
        warehouse.migrate(&staging).await.unwrap();
        warehouse
    }

    #[tokio::test]
    async fn test_average_duration_per_channel() {
        let tmp = TempDir::new().unwrap();
        let warehouse = populated_warehouse(&tmp).await;

        let out = run(&warehouse, "avg-duration").await.unwrap();
        assert_eq!(out.columns, vec!["channel_name", "avg_duration_minutes"]);
        assert_eq!(out.rows, vec![vec![json!("Chan"), json!(15.0)]]);
    }

    #[tokio::test]
    async fn test_published_2022_filters_by_year() {
        let tmp = TempDir::new().unwrap();
        let warehouse = populated_warehouse(&tmp).await;

        let out = run(&warehouse, "published-2022").await.unwrap();
        assert_eq!(out.rows, vec![vec![json!("Chan")]]);
    }

    #[tokio::test]
    async fn test_top_viewed_orders_descending() {
        let tmp = TempDir::new().unwrap();
        let warehouse = populated_warehouse(&tmp).await;

        let out = run(&warehouse, "top-viewed").await.unwrap();
        assert_eq!(out.rows[0][0], json!("B"));
        assert_eq!(out.rows[0][1], json!(70));
        assert_eq!(out.rows[1][0], json!("A"));
    }

    #[tokio::test]
    async fn test_channel_views_sums_harvested_videos() {
        let tmp = TempDir::new().unwrap();
        let warehouse = populated_warehouse(&tmp).await;

        // 30 + 70 from the videos table, not the 999999 channel statistic
        let out = run(&warehouse, "channel-views").await.unwrap();
        assert_eq!(out.rows, vec![vec![json!("Chan"), json!(100)]]);
    }

    #[tokio::test]
    async fn test_unknown_query_name() {
        let tmp = TempDir::new().unwrap();
        let warehouse = populated_warehouse(&tmp).await;

        let err = run(&warehouse, "drop-tables").await.unwrap_err();
        assert!(err.to_string().contains("drop-tables"));
    }
}
