//! Extraction pipeline: one channel id in, four normalized batches out.
//!
//! Step order follows the platform's data model: the channel summary names
//! the uploads playlist, the uploads playlist enumerates video ids, video
//! ids drive the chunked metadata lookup and the per-video comment fetch.

use crate::config::ExtractConfig;
use crate::error::Result;
use crate::models::{ChannelBatch, CommentRecord};
use crate::youtube::ApiClient;
use futures::{stream, StreamExt};
use tracing::{debug, info};

/// Extract everything for one channel.
///
/// Returns `Ok(None)` when the platform reports no such channel; callers
/// must distinguish that from a transient failure, which propagates as an
/// error and aborts this channel only.
pub async fn extract_channel(
    client: &ApiClient,
    options: &ExtractConfig,
    channel_id: &str,
) -> Result<Option<ChannelBatch>> {
    let Some(channel) = client.fetch_channel(channel_id).await? else {
        info!("Channel '{}' not found on the platform", channel_id);
        return Ok(None);
    };

    let playlists = client.list_playlists(channel_id).await?;
    debug!("Channel '{}': {} playlists", channel_id, playlists.len());

    let video_ids = if channel.uploads_playlist_id.is_empty() {
        debug!("Channel '{}' has no uploads playlist", channel_id);
        Vec::new()
    } else {
        client.list_video_ids(&channel.uploads_playlist_id).await?
    };

    let videos = client.fetch_videos(&video_ids, channel_id).await?;

    let comments = if options.fetch_comments {
        collect_comments(client, &video_ids, options.comment_concurrency).await
    } else {
        Vec::new()
    };

    info!(
        "Extracted channel '{}': {} playlists, {} videos, {} comments",
        channel_id,
        playlists.len(),
        videos.len(),
        comments.len()
    );

    Ok(Some(ChannelBatch {
        channel,
        playlists,
        videos,
        comments,
    }))
}

/// Fetch top-level comment threads for every video with bounded concurrency.
///
/// Each video is isolated: a failed or truncated fetch yields whatever was
/// collected for that video and never cancels its siblings.
pub async fn collect_comments(
    client: &ApiClient,
    video_ids: &[String],
    concurrency: usize,
) -> Vec<CommentRecord> {
    stream::iter(video_ids)
        .map(|video_id| client.list_comment_threads(video_id))
        .buffered(concurrency.max(1))
        .concat()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            requests_per_second: 1000,
            ..ApiConfig::default()
        };
        ApiClient::new(&config, "test-key".to_string()).unwrap()
    }

    fn options() -> ExtractConfig {
        ExtractConfig {
            comment_concurrency: 2,
            fetch_comments: true,
        }
    }

    async fn mount_channel(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("id", "UCabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "UCabc",
                    "snippet": {"title": "Chan", "description": ""},
                    "statistics": {"subscriberCount": "10", "viewCount": "100",
                                   "videoCount": "3"},
                    "contentDetails": {"relatedPlaylists": {"uploads": "UUabc"}}
                }]
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "PL1", "snippet": {"title": "Mix"},
                     "contentDetails": {"itemCount": 2}}
                ]
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .and(query_param("playlistId", "UUabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"contentDetails": {"videoId": "va"}},
                    {"contentDetails": {"videoId": "vb"}},
                    {"contentDetails": {"videoId": "vc"}}
                ]
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "va", "snippet": {"title": "A"}, "statistics": {},
                     "contentDetails": {"duration": "PT10M"}},
                    {"id": "vb", "snippet": {"title": "B"}, "statistics": {},
                     "contentDetails": {"duration": "PT20M"}},
                    {"id": "vc", "snippet": {"title": "C"}, "statistics": {},
                     "contentDetails": {"duration": "PT30M"}}
                ]
            })))
            .mount(server)
            .await;
    }

    fn comment_page(id: &str, author: &str) -> serde_json::Value {
        json!({
            "items": [{
                "id": id,
                "snippet": {"topLevelComment": {"snippet": {
                    "authorDisplayName": author,
                    "textDisplay": "hi",
                    "likeCount": 1,
                    "publishedAt": "2022-01-01T00:00:00Z"
                }}}
            }]
        })
    }

    #[tokio::test]
    async fn test_extract_channel_full_pipeline() {
        let server = MockServer::start().await;
        mount_channel(&server).await;

        for (vid, cid) in [("va", "ca"), ("vb", "cb"), ("vc", "cc")] {
            Mock::given(method("GET"))
                .and(path("/commentThreads"))
                .and(query_param("videoId", vid))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(comment_page(cid, "user")),
                )
                .mount(&server)
                .await;
        }

        let client = test_client(&server.uri());
        let batch = extract_channel(&client, &options(), "UCabc")
            .await
            .unwrap()
            .unwrap();

        // Platform-reported count survives normalization
        assert_eq!(batch.channel.video_count, 3);
        assert_eq!(batch.playlists.len(), 1);
        assert_eq!(batch.videos.len(), 3);
        assert_eq!(batch.comments.len(), 3);
        assert!(batch.videos.iter().all(|v| v.channel_id == "UCabc"));
    }

    #[tokio::test]
    async fn test_comment_failure_on_one_video_spares_siblings() {
        let server = MockServer::start().await;
        mount_channel(&server).await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("videoId", "va"))
            .respond_with(ResponseTemplate::new(200).set_body_json(comment_page("ca", "u1")))
            .mount(&server)
            .await;

        // vb fails outright; va and vc must still be collected
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("videoId", "vb"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("videoId", "vc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(comment_page("cc", "u3")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let batch = extract_channel(&client, &options(), "UCabc")
            .await
            .unwrap()
            .unwrap();

        let mut ids: Vec<&str> = batch.comments.iter().map(|c| c.comment_id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["ca", "cc"]);
    }

    #[tokio::test]
    async fn test_extract_channel_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = extract_channel(&client, &options(), "UCmissing")
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_extract_channel_without_uploads_playlist() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "UCempty",
                    "snippet": {"title": "Empty"},
                    "statistics": {"videoCount": "0"},
                    "contentDetails": {"relatedPlaylists": {}}
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let batch = extract_channel(&client, &options(), "UCempty")
            .await
            .unwrap()
            .unwrap();

        assert!(batch.videos.is_empty());
        assert!(batch.comments.is_empty());
    }

    #[tokio::test]
    async fn test_skip_comments_option() {
        let server = MockServer::start().await;
        mount_channel(&server).await;

        let opts = ExtractConfig {
            comment_concurrency: 2,
            fetch_comments: false,
        };
        let client = test_client(&server.uri());
        let batch = extract_channel(&client, &opts, "UCabc")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(batch.videos.len(), 3);
        assert!(batch.comments.is_empty());
    }
}
