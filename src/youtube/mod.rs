//! YouTube Data API client adapter
//!
//! This module provides:
//! - Typed fetches for channels, playlists, playlist items, videos, and
//!   comment threads
//! - Cursor pagination (loop while `nextPageToken` is present)
//! - Batch chunking for video-id lookups (≤ 50 ids per request)
//! - API-key authentication and shared request rate limiting

mod rate_limit;
pub mod wire;

pub use rate_limit::ApiRateLimiter;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{ChannelRecord, CommentRecord, PlaylistRecord, VideoRecord};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use wire::{parse_count, Page};

/// Platform maximum ids per videos.list request
pub const VIDEO_BATCH_LIMIT: usize = 50;

/// Platform maximum page size for playlists and playlist items
pub const LIST_PAGE_SIZE: u32 = 50;

/// Platform maximum page size for comment threads
pub const COMMENT_PAGE_SIZE: u32 = 100;

/// Client for the Data API, constructed once at process start and injected
/// into the extraction pipeline.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
    limiter: ApiRateLimiter,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &ApiConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        // Url::join treats a path without a trailing slash as a file, so
        // normalize before parsing.
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            limiter: ApiRateLimiter::new(config.requests_per_second),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid API base URL: {}", e)))
    }

    /// Issue one GET against a list endpoint and decode the page envelope
    async fn get_page<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        resource: &str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Page<T>> {
        self.limiter.acquire().await;

        let url = self.endpoint(path)?;
        debug!("GET {} ({} for '{}')", path, operation, resource);

        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| Error::request(operation, resource, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::request(
                operation,
                resource,
                format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>()),
            ));
        }

        response
            .json::<Page<T>>()
            .await
            .map_err(|e| Error::request(operation, resource, e))
    }

    /// Fetch one channel summary; `Ok(None)` when the id resolves to
    /// zero platform results (not an error).
    pub async fn fetch_channel(&self, channel_id: &str) -> Result<Option<ChannelRecord>> {
        let page: Page<wire::ChannelItem> = self
            .get_page(
                "channel fetch",
                channel_id,
                "channels",
                &[("part", "snippet,contentDetails,statistics"), ("id", channel_id)],
            )
            .await?;

        let Some(item) = page.items.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(ChannelRecord {
            channel_id: channel_id.to_string(),
            channel_name: item.snippet.title,
            channel_description: item.snippet.description,
            subscribers_count: parse_count(&item.statistics.subscriber_count),
            views_count: parse_count(&item.statistics.view_count),
            video_count: parse_count(&item.statistics.video_count),
            uploads_playlist_id: item.content_details.related_playlists.uploads,
        }))
    }

    /// List every playlist owned by a channel, concatenating all pages
    pub async fn list_playlists(&self, channel_id: &str) -> Result<Vec<PlaylistRecord>> {
        let page_size = LIST_PAGE_SIZE.to_string();
        let mut playlists = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "snippet,contentDetails"),
                ("channelId", channel_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(t) = token.as_deref() {
                params.push(("pageToken", t));
            }

            let page: Page<wire::PlaylistItem> = self
                .get_page("playlist listing", channel_id, "playlists", &params)
                .await?;

            for item in page.items {
                playlists.push(PlaylistRecord {
                    playlist_id: item.id,
                    channel_id: channel_id.to_string(),
                    title: item.snippet.title,
                    item_count: item.content_details.item_count.unwrap_or(0),
                });
            }

            token = page.next_page_token;
            if token.is_none() {
                break;
            }
        }

        Ok(playlists)
    }

    /// List every video id contained in a playlist, concatenating all pages
    pub async fn list_video_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        let page_size = LIST_PAGE_SIZE.to_string();
        let mut ids = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(t) = token.as_deref() {
                params.push(("pageToken", t));
            }

            let page: Page<wire::PlaylistEntryItem> = self
                .get_page("video id listing", playlist_id, "playlistItems", &params)
                .await?;

            for item in page.items {
                if !item.content_details.video_id.is_empty() {
                    ids.push(item.content_details.video_id);
                }
            }

            token = page.next_page_token;
            if token.is_none() {
                break;
            }
        }

        Ok(ids)
    }

    /// Fetch full metadata for a list of video ids via chunked batch lookup.
    ///
    /// Ids are deduplicated, partitioned into chunks of at most
    /// [`VIDEO_BATCH_LIMIT`], and the concatenated output preserves input
    /// order. The videos endpoint does not report the owning channel, so
    /// every record is stamped with `channel_id` here.
    pub async fn fetch_videos(
        &self,
        video_ids: &[String],
        channel_id: &str,
    ) -> Result<Vec<VideoRecord>> {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = video_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .collect();

        let mut videos = Vec::with_capacity(unique.len());

        for chunk in unique.chunks(VIDEO_BATCH_LIMIT) {
            let joined = chunk
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");

            let page: Page<wire::VideoItem> = self
                .get_page(
                    "video fetch",
                    channel_id,
                    "videos",
                    &[
                        ("part", "snippet,contentDetails,statistics"),
                        ("id", joined.as_str()),
                    ],
                )
                .await?;

            // The platform does not guarantee response order; re-align to
            // the requested id order.
            let mut by_id: HashMap<String, wire::VideoItem> = page
                .items
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect();

            for id in chunk {
                let Some(item) = by_id.remove(id.as_str()) else {
                    debug!("Video '{}' missing from batch response", id);
                    continue;
                };
                videos.push(VideoRecord {
                    video_id: item.id,
                    channel_id: channel_id.to_string(),
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                    view_count: parse_count(&item.statistics.view_count),
                    like_count: parse_count(&item.statistics.like_count),
                    comment_count: parse_count(&item.statistics.comment_count),
                    duration: item.content_details.duration,
                });
            }
        }

        Ok(videos)
    }

    /// List top-level comment threads for one video.
    ///
    /// A request failure mid-pagination (disabled comments, quota, network)
    /// is treated as "no more data": pagination stops and the pages already
    /// collected are returned. The truncation is logged so it stays
    /// observable, but it never surfaces as an error.
    pub async fn list_comment_threads(&self, video_id: &str) -> Vec<CommentRecord> {
        let page_size = COMMENT_PAGE_SIZE.to_string();
        let mut comments = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(t) = token.as_deref() {
                params.push(("pageToken", t));
            }

            let page: Page<wire::CommentThreadItem> = match self
                .get_page("comment fetch", video_id, "commentThreads", &params)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "Comment fetch truncated for video '{}' ({} comments kept): {}",
                        video_id,
                        comments.len(),
                        e
                    );
                    break;
                }
            };

            for item in page.items {
                let snippet = item.snippet.top_level_comment.snippet;
                comments.push(CommentRecord {
                    comment_id: item.id,
                    video_id: video_id.to_string(),
                    author: snippet.author_display_name,
                    text: snippet.text_display,
                    like_count: snippet.like_count.unwrap_or(0),
                    published_at: snippet.published_at,
                });
            }

            token = page.next_page_token;
            if token.is_none() {
                break;
            }
        }

        comments
    }
}
