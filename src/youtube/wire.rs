//! Response shapes for the Data API endpoints we call.
//!
//! Every list endpoint wraps its results in the same envelope: an `items`
//! array plus an optional `nextPageToken` continuation cursor. Fields the
//! pipeline does not consume are simply not modeled; missing fields
//! default rather than fail.

use serde::Deserialize;

/// Common list envelope: a page of items plus an optional cursor
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

// ---- channels.list ----

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
    #[serde(default, rename = "contentDetails")]
    pub content_details: ChannelContentDetails,
}

#[derive(Debug, Default, Deserialize)]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "publishedAt")]
    pub published_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChannelStatistics {
    #[serde(default, rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
    #[serde(default, rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(default, rename = "videoCount")]
    pub video_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChannelContentDetails {
    #[serde(default, rename = "relatedPlaylists")]
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedPlaylists {
    #[serde(default)]
    pub uploads: String,
}

// ---- playlists.list ----

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default, rename = "contentDetails")]
    pub content_details: PlaylistContentDetails,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaylistContentDetails {
    #[serde(default, rename = "itemCount")]
    pub item_count: Option<u64>,
}

// ---- playlistItems.list ----

#[derive(Debug, Deserialize)]
pub struct PlaylistEntryItem {
    #[serde(default, rename = "contentDetails")]
    pub content_details: PlaylistEntryContentDetails,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaylistEntryContentDetails {
    #[serde(default, rename = "videoId")]
    pub video_id: String,
}

// ---- videos.list ----

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
    #[serde(default, rename = "contentDetails")]
    pub content_details: VideoContentDetails,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoStatistics {
    #[serde(default, rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(default, rename = "likeCount")]
    pub like_count: Option<String>,
    #[serde(default, rename = "commentCount")]
    pub comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoContentDetails {
    #[serde(default)]
    pub duration: String,
}

// ---- commentThreads.list ----

#[derive(Debug, Deserialize)]
pub struct CommentThreadItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentThreadSnippet {
    #[serde(default, rename = "topLevelComment")]
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopLevelComment {
    #[serde(default)]
    pub snippet: CommentSnippet,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentSnippet {
    #[serde(default, rename = "authorDisplayName")]
    pub author_display_name: String,
    #[serde(default, rename = "textDisplay")]
    pub text_display: String,
    #[serde(default, rename = "likeCount")]
    pub like_count: Option<u64>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: String,
}

/// Coerce an optional string-encoded count to a non-negative integer,
/// defaulting to 0 (the platform serializes statistics as strings)
pub fn parse_count(raw: &Option<String>) -> u64 {
    raw.as_deref()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}
