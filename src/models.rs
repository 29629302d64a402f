//! Normalized record types produced by the extraction pipeline.
//!
//! The Data API returns loosely-shaped JSON (counts arrive as strings or
//! numbers, fields go missing); these types pin down the shape the staging
//! and warehouse layers rely on. Defaulting rules: missing counts become 0,
//! missing text becomes the empty string, durations stay as the raw
//! ISO-8601 string until the query layer needs minutes.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Staging collection kinds, one per resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    ChannelDetails,
    PlaylistDetails,
    VideoDetails,
    CommentDetails,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::ChannelDetails,
        Collection::PlaylistDetails,
        Collection::VideoDetails,
        Collection::CommentDetails,
    ];

    /// Collection label used as the staging key and log context
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::ChannelDetails => "channel_details",
            Collection::PlaylistDetails => "playlist_details",
            Collection::VideoDetails => "video_details",
            Collection::CommentDetails => "comment_details",
        }
    }

    /// Warehouse table fed by this collection
    pub fn table(&self) -> &'static str {
        match self {
            Collection::ChannelDetails => "channels",
            Collection::PlaylistDetails => "playlists",
            Collection::VideoDetails => "videos",
            Collection::CommentDetails => "comments",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s {
            "channel_details" => Ok(Collection::ChannelDetails),
            "playlist_details" => Ok(Collection::PlaylistDetails),
            "video_details" => Ok(Collection::VideoDetails),
            "comment_details" => Ok(Collection::CommentDetails),
            _ => Err(Error::Config(format!("Unknown collection: {}", s))),
        }
    }
}

/// One channel summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub channel_description: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub subscribers_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub views_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub video_count: u64,
    #[serde(default)]
    pub uploads_playlist_id: String,
}

/// One playlist owned by a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub playlist_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub item_count: u64,
}

/// One video, stamped with its owning channel id by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comment_count: u64,
    /// ISO-8601 duration, passed through unparsed
    #[serde(default)]
    pub duration: String,
}

/// One top-level comment on a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment_id: String,
    pub video_id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default)]
    pub published_at: String,
}

/// The four normalized batches one extraction run produces for a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelBatch {
    pub channel: ChannelRecord,
    pub playlists: Vec<PlaylistRecord>,
    pub videos: Vec<VideoRecord>,
    pub comments: Vec<CommentRecord>,
}

/// Deserialize a count that may arrive as a JSON number, a string-encoded
/// number, or be absent/null. Anything unparseable coerces to 0.
pub fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
        None,
    }

    Ok(match Raw::deserialize(deserializer) {
        Ok(Raw::Num(n)) => n,
        Ok(Raw::Str(s)) => s.trim().parse().unwrap_or(0),
        Ok(Raw::None) | Err(_) => 0,
    })
}
