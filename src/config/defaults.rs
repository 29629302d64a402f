//! Default values for configuration

/// Default YouTube Data API base URL
pub fn default_api_base_url() -> String {
    std::env::var("TUBEVAULT_API_BASE_URL")
        .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string())
}

/// Default environment variable name for the API key
pub fn default_api_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}

/// Default request timeout in seconds
pub fn default_api_timeout() -> u64 {
    30
}

/// Default API rate limit (requests per second, shared across all endpoints)
pub fn default_api_rate_limit() -> u32 {
    8
}

/// Default user agent
pub fn default_api_user_agent() -> String {
    format!("tubevault/{} (Channel Harvester)", env!("CARGO_PKG_VERSION"))
}

/// Default bounded concurrency for per-video comment fetches
pub fn default_comment_concurrency() -> usize {
    4
}

/// Default: harvest comment threads during extraction
pub fn default_fetch_comments() -> bool {
    true
}
