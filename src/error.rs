//! Custom error types for tubevault

use thiserror::Error;

/// Main error type for tubevault operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request failed during {operation} for '{resource}': {message}")]
    Request {
        operation: &'static str,
        resource: String,
        message: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Unknown query: '{0}' (use 'tubevault query --list')")]
    UnknownQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Not initialized: run 'tubevault init' first")]
    NotInitialized,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a `Request` error with the operation and resource context the
    /// caller needs to retry manually.
    pub fn request(
        operation: &'static str,
        resource: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Error::Request {
            operation,
            resource: resource.into(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Result type alias for tubevault
pub type Result<T> = std::result::Result<T, Error>;
