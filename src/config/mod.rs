//! Configuration management for tubevault
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// YouTube Data API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Extraction pipeline configuration
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// YouTube Data API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Data API (overridable for testing)
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Environment variable name holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Requests per second, shared across all endpoints
    #[serde(default = "default_api_rate_limit")]
    pub requests_per_second: u32,

    /// User agent string
    #[serde(default = "default_api_user_agent")]
    pub user_agent: String,
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Concurrent comment-thread fetches per channel
    #[serde(default = "default_comment_concurrency")]
    pub comment_concurrency: usize,

    /// Whether to harvest comment threads at all
    #[serde(default = "default_fetch_comments")]
    pub fetch_comments: bool,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for tubevault data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to the SQLite staging database
    pub staging_db: PathBuf,

    /// Path to the SQLite warehouse database
    pub warehouse_db: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            extract: ExtractConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_api_timeout(),
            requests_per_second: default_api_rate_limit(),
            user_agent: default_api_user_agent(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            comment_concurrency: default_comment_concurrency(),
            fetch_comments: default_fetch_comments(),
        }
    }
}

impl Config {
    /// Get the default base directory for tubevault (~/.tubevault)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tubevault")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            staging_db: base.join("staging.db"),
            warehouse_db: base.join("warehouse.db"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Set up paths based on config file location
        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            staging_db: base.join("staging.db"),
            warehouse_db: base.join("warehouse.db"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Resolve the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api.api_key_env).map_err(|_| {
            Error::Config(format!(
                "API key not found: set the {} environment variable",
                self.api.api_key_env
            ))
        })
    }

    /// Check if tubevault is initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.paths.config_file.exists()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }

        if self.api.timeout_secs == 0 {
            return Err(Error::Config(
                "api.timeout_secs must be positive".to_string(),
            ));
        }

        if self.api.requests_per_second == 0 {
            return Err(Error::Config(
                "api.requests_per_second must be positive".to_string(),
            ));
        }

        if self.extract.comment_concurrency == 0 {
            return Err(Error::Config(
                "extract.comment_concurrency must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
