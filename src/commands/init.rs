//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::staging::StagingStore;
use crate::warehouse::Warehouse;
use std::path::PathBuf;
use tracing::info;

/// Initialize tubevault configuration and databases
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let mut config = Config::default();
    config.init_paths(base_dir);

    if config.paths.config_file.exists() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config.paths.config_file.display()
        )));
    }

    std::fs::create_dir_all(&config.paths.base_dir)?;
    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    // Touch both databases so later commands find them in place
    StagingStore::new(&config.paths.staging_db).await?;
    Warehouse::new(&config.paths.warehouse_db).await?;
    info!("Created databases under {:?}", config.paths.base_dir);

    Ok(config)
}
