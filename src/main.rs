//! tubevault CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tubevault::{
    commands::{
        cmd_extract, cmd_init, cmd_migrate, cmd_query, cmd_status, print_extract_stats,
        print_migration_stats, print_query_list, print_query_output, print_status,
    },
    config::Config,
    error::{Error, Result},
    staging::StagingStore,
    warehouse::Warehouse,
    youtube::ApiClient,
};

#[derive(Parser)]
#[command(name = "tubevault")]
#[command(version, about = "Harvest YouTube channel data and query it locally", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize tubevault configuration and databases
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Extract channel data into the staging store
    Extract {
        /// Channel IDs to harvest
        #[arg(required = true)]
        channel_ids: Vec<String>,

        /// Skip comment threads
        #[arg(long)]
        skip_comments: bool,
    },

    /// Migrate staged documents into the warehouse tables
    Migrate,

    /// Run a named analytical query against the warehouse
    Query {
        /// Query name (see --list)
        #[arg(required_unless_present = "list")]
        name: Option<String>,

        /// List available queries
        #[arg(long)]
        list: bool,
    },

    /// Show system status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Handle init command specially (doesn't need existing config)
    if let Commands::Init { force } = cli.command {
        let base_dir = cli.config.as_deref().and_then(|p| {
            if p.extension().map_or(false, |e| e == "toml") {
                p.parent().map(PathBuf::from)
            } else {
                Some(p.to_path_buf())
            }
        });
        let config = cmd_init(base_dir, force).await?;

        println!("✓ tubevault initialized successfully");
        println!("  Config: {}", config.paths.config_file.display());
        println!("\nNext steps:");
        println!("  1. Export your API key: export {}=...", config.api.api_key_env);
        println!("  2. Harvest a channel:   tubevault extract UC...");
        println!("  3. Build the warehouse: tubevault migrate");
        println!("  4. Ask questions:       tubevault query --list");
        return Ok(());
    }

    // Handle completions command (doesn't need config/db)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "tubevault", &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Extract {
            channel_ids,
            skip_comments,
        } => {
            let mut config = config;
            if skip_comments {
                config.extract.fetch_comments = false;
            }

            let api_key = config.api_key()?;
            let client = ApiClient::new(&config.api, api_key)?;
            let staging = StagingStore::new(&config.paths.staging_db).await?;

            let stats = cmd_extract(&config, &client, &staging, &channel_ids).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_extract_stats(&stats);
            }

            if stats.channels_failed > 0 {
                return Err(Error::Other(format!(
                    "{} of {} channels failed",
                    stats.channels_failed, stats.channels_requested
                )));
            }
        }

        Commands::Migrate => {
            let staging = StagingStore::new(&config.paths.staging_db).await?;
            let warehouse = Warehouse::new(&config.paths.warehouse_db).await?;

            let stats = cmd_migrate(&staging, &warehouse).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_migration_stats(&stats);
            }
        }

        Commands::Query { name, list } => {
            if list {
                print_query_list();
                return Ok(());
            }

            // clap enforces name unless --list was given
            let Some(name) = name else { unreachable!() };

            let warehouse = Warehouse::new(&config.paths.warehouse_db).await?;
            let output = cmd_query(&warehouse, &name).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_query_output(&output);
            }
        }

        Commands::Status => {
            let staging = StagingStore::new(&config.paths.staging_db).await?;
            let warehouse = Warehouse::new(&config.paths.warehouse_db).await?;

            let status = cmd_status(&config, &staging, &warehouse).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}


fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(p) => {
            let config_path = if p.extension().map_or(false, |e| e == "toml") {
                p.to_path_buf()
            } else {
                p.join("config.toml")
            };
            Config::load(&config_path)
        }
        None => {
            let config = Config::load_from(None)?;
            if !config.is_initialized() {
                return Err(Error::NotInitialized);
            }
            Ok(config)
        }
    }
}
