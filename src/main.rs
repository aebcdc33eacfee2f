mod app;
mod config;
mod constants;
mod debounce;
mod error;
mod fingerprint;
mod loader;
mod persistence;
mod player;
mod source;
mod store;
mod types;
mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::AppConfig;
use view::{GalleryView, SortKey};

#[derive(Parser)]
#[command(
    name = "video-gallery",
    version,
    about = "Searchable video gallery kept in sync with a JSON manifest"
)]
struct Cli {
    /// Config file (default: <config dir>/video-gallery/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manifest URL, absolute or relative to --base-url
    #[arg(long, global = true)]
    manifest_url: Option<String>,

    /// Base URL for a relative manifest URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Fingerprint storage file, or `memory` to persist nothing
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Background poll interval in seconds (0 disables polling)
    #[arg(long, global = true)]
    poll_secs: Option<u64>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the manifest once and print the gallery
    Sync {
        /// Adopt the manifest even if its fingerprint is unchanged
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Print the gallery filtered and sorted
    List {
        /// Search titles and descriptions
        #[arg(long, short, default_value = "")]
        query: String,

        #[arg(long, value_enum, default_value_t = SortKey::Document)]
        sort: SortKey,
    },

    /// Resolve what would play for the entry at INDEX (manifest order)
    Play { index: usize },

    /// Interactive gallery with background polling
    Browse,

    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long, default_value_t = false)]
        write: bool,
    },
}

fn init_logging() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout carries the gallery itself, logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn effective_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    if let Some(url) = &cli.manifest_url {
        config.manifest_url = url.clone();
    }
    if let Some(base) = &cli.base_url {
        config.base_url = Some(base.clone());
    }
    if let Some(storage) = &cli.storage {
        config.storage_path = Some(storage.clone());
    }
    if let Some(secs) = cli.poll_secs {
        config.poll_interval_secs = secs;
    }
    config.validate_and_clamp();
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = effective_config(&cli)?;
    info!(config = ?config, "Starting");

    let mut stdout = std::io::stdout().lock();

    match cli.cmd {
        Commands::Sync { force } => {
            let loader = app::build_loader(&config)?;
            app::sync(&loader, force, &GalleryView::default(), &mut stdout).await?;
        }

        Commands::List { query, sort } => {
            let loader = app::build_loader(&config)?;
            app::sync(&loader, false, &GalleryView::new(query, sort), &mut stdout).await?;
        }

        Commands::Play { index } => {
            let loader = app::build_loader(&config)?;
            app::play(&loader, index, &mut stdout).await?;
        }

        Commands::Browse => {
            let loader = app::build_loader(&config)?;
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            };
            app::browse(loader, &config, input, &mut stdout, shutdown).await?;
        }

        Commands::Config { write } => {
            let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
            writeln!(stdout, "{json}")?;
            if write {
                let path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
                config.save(&path)?;
                info!(path = %path.display(), "Wrote config file");
            }
        }
    }

    Ok(())
}
