//! Command-line interface for moviebot.
//!
//! Provides commands for running the bot and inspecting the catalog
//! offline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::bot;
use crate::config::{load_config, BotConfig, Overrides};
use crate::library::{resolve_with, CatalogStore};

/// moviebot - Telegram bot that shares indexed channel uploads on request
#[derive(Parser, Debug)]
#[command(name = "moviebot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every command
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Config file (defaults to .moviebot/config.yaml discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog file
    #[arg(long, global = true, env = "MOVIEBOT_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Telegram bot token
    #[arg(long, global = true, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Channel whose document posts are indexed
    #[arg(long, global = true, env = "CHANNEL_ID", allow_hyphen_values = true)]
    pub channel_id: Option<i64>,

    /// Group where requests are answered
    #[arg(long, global = true, env = "REQUEST_GROUP_ID", allow_hyphen_values = true)]
    pub request_group_id: Option<i64>,

    /// TMDB API key for posters (optional)
    #[arg(long, global = true, env = "TMDB_KEY", hide_env_values = true)]
    pub tmdb_key: Option<String>,
}

impl From<GlobalArgs> for Overrides {
    fn from(args: GlobalArgs) -> Self {
        Self {
            bot_token: args.bot_token,
            channel_id: args.channel_id,
            request_group_id: args.request_group_id,
            tmdb_key: args.tmdb_key,
            catalog_path: args.catalog,
            config_file: args.config,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bot (long polling) until Ctrl-C
    Run,

    /// List catalog entries
    List {
        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Resolve a title against the catalog without contacting Telegram
    Search {
        /// Search query
        query: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.global.into())?;

        match self.command {
            Commands::Run => run_bot(config).await,
            Commands::List { limit } => list_catalog(&config, limit).await,
            Commands::Search { query } => search_catalog(&config, &query).await,
            Commands::Config => show_config(&config),
        }
    }
}

/// Run the bot until interrupted
async fn run_bot(config: BotConfig) -> Result<()> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown requested");
    };

    bot::run(config, shutdown).await
}

/// Print catalog entries in insertion order
async fn list_catalog(config: &BotConfig, limit: Option<usize>) -> Result<()> {
    let catalog = CatalogStore::load(&config.catalog_path).await;

    if catalog.is_empty() {
        println!("Catalog is empty ({})", config.catalog_path.display());
        return Ok(());
    }

    println!("{:<50} {}", "TITLE", "FILE ID");
    println!("{}", "-".repeat(75));

    for (key, file_id) in catalog.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{:<50} {}", key, file_id);
    }

    println!("\n{} entries", catalog.len());

    Ok(())
}

/// Print what a request for `query` would offer
async fn search_catalog(config: &BotConfig, query: &str) -> Result<()> {
    let catalog = CatalogStore::load(&config.catalog_path).await;
    let matches = resolve_with(&config.resolver, &catalog, query);

    if matches.is_empty() {
        println!("No matches for '{}'", query);
        return Ok(());
    }

    for key in matches {
        println!("{}", key);
    }

    Ok(())
}

/// Show the resolved configuration with secrets redacted
fn show_config(config: &BotConfig) -> Result<()> {
    let config_file = config
        .config_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());

    println!("Config file:      {}", config_file);
    println!("Bot token:        {}", config.redacted_token());
    println!("Channel ID:       {}", config.channel_id);
    println!("Request group ID: {}", config.request_group_id);
    println!(
        "TMDB:             {}",
        if config.tmdb_key.is_some() { "enabled" } else { "disabled" }
    );
    println!("Catalog:          {}", config.catalog_path.display());
    println!("Poll timeout:     {}s", config.poll_timeout.as_secs());
    println!("TMDB timeout:     {}s", config.tmdb_timeout.as_secs());
    println!(
        "Resolver:         max {} results, cutoff {}",
        config.resolver.max_results, config.resolver.fuzzy_cutoff
    );

    Ok(())
}
