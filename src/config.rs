//! Configuration for the bot.
//!
//! Configuration sources (highest priority first):
//! 1. CLI flags / environment variables (BOT_TOKEN, CHANNEL_ID,
//!    REQUEST_GROUP_ID, TMDB_KEY, MOVIEBOT_CATALOG)
//! 2. Config file (.moviebot/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .moviebot/config.yaml,
//!   then falls back to ~/.moviebot/config.yaml
//! - Relative paths in the config file are resolved against the directory
//!   containing .moviebot/
//!
//! Settings are read once at startup and never reloaded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::resolver::MAX_RESULTS;
use crate::library::ResolverSettings;

/// Default catalog file, relative to the working directory
pub const DEFAULT_CATALOG_PATH: &str = "movies.json";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub tmdb: TmdbSection,
    #[serde(default)]
    pub resolver: ResolverSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramSection {
    pub channel_id: Option<i64>,
    pub request_group_id: Option<i64>,
    pub poll_timeout_seconds: Option<u64>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSection {
    /// Catalog file (relative to the project root)
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbSection {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverSection {
    pub max_results: Option<usize>,
    pub fuzzy_cutoff: Option<f64>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bot_token: Option<String>,
    pub channel_id: Option<i64>,
    pub request_group_id: Option<i64>,
    pub tmdb_key: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot API token (required to run the bot)
    pub bot_token: Option<String>,
    /// Channel whose document posts are indexed
    pub channel_id: i64,
    /// Group where requests are answered
    pub request_group_id: i64,
    /// TMDB API key (enrichment disabled when absent)
    pub tmdb_key: Option<String>,
    /// Catalog file
    pub catalog_path: PathBuf,
    /// Long-poll timeout for getUpdates
    pub poll_timeout: Duration,
    /// Timeout for TMDB lookups
    pub tmdb_timeout: Duration,
    /// Bot API base URL override
    pub telegram_api_base: Option<String>,
    /// Title resolver tunables
    pub resolver: ResolverSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            channel_id: 0,
            request_group_id: 0,
            tmdb_key: None,
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            poll_timeout: Duration::from_secs(20),
            tmdb_timeout: crate::adapters::tmdb::DEFAULT_TIMEOUT,
            telegram_api_base: None,
            resolver: ResolverSettings::default(),
            config_file: None,
        }
    }
}

impl BotConfig {
    /// Bot token, or an error explaining how to provide one
    pub fn require_token(&self) -> Result<&str> {
        self.bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .context("BOT_TOKEN is required (set the env var or pass --bot-token)")
    }

    /// Token with all but the bot id redacted, for display
    pub fn redacted_token(&self) -> String {
        match self.bot_token.as_deref() {
            Some(token) => match token.split_once(':') {
                Some((id, _)) => format!("{}:***", id),
                None => "***".to_string(),
            },
            None => "(not set)".to_string(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".moviebot").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".moviebot").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge a parsed config file and overrides into a [`BotConfig`]
pub fn resolve_config(
    file: Option<(&Path, ConfigFile)>,
    overrides: Overrides,
) -> Result<BotConfig> {
    let defaults = BotConfig::default();

    let (config_file, file) = match file {
        Some((path, parsed)) => (Some(path.to_path_buf()), parsed),
        None => (None, ConfigFile::default()),
    };

    // Project root is the parent of .moviebot/
    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap_or(Path::new("."));

    let catalog_path = match (overrides.catalog_path, file.catalog.path.as_deref()) {
        (Some(path), _) => path,
        (None, Some(path)) => resolve_path(base_dir, path),
        (None, None) => defaults.catalog_path,
    };

    let resolver = ResolverSettings {
        max_results: file
            .resolver
            .max_results
            .unwrap_or(defaults.resolver.max_results),
        fuzzy_cutoff: file
            .resolver
            .fuzzy_cutoff
            .unwrap_or(defaults.resolver.fuzzy_cutoff),
    };

    if !(1..=MAX_RESULTS).contains(&resolver.max_results) {
        anyhow::bail!(
            "resolver.max_results must be between 1 and {}, got {}",
            MAX_RESULTS,
            resolver.max_results
        );
    }

    if !(0.0..=1.0).contains(&resolver.fuzzy_cutoff) {
        anyhow::bail!(
            "resolver.fuzzy_cutoff must be between 0 and 1, got {}",
            resolver.fuzzy_cutoff
        );
    }

    Ok(BotConfig {
        bot_token: overrides.bot_token.filter(|t| !t.is_empty()),
        channel_id: overrides
            .channel_id
            .or(file.telegram.channel_id)
            .unwrap_or(defaults.channel_id),
        request_group_id: overrides
            .request_group_id
            .or(file.telegram.request_group_id)
            .unwrap_or(defaults.request_group_id),
        tmdb_key: overrides.tmdb_key.filter(|k| !k.is_empty()),
        catalog_path,
        poll_timeout: file
            .telegram
            .poll_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_timeout),
        tmdb_timeout: file
            .tmdb
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(defaults.tmdb_timeout),
        telegram_api_base: file.telegram.api_base,
        resolver,
        config_file,
    })
}

/// Load configuration from all sources
pub fn load_config(overrides: Overrides) -> Result<BotConfig> {
    let config_path = overrides.config_file.clone().or_else(find_config_file);

    match config_path {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            resolve_config(Some((path.as_path(), parsed)), overrides)
        }
        None => resolve_config(None, overrides),
    }
}
