//! moviebot - Telegram movie sharing bot
//!
//! Watches a private channel for uploaded files, indexes them by name,
//! answers `Request: <title>` messages in a group with fuzzy-matched
//! results, and sends the chosen file privately to whoever pressed the
//! download button.
//!
//! # Modules
//!
//! - `library`: Catalog store and title resolution
//! - `adapters`: External systems (Telegram Bot API, TMDB)
//! - `bot`: Update routing, handlers and the polling loop
//! - `config`: Startup configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the bot
//! BOT_TOKEN=... CHANNEL_ID=-100... REQUEST_GROUP_ID=-100... moviebot run
//!
//! # Try a request against the catalog offline
//! moviebot search "intrsteller"
//! ```

pub mod adapters;
pub mod bot;
pub mod cli;
pub mod config;
pub mod library;

// Re-export main types at crate root for convenience
pub use adapters::{Enricher, Enrichment, Messenger, SendOptions, TelegramClient, TmdbClient};
pub use bot::{Bot, BotEvent, Handled};
pub use config::BotConfig;
pub use library::{derive_key, resolve, CatalogStore, ResolverSettings};
