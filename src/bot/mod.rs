//! Bot runtime: routing, handlers and the polling loop.
//!
//! # Architecture
//!
//! ```text
//! getUpdates ─→ router::route ─→ BotEvent ─┬→ handle_channel_file → CatalogStore::insert
//!                                          ├→ handle_request      → resolve → Enricher → Messenger
//!                                          └→ handle_download     → CatalogStore::lookup → Messenger
//! ```
//!
//! Updates are handled strictly one at a time; the catalog is owned by
//! [`Bot`] and only mutated through `&mut self`.

pub mod handlers;
pub mod router;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::adapters::{Enricher, Messenger, NoEnrichment, TelegramClient, TmdbClient, Update};
use crate::config::BotConfig;
use crate::library::{CatalogStore, ResolverSettings};

pub use handlers::{DownloadOutcome, RequestOutcome, UploadOutcome};
pub use router::{route, BotEvent, RouteScope};

/// Delay before polling again after a failed getUpdates
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Result of dispatching one update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Upload(UploadOutcome),
    Request(RequestOutcome),
    Download(DownloadOutcome),
}

/// The bot: catalog, collaborators and routing scope
pub struct Bot {
    catalog: CatalogStore,
    scope: RouteScope,
    resolver: ResolverSettings,
    username: String,
    messenger: Arc<dyn Messenger>,
    enricher: Box<dyn Enricher>,
}

impl Bot {
    /// Create a bot from its parts
    pub fn new(
        catalog: CatalogStore,
        scope: RouteScope,
        resolver: ResolverSettings,
        username: impl Into<String>,
        messenger: Arc<dyn Messenger>,
        enricher: Box<dyn Enricher>,
    ) -> Self {
        Self {
            catalog,
            scope,
            resolver,
            username: username.into(),
            messenger,
            enricher,
        }
    }

    /// The catalog owned by this bot
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Route and handle one update; `None` if it was not for us
    pub async fn dispatch(&mut self, update: &Update) -> Option<Handled> {
        let event = route(update, &self.scope)?;

        let handled = match event {
            BotEvent::ChannelFile { file_name, file_id } => Handled::Upload(
                handlers::handle_channel_file(&mut self.catalog, &file_name, &file_id).await,
            ),
            BotEvent::Request {
                chat_id,
                message_id,
                query,
            } => Handled::Request(
                handlers::handle_request(
                    &self.catalog,
                    &self.resolver,
                    self.messenger.as_ref(),
                    self.enricher.as_ref(),
                    chat_id,
                    message_id,
                    &query,
                )
                .await,
            ),
            BotEvent::Download {
                callback_id,
                user_id,
                key,
            } => Handled::Download(
                handlers::handle_download(
                    &self.catalog,
                    self.messenger.as_ref(),
                    &self.username,
                    &callback_id,
                    user_id,
                    &key,
                )
                .await,
            ),
        };

        Some(handled)
    }
}

/// Build the enricher for the configured credentials
fn build_enricher(config: &BotConfig) -> Box<dyn Enricher> {
    match &config.tmdb_key {
        Some(key) => Box::new(TmdbClient::with_timeout(key.clone(), config.tmdb_timeout)),
        None => Box::new(NoEnrichment),
    }
}

/// Start the bot and poll until `shutdown` resolves
pub async fn run(config: BotConfig, shutdown: impl Future<Output = ()>) -> Result<()> {
    let token = config.require_token()?.to_string();

    let mut client = TelegramClient::new(token);
    if let Some(api_base) = &config.telegram_api_base {
        client = client.with_api_base(api_base.clone());
    }
    let client = Arc::new(client);

    let me = client
        .get_me()
        .await
        .context("Bot authentication failed")?;
    let username = me.username.unwrap_or_default();
    tracing::info!("Bot authenticated: @{} (ID: {})", username, me.id);

    if let Err(e) = client.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let catalog = CatalogStore::load(&config.catalog_path).await;
    tracing::info!(
        "Catalog {} loaded with {} entries",
        config.catalog_path.display(),
        catalog.len()
    );
    tracing::info!(
        channel_id = config.channel_id,
        request_group_id = config.request_group_id,
        enrichment = config.tmdb_key.is_some(),
        "Bot is starting"
    );

    let scope = RouteScope {
        channel_id: config.channel_id,
        request_group_id: config.request_group_id,
    };
    let mut bot = Bot::new(
        catalog,
        scope,
        config.resolver,
        username,
        client.clone(),
        build_enricher(&config),
    );

    poll(&mut bot, &client, config.poll_timeout, shutdown).await;
    tracing::info!("Bot stopped");

    Ok(())
}

/// Long-poll for updates and dispatch them in order
async fn poll(
    bot: &mut Bot,
    client: &TelegramClient,
    timeout: Duration,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    let mut offset = 0;

    loop {
        let result = tokio::select! {
            _ = &mut shutdown => break,
            result = client.get_updates(offset, timeout.as_secs()) => result,
        };

        match result {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if bot.dispatch(&update).await.is_none() {
                        tracing::trace!(update_id = update.update_id, "Ignored update");
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Polling failed: {}", e);
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                }
            }
        }
    }
}
