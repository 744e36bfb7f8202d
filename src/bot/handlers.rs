//! Handlers for the three bot events.
//!
//! Handlers never fail: storage and delivery problems are logged and, where
//! a user is waiting, turned into a one-line reply.

use crate::adapters::{
    Enricher, InlineKeyboardButton, InlineKeyboardMarkup, Messenger, SendOptions,
};
use crate::library::{derive_key, resolve_with, CatalogStore, ResolverSettings};

use super::router::download_callback_data;

pub const USAGE_HINT: &str = "Please write: `Request: Movie Name`";
pub const MOVIE_NOT_FOUND: &str = "❌ Movie not found.";
pub const FILE_NOT_FOUND: &str = "❌ File not found.";
pub const SENT_TO_DM: &str = "✅ Sent to your DM!";
pub const DOWNLOAD_BUTTON: &str = "⬇️ Download";
pub const POSTER_UNAVAILABLE: &str = "(Poster unavailable)";

/// What happened to a channel upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Stored under this key
    Indexed(String),
    /// Could not be stored
    Failed(String),
}

/// What the requester was shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request had no title after the prefix
    UsageHint,
    /// Nothing matched
    NotFound,
    /// These keys were offered for download
    Offered(Vec<String>),
}

/// What happened to a download button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was delivered privately
    Sent,
    /// The key is not in the catalog
    NotFound,
    /// The user could not be reached privately
    Undeliverable,
}

/// Index a document posted to the source channel
pub async fn handle_channel_file(
    catalog: &mut CatalogStore,
    file_name: &str,
    file_id: &str,
) -> UploadOutcome {
    let key = derive_key(file_name);

    match catalog.insert(key.clone(), file_id).await {
        Ok(()) => {
            tracing::info!(%key, %file_id, "Added to catalog");
            UploadOutcome::Indexed(key)
        }
        Err(e) => {
            tracing::error!(%key, "Failed to store catalog entry: {}", e);
            UploadOutcome::Failed(key)
        }
    }
}

/// Download keyboard bound to a catalog key
pub fn download_keyboard(key: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::single(InlineKeyboardButton {
        text: DOWNLOAD_BUTTON.to_string(),
        callback_data: download_callback_data(key),
    })
}

/// Answer a title request in the group
pub async fn handle_request(
    catalog: &CatalogStore,
    settings: &ResolverSettings,
    messenger: &dyn Messenger,
    enricher: &dyn Enricher,
    chat_id: i64,
    message_id: i64,
    query: &str,
) -> RequestOutcome {
    if query.trim().is_empty() {
        let options = SendOptions::reply_to(message_id).with_parse_mode("Markdown");
        if let Err(e) = messenger.send_text(chat_id, USAGE_HINT, &options).await {
            tracing::warn!("Failed to send usage hint: {}", e);
        }
        return RequestOutcome::UsageHint;
    }

    let matches = resolve_with(settings, catalog, query);
    tracing::debug!(%query, matches = matches.len(), "Resolved request");

    if matches.is_empty() {
        let options = SendOptions::reply_to(message_id);
        if let Err(e) = messenger.send_text(chat_id, MOVIE_NOT_FOUND, &options).await {
            tracing::warn!("Failed to send not-found reply: {}", e);
        }
        return RequestOutcome::NotFound;
    }

    for key in &matches {
        offer(messenger, enricher, chat_id, key).await;
    }

    RequestOutcome::Offered(matches)
}

/// Post one result with its download button
async fn offer(messenger: &dyn Messenger, enricher: &dyn Enricher, chat_id: i64, key: &str) {
    let (caption, poster) = match enricher.enrich(key).await {
        Some(enrichment) => (enrichment.display_title, enrichment.image_url),
        None => (key.to_string(), None),
    };
    let options = SendOptions::default().with_keyboard(download_keyboard(key));

    if let Some(photo_url) = poster {
        match messenger.send_photo(chat_id, &photo_url, &caption, &options).await {
            Ok(_) => return,
            Err(e) => tracing::warn!(%key, "Poster send failed, falling back to text: {}", e),
        }
        let text = format!("{}\n{}", caption, POSTER_UNAVAILABLE);
        if let Err(e) = messenger.send_text(chat_id, &text, &options).await {
            tracing::warn!(%key, "Failed to offer result: {}", e);
        }
        return;
    }

    if let Err(e) = messenger.send_text(chat_id, &caption, &options).await {
        tracing::warn!(%key, "Failed to offer result: {}", e);
    }
}

/// Deliver a file privately to the user who pressed a download button
pub async fn handle_download(
    catalog: &CatalogStore,
    messenger: &dyn Messenger,
    bot_username: &str,
    callback_id: &str,
    user_id: i64,
    key: &str,
) -> DownloadOutcome {
    let Some(file_id) = catalog.lookup(key) else {
        answer(messenger, callback_id, FILE_NOT_FOUND).await;
        return DownloadOutcome::NotFound;
    };

    let notice = format!(
        "Sending: {}\nIf you don't get it, open a chat with the bot and press Start: t.me/{}",
        key, bot_username
    );

    let delivered = match messenger
        .send_text(user_id, &notice, &SendOptions::default())
        .await
    {
        Ok(_) => messenger.send_document(user_id, file_id).await,
        Err(e) => Err(e),
    };

    match delivered {
        Ok(_) => {
            tracing::info!(%key, user_id, "Delivered file");
            answer(messenger, callback_id, SENT_TO_DM).await;
            DownloadOutcome::Sent
        }
        Err(e) => {
            tracing::warn!(%key, user_id, "Could not deliver file: {}", e);
            let text = format!(
                "❌ Can't send. Start a chat with the bot first: t.me/{}",
                bot_username
            );
            answer(messenger, callback_id, &text).await;
            DownloadOutcome::Undeliverable
        }
    }
}

/// Answer a callback, logging failures
async fn answer(messenger: &dyn Messenger, callback_id: &str, text: &str) {
    if let Err(e) = messenger.answer_callback(callback_id, text).await {
        tracing::warn!("Failed to answer callback: {}", e);
    }
}
