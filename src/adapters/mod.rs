//! Adapter interfaces for external systems.
//!
//! Adapters wrap the two services the bot talks to: the Telegram Bot API
//! (transport) and TMDB (optional metadata enrichment). Handlers only see
//! the traits below, so they can be driven by in-memory fakes in tests.

pub mod telegram;
pub mod tmdb;

use async_trait::async_trait;

pub use telegram::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, TelegramClient,
    TelegramError, Update, User,
};
pub use tmdb::TmdbClient;

/// Display form of a catalog key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    /// Title to show instead of the raw key
    pub display_title: String,

    /// Poster image URL (if available)
    pub image_url: Option<String>,
}

/// Best-effort metadata lookup
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Look up a display form for `key`; `None` on any failure or miss
    async fn enrich(&self, key: &str) -> Option<Enrichment>;
}

/// Enricher used when no metadata provider is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

#[async_trait]
impl Enricher for NoEnrichment {
    async fn enrich(&self, _key: &str) -> Option<Enrichment> {
        None
    }
}

/// Optional fields for outgoing messages
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Message to reply to
    pub reply_to: Option<i64>,

    /// Parse mode ("Markdown", "HTML")
    pub parse_mode: Option<String>,

    /// Inline keyboard
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl SendOptions {
    /// Reply to a message
    pub fn reply_to(message_id: i64) -> Self {
        Self {
            reply_to: Some(message_id),
            ..Default::default()
        }
    }

    /// Attach an inline keyboard
    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Set the parse mode
    pub fn with_parse_mode(mut self, parse_mode: impl Into<String>) -> Self {
        self.parse_mode = Some(parse_mode.into());
        self
    }
}

/// Outgoing side of the messaging transport.
///
/// Each call returns the delivery outcome; the caller decides whether to
/// degrade or report.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message, returning its message id
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        options: &SendOptions,
    ) -> Result<i64, TelegramError>;

    /// Send a photo by URL with a caption
    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        options: &SendOptions,
    ) -> Result<i64, TelegramError>;

    /// Re-send a stored file by its file id
    async fn send_document(&self, chat_id: i64, file_id: &str) -> Result<i64, TelegramError>;

    /// Answer a button press with a short notification
    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), TelegramError>;
}
