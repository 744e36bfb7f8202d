//! Routing of incoming updates to bot events.
//!
//! The router is the only place that knows which chat each event kind is
//! accepted from. Everything it does not recognise is dropped.

use crate::adapters::Update;

/// Case-insensitive prefix that marks a request in the group
pub const REQUEST_PREFIX: &str = "request:";

/// Prefix of the callback data bound to download buttons
pub const DOWNLOAD_PREFIX: &str = "download::";

/// Chats the router accepts events from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteScope {
    /// Source channel for uploads
    pub channel_id: i64,
    /// Group where requests are made
    pub request_group_id: i64,
}

/// An event the bot handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    /// A document was posted to the source channel
    ChannelFile { file_name: String, file_id: String },

    /// A `request:` message in the request group
    Request {
        chat_id: i64,
        message_id: i64,
        query: String,
    },

    /// A download button was pressed
    Download {
        callback_id: String,
        user_id: i64,
        key: String,
    },
}

/// Callback data for a download button
pub fn download_callback_data(key: &str) -> String {
    format!("{}{}", DOWNLOAD_PREFIX, key)
}

/// Extract the query from a request message, if it is one.
///
/// The text is trimmed before the prefix check and the remainder is
/// trimmed again, so `"  Request:  Heat "` yields `"Heat"`.
pub fn parse_request(text: &str) -> Option<&str> {
    let text = text.trim();
    let prefix = text.get(..REQUEST_PREFIX.len())?;

    if prefix.eq_ignore_ascii_case(REQUEST_PREFIX) {
        Some(text[REQUEST_PREFIX.len()..].trim())
    } else {
        None
    }
}

/// Map an update to the event it represents
pub fn route(update: &Update, scope: &RouteScope) -> Option<BotEvent> {
    if let Some(post) = &update.channel_post {
        if post.chat.id != scope.channel_id {
            return None;
        }
        let document = post.document.as_ref()?;
        let file_name = document.file_name.clone()?;

        return Some(BotEvent::ChannelFile {
            file_name,
            file_id: document.file_id.clone(),
        });
    }

    if let Some(message) = &update.message {
        if message.chat.id != scope.request_group_id {
            return None;
        }
        let query = parse_request(message.text.as_deref()?)?;

        return Some(BotEvent::Request {
            chat_id: message.chat.id,
            message_id: message.message_id,
            query: query.to_string(),
        });
    }

    if let Some(callback) = &update.callback_query {
        let key = callback.data.as_deref()?.strip_prefix(DOWNLOAD_PREFIX)?;

        return Some(BotEvent::Download {
            callback_id: callback.id.clone(),
            user_id: callback.from.id,
            key: key.to_string(),
        });
    }

    None
}
