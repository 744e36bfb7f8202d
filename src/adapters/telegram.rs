//! Telegram Bot API adapter.
//!
//! Thin client over the HTTPS Bot API: long polling for updates, and
//! the handful of send methods the bot needs. Only the fields the bot
//! reads are modelled.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Messenger, SendOptions};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Timeout for non-polling calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra time granted to `getUpdates` on top of the long-poll timeout
const POLL_SLACK: Duration = Duration::from_secs(10);

/// Errors returned by the Telegram client
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error ({code}): {description}")]
    Api { code: i64, description: String },

    #[error("Telegram API returned ok without a result for {0}")]
    MissingResult(String),
}

/// Response envelope from the Telegram API
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// An incoming update from `getUpdates`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Inline keyboard attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// A keyboard with a single button
    pub fn single(button: InlineKeyboardButton) -> Self {
        Self {
            inline_keyboard: vec![vec![button]],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

/// Message result from the send* methods
#[derive(Debug, Deserialize)]
struct MessageResult {
    message_id: i64,
}

/// Telegram Bot API client
pub struct TelegramClient {
    /// Bot token
    bot_token: String,
    /// API base URL (overridable for local Bot API servers)
    api_base: String,
    /// HTTP client
    client: reqwest::Client,
}

impl TelegramClient {
    /// Create a new Telegram client
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different Bot API server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Build API URL
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    /// Call a Bot API method with a JSON body and unwrap the envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        let response = self
            .client
            .post(self.api_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let envelope: TelegramResponse<T> = response.json().await?;
        unwrap_envelope(method, envelope)
    }

    /// Fetch the bot's own user record
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({}), REQUEST_TIMEOUT).await
    }

    /// Remove any webhook so that long polling receives updates
    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self
            .call("deleteWebhook", &serde_json::json!({}), REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Long-poll for updates starting at `offset`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "channel_post", "callback_query"],
        });

        self.call(
            "getUpdates",
            &body,
            Duration::from_secs(timeout_secs) + POLL_SLACK,
        )
        .await
    }
}

/// Turn an API envelope into its result or an error
fn unwrap_envelope<T>(method: &str, envelope: TelegramResponse<T>) -> Result<T, TelegramError> {
    if !envelope.ok {
        return Err(TelegramError::Api {
            code: envelope.error_code.unwrap_or(0),
            description: envelope.description.unwrap_or_default(),
        });
    }

    envelope
        .result
        .ok_or_else(|| TelegramError::MissingResult(method.to_string()))
}

/// Add reply/parse/keyboard options to a request body
fn apply_options(body: &mut serde_json::Value, options: &SendOptions) {
    if let Some(reply_to) = options.reply_to {
        body["reply_to_message_id"] = serde_json::json!(reply_to);
    }
    if let Some(parse_mode) = &options.parse_mode {
        body["parse_mode"] = serde_json::json!(parse_mode);
    }
    if let Some(keyboard) = &options.keyboard {
        body["reply_markup"] = serde_json::json!(keyboard);
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        options: &SendOptions,
    ) -> Result<i64, TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        apply_options(&mut body, options);

        let result: MessageResult = self.call("sendMessage", &body, REQUEST_TIMEOUT).await?;
        Ok(result.message_id)
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        options: &SendOptions,
    ) -> Result<i64, TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "photo": photo_url,
            "caption": caption,
        });
        apply_options(&mut body, options);

        let result: MessageResult = self.call("sendPhoto", &body, REQUEST_TIMEOUT).await?;
        Ok(result.message_id)
    }

    async fn send_document(&self, chat_id: i64, file_id: &str) -> Result<i64, TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "document": file_id,
        });

        let result: MessageResult = self.call("sendDocument", &body, REQUEST_TIMEOUT).await?;
        Ok(result.message_id)
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "callback_query_id": callback_id,
            "text": text,
        });

        let _: bool = self
            .call("answerCallbackQuery", &body, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = TelegramClient::new("TOKEN".to_string());
        assert_eq!(
            client.api_url("sendMessage"),
            "https://api.telegram.org/botTOKEN/sendMessage"
        );
    }

    #[test]
    fn test_custom_api_base() {
        let client = TelegramClient::new("TOKEN".to_string()).with_api_base("http://localhost:8081/");
        assert_eq!(client.api_url("getMe"), "http://localhost:8081/botTOKEN/getMe");
    }

    #[test]
    fn test_unwrap_envelope_error() {
        let envelope: TelegramResponse<MessageResult> = serde_json::from_str(
            r#"{"ok": false, "error_code": 403, "description": "Forbidden: bot can't initiate conversation with a user"}"#,
        )
        .unwrap();

        match unwrap_envelope("sendMessage", envelope) {
            Err(TelegramError::Api { code, description }) => {
                assert_eq!(code, 403);
                assert!(description.starts_with("Forbidden"));
            }
            other => panic!("unexpected: {:?}", other.map(|r| r.message_id)),
        }
    }

    #[test]
    fn test_parse_updates() {
        let json = r#"{
            "ok": true,
            "result": [
                {"update_id": 1, "channel_post": {"message_id": 5, "chat": {"id": -100, "type": "channel"},
                    "document": {"file_id": "BQAC", "file_name": "Heat.mkv", "file_size": 10}}},
                {"update_id": 2, "callback_query": {"id": "cb1", "from": {"id": 7, "is_bot": false, "first_name": "Ann"},
                    "data": "download::Heat"}}
            ]
        }"#;

        let envelope: TelegramResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        let updates = unwrap_envelope("getUpdates", envelope).unwrap();

        assert_eq!(updates.len(), 2);
        let doc = updates[0].channel_post.as_ref().unwrap().document.as_ref().unwrap();
        assert_eq!(doc.file_name.as_deref(), Some("Heat.mkv"));
        assert_eq!(
            updates[1].callback_query.as_ref().unwrap().data.as_deref(),
            Some("download::Heat")
        );
    }

    #[test]
    fn test_apply_options() {
        let mut body = serde_json::json!({"chat_id": 1, "text": "hi"});
        let options = SendOptions {
            reply_to: Some(9),
            parse_mode: Some("Markdown".to_string()),
            keyboard: Some(InlineKeyboardMarkup::single(InlineKeyboardButton {
                text: "Go".to_string(),
                callback_data: "download::X".to_string(),
            })),
        };

        apply_options(&mut body, &options);

        assert_eq!(body["reply_to_message_id"], 9);
        assert_eq!(body["parse_mode"], "Markdown");
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "download::X"
        );
    }
}
