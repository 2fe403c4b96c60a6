use anyhow::{bail, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Formatting applied by Telegram to a message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: bool,
}

impl SendMessage {
    /// Plain text message with link previews enabled.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: None,
            disable_web_page_preview: false,
        }
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Client for sending messages via Telegram Bot API.
#[derive(Clone)]
pub struct TelegramBot {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TelegramBot {
    /// Creates a new `TelegramBot` with the given API key.
    pub fn new(client: Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, TELEGRAM_API_BASE.to_string())
    }

    /// Creates a `TelegramBot` talking to another Bot API server.
    pub fn with_base_url(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Sends `message` to its chat.
    pub async fn send_message(&self, message: &SendMessage) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.api_key);
        let response: ApiResponse = self
            .client
            .post(&url)
            .json(message)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !response.ok {
            bail!(
                "telegram rejected message: {}",
                response.description.unwrap_or_default()
            );
        }
        Ok(())
    }

    /// Sends a plain text message to `chat_id`.
    pub async fn push_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(&SendMessage::text(chat_id, text)).await
    }
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
