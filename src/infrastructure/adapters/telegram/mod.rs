//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::domain::traits::{BotInfo, Outbound};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TgUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TgChat {
    pub id: i64,
}

impl TgUpdate {
    /// The `(chat_id, text, sender)` triple the dispatcher needs, or
    /// `None` for updates without a text message.
    pub fn text_parts(&self) -> Option<(String, &str, Option<String>)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        let sender = message.from.as_ref().and_then(|u| {
            u.first_name.clone().or_else(|| u.username.clone())
        });
        Some((message.chat.id.to_string(), text, sender))
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "orgdesk-bot".to_string(),
                username: "orgdesk_bot".to_string(),
            },
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct Response {
            result: BotInfoResponse,
        }

        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let url = self.api_url("getMe");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        self.info = BotInfo {
            id: data.result.id.to_string(),
            name: data.result.first_name,
            username: data.result.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using the getUpdates long-poll API.
    /// Requesting past `offset` implicitly acknowledges everything before it.
    pub async fn get_updates(&self, offset: i64, timeout: i64) -> Result<Vec<TgUpdate>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }

        #[derive(Deserialize)]
        struct Response {
            result: Vec<TgUpdate>,
        }

        let url = self.api_url("getUpdates");
        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Telegram API error: {}",
                response.status()
            )));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.result)
    }

    /// The cursor to use after processing a batch: one past the highest
    /// update id seen, or the current cursor when the batch was empty.
    pub fn next_offset(updates: &[TgUpdate], current: i64) -> i64 {
        updates
            .iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
            .max(current)
    }

    /// Register the command list with Telegram so clients show completions.
    pub async fn register_commands(
        &self,
        commands: &[(&str, &str)],
    ) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct TgCommand {
            command: String,
            description: String,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<TgCommand>,
        }

        let request = SetMyCommandsRequest {
            commands: commands
                .iter()
                .map(|(command, description)| TgCommand {
                    command: command.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        };

        let url = self.api_url("setMyCommands");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!(
                "Failed to register commands: {}",
                error
            )));
        }

        tracing::info!("Registered bot commands with Telegram");
        Ok(())
    }

    /// Point Telegram's push delivery at our webhook URL.
    pub async fn set_webhook(&self, url: &str) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct SetWebhookRequest {
            url: String,
        }

        let api = self.api_url("setWebhook");
        let response = self
            .client
            .post(&api)
            .json(&SetWebhookRequest {
                url: url.to_string(),
            })
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "setWebhook failed: {}",
                response.status()
            )));
        }
        tracing::info!(url, "webhook registered");
        Ok(())
    }

    /// Telegram refuses getUpdates while a webhook is registered, so pull
    /// mode clears it first.
    pub async fn delete_webhook(&self) -> Result<(), BotError> {
        let url = self.api_url("deleteWebhook");
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "deleteWebhook failed: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn send_message_api(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest {
            chat_id: String,
            text: String,
        }

        let url = self.api_url("sendMessage");
        let request = SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Telegram API error: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Outbound for TelegramAdapter {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        tracing::debug!(chat_id, "sending reply");
        self.send_message_api(chat_id, text).await
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
