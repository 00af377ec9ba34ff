use async_trait::async_trait;

use crate::application::errors::BotError;

/// Outbound trait - abstraction for reply delivery back to the chat platform
///
/// A failed delivery is an error for the caller to log; it is never
/// retried from scratch.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Send a text reply to a chat
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
