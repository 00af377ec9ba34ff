//! Console adapter for development/testing

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::errors::BotError;
use crate::application::messaging::Dispatcher;
use crate::domain::traits::{BotInfo, Outbound};

/// Console bot adapter for local development. Used when no token is
/// configured; stdin lines go through the same dispatcher as real updates.
pub struct ConsoleAdapter {
    info: BotInfo,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "orgdesk-bot".to_string(),
                username: "console".to_string(),
            },
        }
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Outbound for ConsoleAdapter {
    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<(), BotError> {
        println!("[bot] {}", text);
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

/// Read-dispatch-print loop. Update ids are a local counter; there is no
/// upstream source to deduplicate against here.
pub async fn run_console(dispatcher: Arc<Dispatcher>) {
    let adapter = ConsoleAdapter::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut update_id: i64 = 0;

    tracing::info!("console mode - type commands, Ctrl-D to exit");
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        update_id += 1;
        if let Some(reply) = dispatcher.handle(update_id, "console", &line, None) {
            if let Err(e) = adapter.send_message("console", &reply).await {
                tracing::error!(error = %e, "failed to print reply");
            }
        }
    }
}
