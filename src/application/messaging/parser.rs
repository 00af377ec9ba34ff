//! Update parser - Normalizes raw inbound text into structured Updates

use crate::domain::entities::Update;

/// Parses raw inbound text into the transport-agnostic `Update` shape.
pub struct UpdateParser {
    command_prefix: String,
}

impl UpdateParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse one inbound message. Text starting with the command prefix
    /// becomes a command plus arguments; anything else stays free text.
    pub fn parse(
        &self,
        update_id: i64,
        chat_id: impl Into<String>,
        text: &str,
        sender: Option<String>,
    ) -> Update {
        let text = text.trim();
        let mut update = Update::new(update_id, chat_id, text);
        if let Some(s) = sender {
            update = update.with_sender(s);
        }

        let Some(rest) = text.strip_prefix(&self.command_prefix) else {
            return update;
        };

        let mut words = rest.splitn(2, char::is_whitespace);
        let head = words.next().unwrap_or_default();
        if head.is_empty() {
            return update;
        }

        // Telegram group chats address commands as /find@botname.
        let name = head
            .split('@')
            .next()
            .unwrap_or(head)
            .to_lowercase();
        let args = split_args(words.next().unwrap_or_default());

        update.with_command(name, args)
    }
}

/// Split an argument string on whitespace, keeping double-quoted phrases
/// together so multi-word search queries survive tokenization.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}
