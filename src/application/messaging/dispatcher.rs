//! Update dispatcher - the single path from raw inbound text to a reply
//!
//! Both transport modes feed this type, so deduplication and the
//! router-boundary error contract live here and nowhere else.

use std::sync::Mutex;

use super::dedup::RecentIds;
use super::parser::UpdateParser;
use crate::application::services::CommandService;

/// How many processed update ids to remember for deduplication.
const RECENT_IDS_CAPACITY: usize = 1024;

pub struct Dispatcher {
    parser: UpdateParser,
    commands: CommandService,
    seen: Mutex<RecentIds>,
}

impl Dispatcher {
    pub fn new(prefix: impl Into<String>, commands: CommandService) -> Self {
        Self {
            parser: UpdateParser::new(prefix),
            commands,
            seen: Mutex::new(RecentIds::new(RECENT_IDS_CAPACITY)),
        }
    }

    /// Handle one inbound message. Returns `None` when the update id was
    /// already processed; otherwise always produces a reply - the router
    /// contract guarantees the chat gets *some* answer.
    pub fn handle(
        &self,
        update_id: i64,
        chat_id: &str,
        text: &str,
        sender: Option<String>,
    ) -> Option<String> {
        let fresh = match self.seen.lock() {
            Ok(mut guard) => guard.insert(update_id),
            Err(poisoned) => poisoned.into_inner().insert(update_id),
        };
        if !fresh {
            tracing::debug!(update_id, "dropping duplicate update");
            return None;
        }

        let update = self.parser.parse(update_id, chat_id, text, sender);
        Some(self.commands.dispatch(&update))
    }
}
