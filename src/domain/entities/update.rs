/// The normalized inbound message, independent of how it arrived.
///
/// Produced once per accepted transport event, consumed once by the
/// command router, and not retained afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// Transport-assigned identifier, used for deduplication.
    pub update_id: i64,
    pub chat_id: String,
    /// Leading command token with the marker stripped, lowercased.
    /// `None` for free text.
    pub command: Option<String>,
    pub args: Vec<String>,
    pub raw_text: String,
    /// Display name of the sender, when the transport provides one.
    pub sender: Option<String>,
}

impl Update {
    pub fn new(update_id: i64, chat_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            update_id,
            chat_id: chat_id.into(),
            command: None,
            args: Vec::new(),
            raw_text: raw_text.into(),
            sender: None,
        }
    }

    pub fn with_command(mut self, name: impl Into<String>, args: Vec<String>) -> Self {
        self.command = Some(name.into());
        self.args = args;
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }
}
