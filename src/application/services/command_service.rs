use crate::domain::entities::{Command, CommandRegistry, Update};

/// The single stable reply for anything the router cannot map to a handler.
pub const UNKNOWN_COMMAND_REPLY: &str =
    "Unknown command. Try /help for the list of available commands.";

/// The single generic reply when a handler fails internally.
pub const HANDLER_FAILURE_REPLY: &str =
    "Something went wrong while handling that command. Please try again later.";

/// Service for managing and executing commands.
///
/// This is the router boundary: a handler failure is caught here, logged,
/// and converted to a generic reply - it never propagates to the transport.
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    /// Route an update to its handler and produce the reply text.
    /// Every path returns a reply; the chat session is never left silent.
    pub fn dispatch(&self, update: &Update) -> String {
        let Some(name) = update.command.as_deref() else {
            return UNKNOWN_COMMAND_REPLY.to_string();
        };

        let Some(cmd) = self.registry.find(name) else {
            tracing::debug!(command = name, "unknown command");
            return UNKNOWN_COMMAND_REPLY.to_string();
        };

        match &cmd.handler {
            Some(handler) => match handler(update) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!(command = name, error = %e, "command handler failed");
                    HANDLER_FAILURE_REPLY.to_string()
                }
            },
            None => format!("Command {}{} is not implemented.", self.prefix, cmd.name),
        }
    }

    /// Render the command list for /help, sorted for a stable output.
    pub fn render_help(&self) -> String {
        let mut lines: Vec<String> = self
            .registry
            .all()
            .map(|cmd| {
                let invocation = cmd
                    .usage
                    .clone()
                    .unwrap_or_else(|| format!("{}{}", self.prefix, cmd.name));
                format!("{} — {}", invocation, cmd.description.as_deref().unwrap_or(""))
            })
            .collect();
        lines.sort();
        format!("Available commands:\n{}", lines.join("\n"))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
