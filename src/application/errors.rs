//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Data source loading errors.
///
/// `Unavailable` at startup is the one fatal class: the process must not
/// serve with no directory loaded. Individual bad rows never surface here;
/// they are skipped and counted by the loaders.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data source unavailable: {path}: {reason}")]
    Unavailable { path: String, reason: String },

    #[error("Malformed data source: {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Missing required column '{0}' in directory source")]
    MissingColumn(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
