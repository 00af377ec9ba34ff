//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Directory / Orgdata: Data source loading and in-memory snapshots
//! - Adapters: Transport integrations (Telegram, webhook, console)

pub mod adapters;
pub mod config;
pub mod directory;
pub mod orgdata;
