//! Domain traits - Abstractions for infrastructure implementations

pub mod outbound;

pub use outbound::{BotInfo, Outbound};
