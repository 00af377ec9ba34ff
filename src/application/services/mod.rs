//! Application services - Command routing, search, digest aggregation

pub mod command_service;
pub mod digest;
pub mod handlers;
pub mod scheduler;
pub mod search;

pub use command_service::CommandService;
pub use handlers::{register_org_commands, OrgContext};
pub use search::{SearchIndex, SearchOutcome};
