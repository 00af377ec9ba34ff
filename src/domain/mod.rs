//! Domain layer - Core business objects with no external dependencies
//!
//! This layer contains:
//! - Entities: Employee, Event, Update, Command
//! - Traits: Abstractions for infrastructure (Outbound)

pub mod entities;
pub mod traits;
