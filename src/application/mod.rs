//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Command routing, directory search, digest aggregation
//! - Errors: Domain-specific errors
//! - Messaging: Update parsing, deduplication, dispatching

pub mod errors;
pub mod messaging;
pub mod services;
