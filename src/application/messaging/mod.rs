//! Update handling - normalization, deduplication, dispatch

pub mod dedup;
pub mod dispatcher;
pub mod parser;

pub use dedup::RecentIds;
pub use dispatcher::Dispatcher;
pub use parser::UpdateParser;
