//! Transport adapters

pub mod console;
pub mod telegram;
pub mod webhook;
