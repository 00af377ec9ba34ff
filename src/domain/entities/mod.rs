//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod employee;
pub mod event;
pub mod update;

pub use command::{Command, CommandRegistry};
pub use employee::{department_key, Employee};
pub use event::Event;
pub use update::Update;
