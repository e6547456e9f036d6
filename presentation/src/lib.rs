//! Presentation layer for agent-relay
//!
//! This crate contains CLI definitions, output formatters, and progress
//! reporters. It performs no orchestration logic itself: it renders the
//! reactive feeds the application layer publishes and forwards user
//! commands.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{DispatchProgress, SimpleProgress};
