//! Presentation layer for mcpbot
//!
//! This crate contains the CLI definitions and the two transport adapters
//! that connect a human to a chat session: a WebSocket server with an
//! embedded chat page, and a line-oriented terminal chat.

pub mod cli;
pub mod terminal;
pub mod web;

// Re-export commonly used types
pub use cli::commands::{Cli, FrontEnd};
pub use terminal::{ConsoleFormatter, TerminalRepl};
pub use web::{ClientFrame, ServerFrame, WebState};
