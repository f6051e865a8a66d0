//! Terminal front end: async stdin lines in, colored events out

pub mod console;
pub mod repl;

pub use console::ConsoleFormatter;
pub use repl::{LineAction, TerminalRepl, classify_line};
