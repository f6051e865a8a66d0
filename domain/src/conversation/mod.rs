//! Conversation domain.
//!
//! - [`entities::Message`] - a single role-tagged message
//! - [`entities::History`] - the ordered message list of one session

pub mod entities;

pub use entities::{History, Message, Role};
