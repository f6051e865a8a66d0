//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Empty message")]
    EmptyMessage,

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Unknown answer action: {0}")]
    UnknownAction(String),
}
