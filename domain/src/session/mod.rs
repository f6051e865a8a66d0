//! Session identity.
//!
//! - [`value_objects::SessionId`] - stable id of one client connection
//! - [`value_objects::GenerationId`] - id of one background generation

pub mod value_objects;

pub use value_objects::{GenerationId, SessionId};
