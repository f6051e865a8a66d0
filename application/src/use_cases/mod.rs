//! Use cases (application services)
//!
//! - [`response_slot`] - one-shot reply cell
//! - [`elicitation_bridge`] - single-outstanding-request correlation
//! - [`generation_task`] - one background LLM call
//! - [`chat_session`] - per-connection sequencer
//! - [`session_registry`] - keyed map of live sessions

pub mod chat_session;
pub mod elicitation_bridge;
pub mod generation_task;
pub mod response_slot;
pub mod session_registry;
