//! Elicitation domain - asking the human for a value mid-tool-call.
//!
//! ```text
//! tool code ──elicit(prompt)──▶ Elicitor ──prompt event──▶ remote human
//!     ▲                                                        │
//!     └────────── ElicitationOutcome ◀──── answer / decline ───┘
//! ```
//!
//! - [`value_objects::ElicitationPrompt`] - message plus [`value_objects::ExpectedShape`]
//! - [`value_objects::ElicitationOutcome`] - `Answered`, `Declined` or `Aborted`
//! - [`value_objects::AnswerIntent`] - whether a raw reply accepts or declines
//! - [`elicitor::Elicitor`] - the single interface tool code needs

pub mod elicitor;
pub mod value_objects;

pub use elicitor::{AutoDeclineElicitor, Elicitor};
pub use value_objects::{
    AbortReason, AnswerConversionError, AnswerIntent, ElicitationError, ElicitationId,
    ElicitationOutcome, ElicitationPrompt, ExpectedShape,
};
