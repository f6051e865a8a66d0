//! Elicitor trait
//!
//! The only interface tool code needs to ask the human for input. The
//! interactive implementation (`ElicitationBridge`) lives in the application
//! layer; this module only defines the contract.

use super::value_objects::{ElicitationError, ElicitationOutcome, ElicitationPrompt};
use async_trait::async_trait;

/// Request a value from the human operating the session.
///
/// From the caller's point of view this is a blocking call: it returns once
/// the human answers, declines, or the session goes away.
#[async_trait]
pub trait Elicitor: Send + Sync {
    async fn elicit(
        &self,
        prompt: ElicitationPrompt,
    ) -> Result<ElicitationOutcome, ElicitationError>;
}

/// Non-interactive elicitor that declines every request.
///
/// Used when no human is attached (scripted runs, tool tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDeclineElicitor;

#[async_trait]
impl Elicitor for AutoDeclineElicitor {
    async fn elicit(
        &self,
        _prompt: ElicitationPrompt,
    ) -> Result<ElicitationOutcome, ElicitationError> {
        Ok(ElicitationOutcome::Declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auto_decline() {
        let outcome = AutoDeclineElicitor
            .elicit(ElicitationPrompt::text("name?"))
            .await
            .unwrap();
        assert_eq!(outcome, ElicitationOutcome::Declined);
    }
}
