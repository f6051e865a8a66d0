//! Background generation unit.

use crate::ports::generation_gateway::{
    GatewayError, GenerationGateway, GenerationReply, GenerationRequest,
};
use mcpbot_domain::GenerationId;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// Terminal state of a generation.
#[derive(Debug)]
pub enum GenerationOutcome {
    Completed(GenerationReply),
    Failed(GatewayError),
    /// The session was torn down while the generation was in flight
    Abandoned,
}

/// Output of a generation task, applied by the session sequencer.
#[derive(Debug)]
pub struct GenerationCompletion {
    pub id: GenerationId,
    pub outcome: GenerationOutcome,
}

impl GenerationCompletion {
    /// Map a task that never produced a completion.
    ///
    /// Cancelled tasks were abandoned; panicked tasks count as failures.
    pub fn from_join_error(id: GenerationId, err: JoinError) -> Self {
        let outcome = if err.is_cancelled() {
            debug!(generation = %id, "Generation task abandoned");
            GenerationOutcome::Abandoned
        } else {
            warn!(generation = %id, error = %err, "Generation task panicked");
            GenerationOutcome::Failed(GatewayError::Other(
                "generation task panicked".to_string(),
            ))
        };
        Self { id, outcome }
    }
}

/// One call to the external generation collaborator.
///
/// Owns a snapshot of the history; the result is applied to the live history
/// by whoever receives the [`GenerationCompletion`].
pub struct GenerationTask {
    id: GenerationId,
    gateway: Arc<dyn GenerationGateway>,
    request: GenerationRequest,
}

impl GenerationTask {
    pub fn new(
        id: GenerationId,
        gateway: Arc<dyn GenerationGateway>,
        request: GenerationRequest,
    ) -> Self {
        Self {
            id,
            gateway,
            request,
        }
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    pub async fn run(self) -> GenerationCompletion {
        debug!(generation = %self.id, turns = self.request.history.len(), "Generation started");
        let outcome = match self.gateway.generate(self.request).await {
            Ok(reply) => GenerationOutcome::Completed(reply),
            Err(e) => {
                warn!(generation = %self.id, error = %e, "Generation failed");
                GenerationOutcome::Failed(e)
            }
        };
        GenerationCompletion {
            id: self.id,
            outcome,
        }
    }
}
