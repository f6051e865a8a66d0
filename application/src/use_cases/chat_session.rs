//! Chat session - per-connection sequencer actor
//!
//! A [`ChatSession`] owns the conversation history, the session's
//! [`ElicitationBridge`] and its in-flight generations. It runs as a single
//! tokio task that processes inbound events strictly in arrival order and
//! applies generation completions in between, so history is only ever
//! touched from one place.
//!
//! ```text
//! transport ──InboundEvent──▶ ┌─────────────┐ ──spawn──▶ GenerationTask ─┐
//!                             │ ChatSession │                            │ tool
//! transport ◀─OutboundEvent── │ (sequencer) │ ◀─completion───────────────┤
//!                             └──────┬──────┘                            │
//!                                    │ submit / decline / close          ▼
//!                                    └──────────────▶ ElicitationBridge ◀┘ request
//! ```
//!
//! Teardown (disconnect, fatal error, or every handle dropped) closes the
//! bridge, which aborts any suspended tool call, then abandons the
//! generations that are still running.

use crate::config::ChatConfig;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::generation_gateway::{GenerationGateway, GenerationRequest};
use crate::ports::session_event::{InboundEvent, OutboundEvent};
use crate::ports::tool_executor::{NoTools, ToolExecutorPort};
use crate::use_cases::elicitation_bridge::ElicitationBridge;
use crate::use_cases::generation_task::{GenerationCompletion, GenerationOutcome, GenerationTask};
use mcpbot_domain::{
    AbortReason, AnswerIntent, ElicitationId, ElicitationPrompt, GenerationId, History, Message,
    Role, SessionId, ToolContext,
};
use serde_json::json;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Errors returned by a [`SessionHandle`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session {0} is closed")]
    Closed(SessionId),
}

/// Collaborators shared by every session of a process.
#[derive(Clone)]
pub struct ChatServices {
    pub gateway: Arc<dyn GenerationGateway>,
    pub tools: Arc<dyn ToolExecutorPort>,
    pub config: ChatConfig,
    pub conversation_logger: Arc<dyn ConversationLogger>,
}

impl ChatServices {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self {
            gateway,
            tools: Arc::new(NoTools::default()),
            config: ChatConfig::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_tools(mut self, tools: Arc<dyn ToolExecutorPort>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }
}

/// Cloneable sender side of a running session.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    tx: mpsc::UnboundedSender<InboundEvent>,
    bridge: Arc<ElicitationBridge>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue an inbound event for the sequencer.
    pub fn send(&self, event: InboundEvent) -> Result<(), SessionError> {
        self.tx.send(event).map_err(|_| SessionError::Closed(self.id))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Whether a tool is currently waiting for the human.
    pub fn has_pending_elicitation(&self) -> bool {
        self.bridge.is_pending()
    }

    pub fn pending_prompt(&self) -> Option<(ElicitationId, ElicitationPrompt)> {
        self.bridge.pending_prompt()
    }
}

/// What a finished session reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub reason: AbortReason,
    pub turns: usize,
}

/// Per-connection aggregate, driven by [`ChatSession::run`].
pub struct ChatSession {
    id: SessionId,
    history: History,
    bridge: Arc<ElicitationBridge>,
    generations: JoinSet<GenerationCompletion>,
    in_flight: HashMap<task::Id, GenerationId>,
    next_generation: u64,
    services: ChatServices,
    outbound: mpsc::UnboundedSender<OutboundEvent>,
}

impl ChatSession {
    pub fn new(
        id: SessionId,
        services: ChatServices,
        outbound: mpsc::UnboundedSender<OutboundEvent>,
    ) -> Self {
        let bridge = ElicitationBridge::new(id, outbound.clone(), services.config.bridge.clone())
            .with_conversation_logger(services.conversation_logger.clone());
        Self {
            id,
            history: History::new(),
            bridge: Arc::new(bridge),
            generations: JoinSet::new(),
            in_flight: HashMap::new(),
            next_generation: 0,
            services,
            outbound,
        }
    }

    /// Start a session on its own task.
    pub fn spawn(
        id: SessionId,
        services: ChatServices,
        outbound: mpsc::UnboundedSender<OutboundEvent>,
    ) -> (SessionHandle, JoinHandle<SessionSummary>) {
        let session = Self::new(id, services, outbound);
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            id,
            tx,
            bridge: session.bridge.clone(),
        };
        (handle, tokio::spawn(session.run(rx)))
    }

    /// Sequencer loop. Returns once the session has been torn down.
    pub async fn run(mut self, mut inbound: mpsc::UnboundedReceiver<InboundEvent>) -> SessionSummary {
        let mut teardown = TeardownGuard {
            bridge: self.bridge.clone(),
            reason: AbortReason::SessionClosed,
        };
        info!(session = %self.id, "Session started");
        if let Some(welcome) = self.services.config.welcome.clone() {
            self.emit(OutboundEvent::System(welcome));
        }

        let reason = loop {
            tokio::select! {
                event = inbound.recv() => {
                    let Some(event) = event else {
                        debug!(session = %self.id, "All session handles dropped");
                        break AbortReason::SessionClosed;
                    };
                    if let ControlFlow::Break(reason) = self.handle_inbound(event) {
                        break reason;
                    }
                }
                Some(joined) = self.generations.join_next_with_id() => {
                    let completion = match joined {
                        Ok((task_id, completion)) => {
                            self.in_flight.remove(&task_id);
                            completion
                        }
                        Err(err) => match self.in_flight.remove(&err.id()) {
                            Some(id) => GenerationCompletion::from_join_error(id, err),
                            None => {
                                warn!(session = %self.id, error = %err, "Untracked generation task ended");
                                continue;
                            }
                        },
                    };
                    self.apply_completion(completion);
                }
            }
        };

        inbound.close();
        teardown.reason = reason;
        self.shutdown(reason).await;
        SessionSummary {
            id: self.id,
            reason,
            turns: self.history.len(),
        }
    }

    /// Dispatch one inbound event. `Break` ends the session.
    pub fn handle_inbound(&mut self, event: InboundEvent) -> ControlFlow<AbortReason> {
        match event {
            InboundEvent::UserMessage(text) => self.on_user_message(&text),
            InboundEvent::ElicitationAnswer { text, intent } => self.on_answer(&text, intent),
            InboundEvent::Reset => {
                self.history.clear();
                info!(session = %self.id, "History cleared");
                self.emit(OutboundEvent::System("Chat history cleared".to_string()));
            }
            InboundEvent::Disconnect => return ControlFlow::Break(AbortReason::Disconnected),
            InboundEvent::FatalError(message) => {
                error!(session = %self.id, error = %message, "Fatal transport error");
                self.emit(OutboundEvent::Error(message));
                return ControlFlow::Break(AbortReason::SessionClosed);
            }
        }
        ControlFlow::Continue(())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn active_generations(&self) -> usize {
        self.generations.len()
    }

    fn on_user_message(&mut self, text: &str) {
        let message = match Message::parse_user(text) {
            Ok(message) => message,
            Err(e) => {
                self.emit(OutboundEvent::Error(e.to_string()));
                return;
            }
        };
        self.emit(OutboundEvent::Echo {
            role: Role::User,
            text: message.content.clone(),
        });
        self.services.conversation_logger.log(ConversationEvent::new(
            "user_message",
            json!({
                "session": self.id.to_string(),
                "content": message.content,
            }),
        ));
        self.history.push(message);
        self.emit(OutboundEvent::Thinking);
        self.spawn_generation();
    }

    fn on_answer(&mut self, text: &str, intent: AnswerIntent) {
        if !self.bridge.is_pending() {
            debug!(session = %self.id, "Answer received with no pending elicitation");
            return;
        }
        match intent {
            AnswerIntent::Accept => {
                if let Err(e) = self.bridge.submit(text) {
                    debug!(session = %self.id, error = %e, "Answer rejected");
                    self.emit(OutboundEvent::Error(e.to_string()));
                    self.reprompt();
                }
            }
            AnswerIntent::Decline => {
                self.bridge.decline();
            }
        }
    }

    /// Publish the outstanding prompt again so the transport goes back to
    /// collecting an answer.
    fn reprompt(&self) {
        if let Some((id, prompt)) = self.bridge.pending_prompt() {
            self.emit(OutboundEvent::ElicitationPrompt {
                id,
                message: prompt.message,
                shape: prompt.shape,
            });
        }
    }

    fn spawn_generation(&mut self) {
        self.next_generation += 1;
        let id = GenerationId(self.next_generation);
        let request = GenerationRequest {
            history: self.history.snapshot(),
            system_instruction: self.services.config.system_instruction.clone(),
            tools: self.services.tools.clone(),
            tool_context: ToolContext::new(self.id, self.bridge.clone()),
        };
        let task = GenerationTask::new(id, self.services.gateway.clone(), request);
        let abort = self.generations.spawn(task.run());
        self.in_flight.insert(abort.id(), id);
        debug!(
            session = %self.id,
            generation = %id,
            active = self.generations.len(),
            "Generation spawned"
        );
    }

    fn apply_completion(&mut self, completion: GenerationCompletion) {
        let GenerationCompletion { id, outcome } = completion;
        match outcome {
            GenerationOutcome::Completed(reply) => {
                self.services.conversation_logger.log(ConversationEvent::new(
                    "generation_completed",
                    json!({
                        "session": self.id.to_string(),
                        "generation": id.to_string(),
                        "reply": reply.text,
                    }),
                ));
                self.history.push_assistant(reply.text.clone());
                self.emit(OutboundEvent::AssistantReply(reply.text));
            }
            GenerationOutcome::Failed(err) => {
                self.services.conversation_logger.log(ConversationEvent::new(
                    "generation_failed",
                    json!({
                        "session": self.id.to_string(),
                        "generation": id.to_string(),
                        "error": err.to_string(),
                    }),
                ));
                self.emit(OutboundEvent::Error(err.to_string()));
            }
            GenerationOutcome::Abandoned => {
                debug!(session = %self.id, generation = %id, "Generation abandoned");
            }
        }
    }

    async fn shutdown(&mut self, reason: AbortReason) {
        info!(
            session = %self.id,
            reason = %reason,
            active = self.generations.len(),
            "Session closing"
        );
        self.bridge.close(reason);

        // Tool calls unblocked by the close get a short window to wind down.
        let grace = self.services.config.teardown_grace;
        let generations = &mut self.generations;
        let in_flight = &mut self.in_flight;
        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = generations.join_next_with_id().await {
                let task_id = match &joined {
                    Ok((task_id, _)) => *task_id,
                    Err(err) => err.id(),
                };
                if let Some(id) = in_flight.remove(&task_id) {
                    debug!(generation = %id, "Result dropped during teardown");
                }
            }
        })
        .await;
        if drained.is_err() {
            debug!(session = %self.id, remaining = self.generations.len(), "Abandoning generations");
            self.generations.abort_all();
            while let Some(joined) = self.generations.join_next_with_id().await {
                let completion = match joined {
                    Ok((task_id, completion)) => {
                        self.in_flight.remove(&task_id);
                        completion
                    }
                    Err(err) => match self.in_flight.remove(&err.id()) {
                        Some(id) => GenerationCompletion::from_join_error(id, err),
                        None => continue,
                    },
                };
                if matches!(completion.outcome, GenerationOutcome::Abandoned) {
                    self.services.conversation_logger.log(ConversationEvent::new(
                        "generation_abandoned",
                        json!({
                            "session": self.id.to_string(),
                            "generation": completion.id.to_string(),
                        }),
                    ));
                }
            }
        }
        self.in_flight.clear();

        self.services.conversation_logger.log(ConversationEvent::new(
            "session_closed",
            json!({
                "session": self.id.to_string(),
                "reason": reason,
                "turns": self.history.len(),
            }),
        ));
    }

    fn emit(&self, event: OutboundEvent) {
        let _ = self.outbound.send(event);
    }
}

/// Closes the bridge however the sequencer exits, including by panic or abort.
struct TeardownGuard {
    bridge: Arc<ElicitationBridge>,
    reason: AbortReason,
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        self.bridge.close(self.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::generation_gateway::{GatewayError, GenerationReply};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replies with the number of turns it was given.
    struct CountingGateway {
        seen: Mutex<Vec<usize>>,
    }

    impl CountingGateway {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationGateway for CountingGateway {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationReply, GatewayError> {
            let turns = request.history.len();
            self.seen.lock().unwrap().push(turns);
            match request.history.last() {
                Some(m) if m.content == "fail" => {
                    Err(GatewayError::RequestFailed("quota exceeded".into()))
                }
                Some(m) if m.content == "panic" => panic!("gateway exploded"),
                _ => Ok(GenerationReply::new(format!("{turns} turns"))),
            }
        }
    }

    fn create_test_session(
        gateway: Arc<CountingGateway>,
    ) -> (
        SessionHandle,
        JoinHandle<SessionSummary>,
        mpsc::UnboundedReceiver<OutboundEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let services = ChatServices::new(gateway)
            .with_config(ChatConfig::default().with_welcome("Connected! Ready to chat."));
        let (handle, task) = ChatSession::spawn(SessionId(7), services, tx);
        (handle, task, rx)
    }

    async fn next_reply(rx: &mut mpsc::UnboundedReceiver<OutboundEvent>) -> OutboundEvent {
        loop {
            match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
                Ok(Some(OutboundEvent::Echo { .. }))
                | Ok(Some(OutboundEvent::Thinking))
                | Ok(Some(OutboundEvent::System(_))) => continue,
                Ok(Some(event)) => return event,
                other => panic!("no reply: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_user_message_event_order() {
        let (handle, _task, mut rx) = create_test_session(Arc::new(CountingGateway::new()));

        handle.send(InboundEvent::UserMessage("hello".into())).unwrap();

        assert_eq!(
            rx.recv().await,
            Some(OutboundEvent::System("Connected! Ready to chat.".into()))
        );
        assert_eq!(
            rx.recv().await,
            Some(OutboundEvent::Echo {
                role: Role::User,
                text: "hello".into()
            })
        );
        assert_eq!(rx.recv().await, Some(OutboundEvent::Thinking));
        assert_eq!(
            rx.recv().await,
            Some(OutboundEvent::AssistantReply("1 turns".into()))
        );
    }

    #[tokio::test]
    async fn test_history_grows_and_reset_clears() {
        let gateway = Arc::new(CountingGateway::new());
        let (handle, task, mut rx) = create_test_session(gateway.clone());

        handle.send(InboundEvent::UserMessage("one".into())).unwrap();
        assert_eq!(next_reply(&mut rx).await, OutboundEvent::AssistantReply("1 turns".into()));

        handle.send(InboundEvent::UserMessage("two".into())).unwrap();
        assert_eq!(next_reply(&mut rx).await, OutboundEvent::AssistantReply("3 turns".into()));

        handle.send(InboundEvent::Reset).unwrap();
        handle.send(InboundEvent::UserMessage("three".into())).unwrap();
        assert_eq!(next_reply(&mut rx).await, OutboundEvent::AssistantReply("1 turns".into()));

        handle.send(InboundEvent::Disconnect).unwrap();
        let summary = task.await.unwrap();
        assert_eq!(summary.reason, AbortReason::Disconnected);
        assert_eq!(summary.turns, 2);
        assert_eq!(*gateway.seen.lock().unwrap(), vec![1, 3, 1]);
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_session_usable() {
        let (handle, _task, mut rx) = create_test_session(Arc::new(CountingGateway::new()));

        handle.send(InboundEvent::UserMessage("fail".into())).unwrap();
        assert_eq!(
            next_reply(&mut rx).await,
            OutboundEvent::Error("Request failed: quota exceeded".into())
        );

        // The failed turn left only the user message behind.
        handle.send(InboundEvent::UserMessage("again".into())).unwrap();
        assert_eq!(next_reply(&mut rx).await, OutboundEvent::AssistantReply("2 turns".into()));
    }

    #[tokio::test]
    async fn test_panicking_generation_reported_as_error() {
        let (handle, _task, mut rx) = create_test_session(Arc::new(CountingGateway::new()));

        handle.send(InboundEvent::UserMessage("panic".into())).unwrap();
        assert_eq!(
            next_reply(&mut rx).await,
            OutboundEvent::Error("Other error: generation task panicked".into())
        );
        assert!(!handle.is_closed());
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let gateway = Arc::new(CountingGateway::new());
        let (handle, _task, mut rx) = create_test_session(gateway.clone());

        handle.send(InboundEvent::UserMessage("   ".into())).unwrap();
        assert!(matches!(next_reply(&mut rx).await, OutboundEvent::Error(_)));
        assert!(gateway.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stray_answer_is_ignored() {
        let (handle, _task, mut rx) = create_test_session(Arc::new(CountingGateway::new()));

        handle.send(InboundEvent::answer("y")).unwrap();
        handle.send(InboundEvent::UserMessage("hi".into())).unwrap();

        assert_eq!(next_reply(&mut rx).await, OutboundEvent::AssistantReply("1 turns".into()));
        assert!(!handle.has_pending_elicitation());
    }

    #[tokio::test]
    async fn test_fatal_error_closes_session() {
        let (handle, task, mut rx) = create_test_session(Arc::new(CountingGateway::new()));

        handle
            .send(InboundEvent::FatalError("socket reset".into()))
            .unwrap();
        assert_eq!(next_reply(&mut rx).await, OutboundEvent::Error("socket reset".into()));

        let summary = task.await.unwrap();
        assert_eq!(summary.reason, AbortReason::SessionClosed);
        assert_eq!(
            handle.send(InboundEvent::Reset),
            Err(SessionError::Closed(SessionId(7)))
        );
    }

    /// Never answers.
    struct HangingGateway;

    #[async_trait]
    impl GenerationGateway for HangingGateway {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationReply, GatewayError> {
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    #[tokio::test]
    async fn test_teardown_abandons_stuck_generation() {
        let logger = Arc::new(RecordingLogger::default());
        let services = ChatServices::new(Arc::new(HangingGateway))
            .with_config(ChatConfig::default().with_teardown_grace(Duration::from_millis(50)))
            .with_conversation_logger(logger.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (handle, task) = ChatSession::spawn(SessionId(9), services, tx);

        handle.send(InboundEvent::UserMessage("hello".into())).unwrap();
        loop {
            match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
                Ok(Some(OutboundEvent::Thinking)) => break,
                Ok(Some(_)) => continue,
                other => panic!("generation never started: {other:?}"),
            }
        }

        handle.send(InboundEvent::Disconnect).unwrap();
        let summary = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("teardown hung on a stuck generation")
            .unwrap();

        assert_eq!(summary.reason, AbortReason::Disconnected);
        assert_eq!(summary.turns, 1);
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["user_message", "generation_abandoned", "session_closed"]
        );
    }

    #[tokio::test]
    async fn test_dropping_all_handles_ends_session() {
        let (handle, task, _rx) = create_test_session(Arc::new(CountingGateway::new()));
        drop(handle);

        let summary = task.await.unwrap();
        assert_eq!(summary.reason, AbortReason::SessionClosed);
    }
}
