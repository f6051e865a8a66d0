//! Line-oriented terminal chat
//!
//! Reads stdin asynchronously so session output (prompts from tools,
//! replies) is printed while the user is still typing.

use super::console::ConsoleFormatter;
use mcpbot_application::{InboundEvent, OutboundEvent, SessionRegistry};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Upper bound on waiting for the session's last events after quitting
const DRAIN_TIMEOUT: Duration = Duration::from_secs(3);

/// What one input line means
#[derive(Debug, Clone, PartialEq)]
pub enum LineAction {
    Skip,
    Help,
    Quit,
    Unknown(String),
    Send(InboundEvent),
}

/// Classify an input line. While a prompt is pending every non-command
/// line answers it.
pub fn classify_line(line: &str, answering: bool) -> LineAction {
    let line = line.trim();
    if line.is_empty() {
        return LineAction::Skip;
    }
    if line.starts_with('/') {
        return match line {
            "/quit" | "/exit" | "/q" => LineAction::Quit,
            "/help" | "/h" | "/?" => LineAction::Help,
            "/reset" | "/clear" => LineAction::Send(InboundEvent::Reset),
            other => LineAction::Unknown(other.to_string()),
        };
    }
    if answering {
        LineAction::Send(InboundEvent::answer(line))
    } else {
        LineAction::Send(InboundEvent::UserMessage(line.to_string()))
    }
}

/// Interactive terminal chat over one session
pub struct TerminalRepl {
    registry: Arc<SessionRegistry>,
    show_welcome: bool,
}

impl TerminalRepl {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            show_welcome: true,
        }
    }

    pub fn with_welcome(mut self, show: bool) -> Self {
        self.show_welcome = show;
        self
    }

    /// Run until `/quit`, end of input or `shutdown`.
    pub async fn run(&self, shutdown: CancellationToken) -> std::io::Result<()> {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutboundEvent>();
        let handle = self.registry.open(out_tx);
        let session = handle.id();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        if self.show_welcome {
            self.print_welcome();
        }
        print_prompt(false);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    println!();
                    let _ = handle.send(InboundEvent::Disconnect);
                    break;
                }
                Some(event) = out_rx.recv() => {
                    if let Some(text) = ConsoleFormatter::format_event(&event) {
                        println!("\r{}", text);
                        print_prompt(handle.has_pending_elicitation());
                    }
                }
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            debug!(%session, "End of input");
                            let _ = handle.send(InboundEvent::Disconnect);
                            break;
                        }
                        Err(e) => {
                            let _ = handle.send(InboundEvent::FatalError(e.to_string()));
                            break;
                        }
                    };
                    match classify_line(&line, handle.has_pending_elicitation()) {
                        LineAction::Skip => {}
                        LineAction::Help => println!("{}", ConsoleFormatter::help()),
                        LineAction::Unknown(cmd) => {
                            println!("Unknown command: {}", cmd);
                            println!("Type /help for available commands");
                        }
                        LineAction::Quit => {
                            let _ = handle.send(InboundEvent::Disconnect);
                            break;
                        }
                        LineAction::Send(event) => {
                            if handle.send(event).is_err() {
                                break;
                            }
                        }
                    }
                    print_prompt(handle.has_pending_elicitation());
                }
            }
        }

        drop(handle);
        let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
            while let Some(event) = out_rx.recv().await {
                if let Some(text) = ConsoleFormatter::format_event(&event) {
                    println!("{}", text);
                }
            }
        })
        .await;
        if drained.is_err() {
            debug!(%session, "Session still draining at exit");
        }
        info!(%session, "Terminal session ended");
        println!("Bye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", ConsoleFormatter::header("mcpbot - Chat Mode"));
        println!();
        println!("{}", ConsoleFormatter::help());
        println!();
    }
}

fn print_prompt(answering: bool) {
    print!("{}", ConsoleFormatter::input_prompt(answering));
    let _ = std::io::stdout().flush();
}
