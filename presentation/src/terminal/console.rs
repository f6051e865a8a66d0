//! Console rendering of session events

use colored::Colorize;
use mcpbot_application::OutboundEvent;
use mcpbot_domain::{ExpectedShape, Role};

/// Formats [`OutboundEvent`]s for a terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render one event, or `None` when the terminal already shows it.
    ///
    /// User messages are on screen as typed, so their echoes are skipped.
    pub fn format_event(event: &OutboundEvent) -> Option<String> {
        let line = match event {
            OutboundEvent::System(text) => format!("{} {}", "•".cyan(), text.dimmed()),
            OutboundEvent::Echo {
                role: Role::User, ..
            } => return None,
            OutboundEvent::Echo {
                role: Role::Assistant,
                text,
            } => Self::assistant(text),
            OutboundEvent::Thinking => format!("{}", "Gemini is thinking...".dimmed().italic()),
            OutboundEvent::ElicitationPrompt { message, shape, .. } => {
                let mut out = format!("{} {}", "?".yellow().bold(), message.yellow().bold());
                if let Some(hint) = Self::shape_hint(shape) {
                    out.push_str(&format!(" {}", hint.dimmed()));
                }
                out
            }
            OutboundEvent::AssistantReply(text) => Self::assistant(text),
            OutboundEvent::Error(text) => format!("{} {}", "Error:".red().bold(), text),
        };
        Some(line)
    }

    pub fn header(title: &str) -> String {
        let line = "─".repeat(47);
        format!(
            "╭{}╮\n│{:^47}│\n╰{}╯",
            line,
            title.bold(),
            line
        )
    }

    pub fn help() -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", "Commands:".cyan().bold()));
        out.push_str("  /help, /h, /?     - Show this help\n");
        out.push_str("  /reset, /clear    - Clear the conversation history\n");
        out.push_str("  /quit, /exit, /q  - Exit chat\n");
        out.push_str("\nWhen a tool asks a question, your next line answers it.\n");
        out.push_str("Reply 'cancel' or 'decline' to refuse.");
        out
    }

    /// Prompt shown before reading a line.
    pub fn input_prompt(answering: bool) -> String {
        if answering {
            format!("{} ", "answer>".yellow().bold())
        } else {
            format!("{} ", ">>>".green().bold())
        }
    }

    fn assistant(text: &str) -> String {
        format!("{}\n{}", "Gemini:".magenta().bold(), Self::indent(text, "  "))
    }

    fn shape_hint(shape: &ExpectedShape) -> Option<String> {
        match shape {
            ExpectedShape::Text => None,
            ExpectedShape::Boolean => Some("[yes/no]".to_string()),
            ExpectedShape::Integer => Some("[integer]".to_string()),
            ExpectedShape::Number => Some("[number]".to_string()),
            ExpectedShape::Choice(values) => Some(format!("[{}]", values.join("/"))),
        }
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpbot_domain::ElicitationId;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn test_user_echo_is_skipped() {
        let event = OutboundEvent::Echo {
            role: Role::User,
            text: "roll 3 dice".into(),
        };
        assert!(ConsoleFormatter::format_event(&event).is_none());
    }

    #[test]
    fn test_prompt_includes_choices() {
        let rendered = plain(|| {
            ConsoleFormatter::format_event(&OutboundEvent::ElicitationPrompt {
                id: ElicitationId(1),
                message: "Do you want to roll 3 dice? (yes/y to confirm)".into(),
                shape: ExpectedShape::Choice(vec!["yes".into(), "y".into()]),
            })
        })
        .unwrap();
        assert!(rendered.contains("Do you want to roll 3 dice?"));
        assert!(rendered.contains("[yes/y]"));
    }

    #[test]
    fn test_reply_is_indented() {
        let rendered = plain(|| {
            ConsoleFormatter::format_event(&OutboundEvent::AssistantReply("one\ntwo".into()))
        })
        .unwrap();
        assert!(rendered.ends_with("  one\n  two"));
    }

    #[test]
    fn test_error_is_labelled() {
        let rendered =
            plain(|| ConsoleFormatter::format_event(&OutboundEvent::Error("boom".into()))).unwrap();
        assert_eq!(rendered, "Error: boom");
    }
}
