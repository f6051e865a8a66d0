//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Front end the chat is served through
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrontEnd {
    /// WebSocket server with a browser chat page
    Web,
    /// Interactive chat in this terminal
    Terminal,
}

/// CLI arguments for mcpbot
#[derive(Parser, Debug)]
#[command(name = "mcpbot")]
#[command(author, version, about = "Gemini chat client whose tools can ask you questions")]
#[command(long_about = r#"
mcpbot chats with a Gemini model that can call tools. Tools may pause to ask
the human a question (for example, to confirm a dice roll) and resume once the
answer arrives, while the chat stays responsive.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./mcpbot.toml       Project-level config
3. ~/.config/mcpbot/config.toml   Global config
Environment variables (GEMINI_API_KEY, GEMINI_MODEL, INSTRUCTION_PATH,
LOG_FOLDER_PATH) override all files.

Example:
  mcpbot                          # serve the web chat on 0.0.0.0:8080
  mcpbot --bind 127.0.0.1:3000
  mcpbot --front-end terminal -v
"#)]
pub struct Cli {
    /// Front end to run
    #[arg(short, long, value_enum, default_value = "web")]
    pub front_end: FrontEnd,

    /// Address for the web front end (overrides [web] bind)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Default tracing filter for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
