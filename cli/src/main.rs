//! CLI entrypoint for mcpbot
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use mcpbot_application::{ChatServices, SessionRegistry};
use mcpbot_infrastructure::{
    BuiltinProvider, ConfigLoader, FileConfig, GeminiGateway, GeminiSettings,
    JsonlConversationLogger, ToolRegistry,
};
use mcpbot_presentation::{Cli, FrontEnd, TerminalRepl};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const WEB_WELCOME: &str = "✓ Connected! Ready to chat.";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
    }
    .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    if let Some(bind) = &cli.bind {
        config.web.bind = bind.clone();
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&cli, config.logging.dir.as_deref());
    info!("Starting mcpbot");

    config.validate(true).context("Invalid configuration")?;

    // === Dependency Injection ===
    let settings = GeminiSettings::from_config(&config.gemini)?;
    info!(model = %settings.model, "Using Gemini");
    let gateway = Arc::new(GeminiGateway::new(settings)?);

    let mut tools = ToolRegistry::new().register(BuiltinProvider::new());
    let count = tools.discover().await;
    info!(tools = count, "Tools registered");

    let mut services = ChatServices::new(gateway)
        .with_tools(Arc::new(tools))
        .with_config(chat_config(&config, cli.front_end));
    if let Some(logger) = conversation_logger(&config) {
        info!(path = %logger.path().display(), "Writing conversation log");
        services = services.with_conversation_logger(Arc::new(logger));
    }
    let registry = Arc::new(SessionRegistry::new(services));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, shutting down");
            }
            shutdown.cancel();
        }
    });

    match cli.front_end {
        FrontEnd::Web => {
            let addr = config.bind_addr()?;
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            println!("Chat available at http://{}", addr);
            mcpbot_presentation::web::serve(listener, registry, shutdown).await?;
        }
        FrontEnd::Terminal => {
            TerminalRepl::new(registry).run(shutdown).await?;
        }
    }

    Ok(())
}

fn chat_config(config: &FileConfig, front_end: FrontEnd) -> mcpbot_application::ChatConfig {
    let chat = config.chat.to_chat_config();
    match front_end {
        FrontEnd::Web => chat.with_welcome(WEB_WELCOME),
        FrontEnd::Terminal => chat,
    }
}

fn conversation_logger(config: &FileConfig) -> Option<JsonlConversationLogger> {
    if !config.logging.conversation_log {
        return None;
    }
    let Some(dir) = &config.logging.dir else {
        warn!("logging.conversation_log is set but logging.dir is not; transcript disabled");
        return None;
    };
    JsonlConversationLogger::daily_in(dir)
}

/// Initialize tracing: `RUST_LOG` wins over `-v`; a log directory sends
/// output to a daily rolling file instead of stderr.
fn init_logging(cli: &Cli, dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    match dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "mcpclient_log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
