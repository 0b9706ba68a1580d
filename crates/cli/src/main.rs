//! `webscout` entrypoint: config, logging, and the interactive session.

mod config;
mod console;
#[cfg(test)]
mod test_support;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use agent::{AgentRuntime, OllamaProvider, SessionOutcome, ToolRegistry};
use anyhow::Context;
use clap::Parser;
use proto::LlmError;
use tokio::io::AsyncBufRead;
use tools::{OllamaWebClient, WebFetchTool, WebSearchTool};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{CONFIG_DIR, Config, home_dir};
use crate::console::{TerminalConsole, banner};

const INTERRUPTED: &str = "\n👋 Conversation interrupted by user.";

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "webscout")]
#[command(about = "Ollama agent with web search and web fetch tools", version)]
struct Cli {
    /// First question; prompts for one when omitted
    question: Option<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ollama model name
    #[arg(short, long)]
    model: Option<String>,

    /// Ollama host (host, host:port or URL)
    #[arg(long)]
    host: Option<String>,

    /// Model invocations allowed per question
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Disable the model's reasoning output
    #[arg(long, default_value_t = false)]
    no_think: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Enable debug logging to ~/.webscout/logs/debug.log
    #[arg(long, default_value_t = false)]
    debug: bool,
}

impl Cli {
    /// Applies command-line overrides on top of file and env config.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.agent.model = model.clone();
        }
        if let Some(host) = &self.host {
            config.agent.host = host.clone();
        }
        if let Some(max) = self.max_iterations {
            config.agent.max_iterations = max;
        }
        if self.no_think {
            config.agent.think = false;
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let file_guard = init_tracing(&cli);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("Setup failed: {e:#}");
            eprintln!("❌ {e:#}");
            1
        }
    };

    // Flush buffered file logs; process::exit skips destructors.
    drop(file_guard);
    std::process::exit(code);
}

/// Installs the stderr subscriber and, with `--debug`, a daily-rolling file layer.
fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (file, guard) = if cli.debug {
        let log_dir = home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join("logs");
        std::fs::create_dir_all(&log_dir).ok();
        let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();

    if cli.debug {
        info!(version = env!("CARGO_PKG_VERSION"), "webscout session started (debug)");
    }
    guard
}

/// Loads config and drives one session; returns the process exit code.
fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config =
        Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let agent = build_runtime(&config);
    let code = runtime.block_on(async {
        let mut console = TerminalConsole::stdio();
        let interrupt = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        converse(&agent, &mut console, cli.question.as_deref(), interrupt).await
    });
    // A pending stdin read must not block shutdown.
    runtime.shutdown_background();
    Ok(code)
}

fn build_runtime(config: &Config) -> AgentRuntime {
    let provider = Arc::new(OllamaProvider::with_host(&config.agent.host));
    info!(host = %provider.host(), model = %config.agent.model, "Model service configured");

    if config.tools.api_key.is_empty() {
        warn!("OLLAMA_API_KEY is not set; web_search and web_fetch will report errors");
    }
    let client = OllamaWebClient::with_base_url(&config.tools.api_key, &config.tools.base_url)
        .with_timeout(config.tools.timeout_secs);
    let mut registry = ToolRegistry::new();
    registry.register(WebSearchTool::new(client.clone()));
    registry.register(WebFetchTool::new(client));

    AgentRuntime::new(
        provider,
        Arc::new(registry),
        &config.agent.model,
        config.agent.max_iterations,
    )
    .with_think(config.agent.think)
}

/// Runs one session against `console`, racing it with `interrupt`.
///
/// Returns the process exit code. Banners for interrupts and fatal errors are
/// written to the console.
async fn converse<R, W>(
    runtime: &AgentRuntime,
    console: &mut TerminalConsole<R, W>,
    question: Option<&str>,
    interrupt: impl Future<Output = ()>,
) -> i32
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    if let Err(e) = console.write_line(&banner()) {
        eprintln!("❌ Runtime error: {e}");
        return 1;
    }

    let finished = tokio::select! {
        biased;
        _ = interrupt => None,
        result = runtime.run(&mut *console, question) => Some(result),
    };

    let (code, report) = match finished {
        None => {
            info!(session = %runtime.session_id(), "Interrupted by user");
            (0, Some(INTERRUPTED.to_string()))
        }
        Some(Ok(outcome)) => {
            info!(?outcome, "Session ended");
            (exit_code(&outcome), None)
        }
        Some(Err(e)) => {
            error!(error = %e, "Conversation failed");
            (1, Some(failure_report(&e)))
        }
    };
    if let Some(report) = report
        && let Err(e) = console.write_line(&report)
    {
        warn!(error = %e, "Failed to write to terminal");
    }
    code
}

/// Exit code for a conversation that ended without a fatal error.
fn exit_code(outcome: &SessionOutcome) -> i32 {
    match outcome {
        SessionOutcome::UserQuit
        | SessionOutcome::InputClosed
        | SessionOutcome::IterationLimit
        | SessionOutcome::ModelError(_) => 0,
    }
}

/// User-facing text for a fatal conversation error.
fn failure_report(err: &proto::Error) -> String {
    match err {
        proto::Error::Llm(LlmError::Connection(_)) => [
            "❌ Connection Error: Failed to connect to Ollama.",
            "Please ensure Ollama is installed and running.",
            "Visit https://ollama.com/download for installation instructions.",
        ]
        .join("\n"),
        other => format!("❌ Runtime error: {other}"),
    }
}
