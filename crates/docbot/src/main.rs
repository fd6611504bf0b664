//! Docbot - chat with your documents through an OpenAI assistant
//!
//! Main entry point for the docbot CLI.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use docbot_session::PollPolicy;

mod commands;
mod exit;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Docbot - chat with your documents through an OpenAI assistant
#[derive(Parser)]
#[command(name = "docbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Env file caching the API key and remote ids
    #[arg(long, env = "DOCBOT_ENV_FILE", default_value = docbot_config::DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// File whose contents become the assistant's instructions
    #[arg(long, default_value = docbot_config::DEFAULT_INSTRUCTIONS_FILE)]
    pub instructions: PathBuf,

    /// API base URL (default: https://api.openai.com/v1)
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Delay between run status checks, in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// Give up on a run after this many seconds
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_wait_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable, stderr) + rotating JSON file
    let filter = if cli.verbose {
        "docbot=debug,docbot_session=debug,docbot_client=debug,docbot_config=debug,info"
    } else {
        "docbot=info,docbot_session=warn,docbot_client=warn,docbot_config=warn,warn"
    };

    let log_dir = docbot_config::log_dir();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "docbot.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "docbot=trace,docbot_session=trace,docbot_client=trace,docbot_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        env_file: cli.env_file,
        instructions: cli.instructions,
        base_url: cli.base_url,
        poll: PollPolicy {
            interval: Duration::from_millis(cli.poll_interval_ms),
            max_wait: Duration::from_secs(cli.max_wait_secs),
        },
        verbose: cli.verbose,
    };

    match commands::start::run(&ctx).await {
        Ok(()) => ExitCode::from(exit::SUCCESS),
        Err(e) => {
            let code = exit::code_for(&e);
            tracing::debug!(error = %format!("{:#}", e), code, "Exiting");
            eprintln!("{} {:#}", console::style("Error:").red(), e);
            ExitCode::from(code)
        }
    }
}
