//! CLI command handlers.

pub mod listings;
pub mod menu;
pub mod models;
pub mod prompt;
pub mod repl;
pub mod setup;
pub mod start;
pub mod uploads;

use std::path::PathBuf;

use docbot_session::PollPolicy;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Env file caching the API key and remote ids.
    pub env_file: PathBuf,
    /// Assistant instructions file.
    pub instructions: PathBuf,
    /// API base URL override.
    pub base_url: Option<String>,
    /// Run polling policy.
    pub poll: PollPolicy,
    /// Verbose output enabled.
    pub verbose: bool,
}
