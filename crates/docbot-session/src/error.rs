//! Error types for session operations.

use std::time::Duration;

use docbot_client::RunStatus;
use docbot_config::ConfigError;

use crate::reconcile::ResourceKind;

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A cached id could not be checked remotely (not a not-found).
    #[error("could not look up {kind} '{id}': {source}")]
    Retrieve {
        kind: ResourceKind,
        id: String,
        source: docbot_client::Error,
    },

    /// Creating a replacement resource failed.
    #[error("could not create {kind}: {source}")]
    Create {
        kind: ResourceKind,
        source: docbot_client::Error,
    },

    /// Any other remote call failed.
    #[error(transparent)]
    Service(#[from] docbot_client::Error),

    /// Reading or writing local state failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A run did not finish successfully.
    #[error(transparent)]
    Poll(#[from] PollError),

    /// Gathering input from the user failed.
    #[error("input error: {0}")]
    Input(String),
}

/// Why waiting on a run stopped without a completed run.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The run reached a terminal status other than `completed`.
    #[error("run {run_id} ended as {status}{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Terminal {
        run_id: String,
        status: RunStatus,
        reason: Option<String>,
    },

    /// The run is waiting on function-tool output this client never provides.
    #[error("run {run_id} requires tool output, which this client does not support")]
    RequiresAction { run_id: String },

    /// The run was still going when the wait budget ran out.
    #[error("run {run_id} still {last_status} after {}s", .waited.as_secs())]
    Timeout {
        run_id: String,
        last_status: RunStatus,
        waited: Duration,
    },

    /// Fetching the run status failed.
    #[error("could not fetch run status: {0}")]
    Service(#[source] docbot_client::Error),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
