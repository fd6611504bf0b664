//! Submitting runs and waiting for them to finish.

use std::time::Duration;

use docbot_client::{Run, RunStatus};
use tokio::time::Instant;

use crate::error::PollError;
use crate::instrument::timed;
use crate::service::SharedService;

/// How often and for how long to poll a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between status checks.
    pub interval: Duration,
    /// Upper bound on the total wait.
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(120),
        }
    }
}

/// A run that reached `completed`.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub run: Run,
    /// Status fetches it took to observe completion.
    pub polls: u32,
}

/// Creates runs and polls them to a terminal status.
#[derive(Clone)]
pub struct RunPoller {
    service: SharedService,
    policy: PollPolicy,
}

impl RunPoller {
    pub fn new(service: SharedService, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Start a run of `assistant_id` over `thread_id`.
    pub async fn submit_run(
        &self,
        assistant_id: &str,
        thread_id: &str,
    ) -> docbot_client::Result<Run> {
        let run = timed("create_run", self.service.create_run(thread_id, assistant_id)).await?;
        tracing::debug!(run_id = %run.id, status = %run.status, "Run submitted");
        Ok(run)
    }

    /// Poll `run` until it reaches a terminal status.
    ///
    /// One status fetch per iteration; `observe` sees every fetched status.
    pub async fn await_completion<O>(
        &self,
        run: &Run,
        mut observe: O,
    ) -> Result<CompletedRun, PollError>
    where
        O: FnMut(RunStatus),
    {
        let started = Instant::now();
        let mut polls = 0;

        loop {
            let current = timed(
                "retrieve_run",
                self.service.retrieve_run(&run.thread_id, &run.id),
            )
            .await
            .map_err(PollError::Service)?;
            polls += 1;
            observe(current.status);
            tracing::trace!(run_id = %run.id, status = %current.status, polls, "Run status");

            match current.status {
                RunStatus::Completed => {
                    tracing::debug!(
                        run_id = %run.id,
                        polls,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Run completed"
                    );
                    return Ok(CompletedRun {
                        run: current,
                        polls,
                    });
                }
                RunStatus::Failed
                | RunStatus::Cancelled
                | RunStatus::Expired
                | RunStatus::Incomplete => {
                    let reason = current.failure_reason();
                    tracing::warn!(run_id = %run.id, status = %current.status, reason = ?reason, "Run ended without completing");
                    return Err(PollError::Terminal {
                        run_id: current.id,
                        status: current.status,
                        reason,
                    });
                }
                RunStatus::RequiresAction => {
                    tracing::warn!(run_id = %run.id, "Run requires tool output");
                    return Err(PollError::RequiresAction { run_id: current.id });
                }
                RunStatus::Queued
                | RunStatus::InProgress
                | RunStatus::Cancelling
                | RunStatus::Unknown => {
                    debug_assert!(!current.status.is_terminal());
                }
            }

            let waited = started.elapsed();
            if waited >= self.policy.max_wait {
                tracing::warn!(run_id = %run.id, status = %current.status, waited_ms = waited.as_millis() as u64, "Gave up waiting for run");
                return Err(PollError::Timeout {
                    run_id: current.id,
                    last_status: current.status,
                    waited,
                });
            }

            tokio::time::sleep(self.policy.interval).await;
        }
    }
}
