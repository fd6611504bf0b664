//! Session logic for the docbot client.
//!
//! This crate owns the state machine between the local env file and the
//! remote Assistants service:
//! - [`Reconciler`] resolves the cached assistant, thread and vector store
//!   ids, creating replacements for ids that no longer exist,
//! - [`RunPoller`] drives a run to a terminal status within a time budget,
//! - [`ChatSession`] turns lines of input into messages, runs and replies.
//!
//! All remote calls go through the [`AssistantService`] trait so the logic
//! can be exercised against [`mock::MockService`].
//!
//! # Example
//!
//! ```rust,ignore
//! use docbot_session::{SessionContext, PollPolicy};
//!
//! let ctx = SessionContext::new(service, store).with_poll_policy(PollPolicy::default());
//! let thread = ctx.reconciler().thread(cached_thread_id).await?;
//! ```

pub mod chat;
pub mod context;
mod error;
pub mod instrument;
pub mod maintenance;
pub mod mock;
pub mod poller;
pub mod reconcile;
pub mod service;
pub mod uploads;

pub use chat::{ChatFrontend, ChatSession, EXIT_WORDS, TurnOutcome, is_exit_command};
pub use context::SessionContext;
pub use error::{Error, PollError, Result};
pub use instrument::{RetryPolicy, timed, with_retry};
pub use maintenance::{ModelChoice, bind_vector_store, choose_model, cold_start, gpt_models, history};
pub use poller::{CompletedRun, PollPolicy, RunPoller};
pub use reconcile::{ReconcileState, Reconciled, Reconciler, Resolution, ResourceKind};
pub use service::{AssistantService, SharedService};
pub use uploads::{UploadReport, expand_paths, upload_to_vector_store};
