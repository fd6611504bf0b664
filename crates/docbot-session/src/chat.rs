//! The request/response turn loop.

use docbot_client::{Role, RunStatus};

use crate::error::{Error, Result};
use crate::instrument::timed;
use crate::poller::RunPoller;
use crate::service::SharedService;

/// Inputs that end the session (compared trimmed, case-insensitively).
pub const EXIT_WORDS: [&str; 4] = ["exit", "quit", "q", "bye"];

/// How many of the newest messages are searched for the reply.
const REPLY_WINDOW: u32 = 20;

/// Whether `input` asks to leave the session.
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

/// Result of handling one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The user asked to leave.
    Exit,
    /// Blank input; nothing was sent.
    Skipped,
    /// The assistant's answer.
    Reply(String),
    /// The run completed without an assistant message.
    NoReply,
}

/// Where a [`ChatSession`] reads input and reports results.
pub trait ChatFrontend {
    /// Next line of input, or `None` at end of input.
    fn read_line(&mut self) -> Option<String>;

    /// A run status observed while waiting for a reply.
    fn on_status(&mut self, _status: RunStatus) {}

    fn on_reply(&mut self, reply: &str);

    fn on_no_reply(&mut self) {}

    /// A turn failed. The session keeps going.
    fn on_error(&mut self, error: &Error);

    fn on_exit(&mut self) {}
}

/// One conversation with a resolved assistant and thread.
pub struct ChatSession {
    service: SharedService,
    poller: RunPoller,
    assistant_id: String,
    thread_id: String,
}

impl ChatSession {
    pub fn new(
        service: SharedService,
        poller: RunPoller,
        assistant_id: impl Into<String>,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            service,
            poller,
            assistant_id: assistant_id.into(),
            thread_id: thread_id.into(),
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    /// Handle one line of user input.
    ///
    /// Sends the message, runs the assistant over the thread and waits for
    /// the run to finish. `observe` sees every polled run status.
    pub async fn handle_input<O>(&self, input: &str, observe: O) -> Result<TurnOutcome>
    where
        O: FnMut(RunStatus),
    {
        if is_exit_command(input) {
            return Ok(TurnOutcome::Exit);
        }
        let text = input.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Skipped);
        }

        let sent = timed(
            "create_message",
            self.service.create_message(&self.thread_id, text),
        )
        .await?;
        tracing::debug!(message_id = %sent.id, chars = text.len(), "Message sent");

        let run = self
            .poller
            .submit_run(&self.assistant_id, &self.thread_id)
            .await?;
        let done = self.poller.await_completion(&run, observe).await?;

        let recent = timed(
            "list_messages",
            self.service.recent_messages(&self.thread_id, REPLY_WINDOW),
        )
        .await?;

        // Newest first; only messages after ours can answer it.
        let reply = recent
            .iter()
            .take_while(|m| m.id != sent.id)
            .find(|m| {
                m.role == Role::Assistant
                    && m.run_id.as_deref().is_none_or(|id| id == done.run.id)
            })
            .map(|m| m.text());

        match reply {
            Some(text) => Ok(TurnOutcome::Reply(text)),
            None => {
                tracing::warn!(run_id = %done.run.id, "Run completed without an assistant message");
                Ok(TurnOutcome::NoReply)
            }
        }
    }

    /// Read, send and print turns until the user exits or input ends.
    pub async fn run<F: ChatFrontend>(&self, frontend: &mut F) {
        tracing::info!(assistant_id = %self.assistant_id, thread_id = %self.thread_id, "Chat started");
        let mut turns = 0u32;

        while let Some(line) = frontend.read_line() {
            let outcome = self
                .handle_input(&line, |status| frontend.on_status(status))
                .await;
            match outcome {
                Ok(TurnOutcome::Exit) => break,
                Ok(TurnOutcome::Skipped) => {}
                Ok(TurnOutcome::Reply(text)) => {
                    turns += 1;
                    frontend.on_reply(&text);
                }
                Ok(TurnOutcome::NoReply) => {
                    turns += 1;
                    frontend.on_no_reply();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Turn failed");
                    frontend.on_error(&e);
                }
            }
        }

        tracing::info!(turns, "Chat ended");
        frontend.on_exit();
    }
}
