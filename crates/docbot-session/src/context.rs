//! Everything a session needs, built once at startup.

use docbot_config::EnvStore;

use crate::chat::ChatSession;
use crate::instrument::RetryPolicy;
use crate::poller::{PollPolicy, RunPoller};
use crate::reconcile::Reconciler;
use crate::service::SharedService;

/// The remote service, the env file and the wait policies.
#[derive(Clone)]
pub struct SessionContext {
    pub service: SharedService,
    pub store: EnvStore,
    pub retry: RetryPolicy,
    pub poll: PollPolicy,
}

impl SessionContext {
    pub fn new(service: SharedService, store: EnvStore) -> Self {
        Self {
            service,
            store,
            retry: RetryPolicy::default(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.service.clone(), self.store.clone()).with_retry_policy(self.retry)
    }

    pub fn poller(&self) -> RunPoller {
        RunPoller::new(self.service.clone(), self.poll)
    }

    /// A chat over the given assistant and thread.
    pub fn chat(&self, assistant_id: &str, thread_id: &str) -> ChatSession {
        ChatSession::new(self.service.clone(), self.poller(), assistant_id, thread_id)
    }
}
