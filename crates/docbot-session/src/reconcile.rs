//! Retrieve-or-create reconciliation of the cached remote resources.
//!
//! Each of the assistant, thread and vector store is resolved the same way:
//!
//! ```text
//!  Unresolved ──retrieve ok──────────────────────▶ Resolved(Retrieved)
//!      │
//!      ├──not found / no cached id──▶ Creating ──▶ Resolved(Created)
//!      │                                 │
//!      └──other failure──▶ Failed ◀──────┘
//! ```
//!
//! A resolved id is written to the env file before the resolved handle is
//! returned. Nothing here ever deletes a remote resource.

use std::fmt;
use std::future::Future;

use docbot_client::{Assistant, CreateAssistantRequest, Thread, VectorStore};
use docbot_config::{EnvKey, EnvStore};

use crate::error::{Error, Result};
use crate::instrument::{RetryPolicy, timed, with_retry};
use crate::service::SharedService;

/// The remote resources whose ids are cached locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Assistant,
    Thread,
    VectorStore,
}

impl ResourceKind {
    /// The env file key that caches this resource's id.
    pub fn env_key(&self) -> EnvKey {
        match self {
            ResourceKind::Assistant => EnvKey::AssistantId,
            ResourceKind::Thread => EnvKey::ThreadId,
            ResourceKind::VectorStore => EnvKey::VectorStoreId,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Assistant => "assistant",
            ResourceKind::Thread => "thread",
            ResourceKind::VectorStore => "vector store",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a resource was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The cached id still exists remotely.
    Retrieved,
    /// A new resource was created.
    Created,
}

/// Reconciliation state of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    Unresolved,
    Creating,
    Resolved(Resolution),
    Failed,
}

impl ReconcileState {
    /// Whether no further transition is possible.
    pub fn is_final(&self) -> bool {
        matches!(self, ReconcileState::Resolved(_) | ReconcileState::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: ReconcileState) -> bool {
        use ReconcileState::*;
        matches!(
            (self, next),
            (Unresolved, Resolved(Resolution::Retrieved))
                | (Unresolved, Creating)
                | (Unresolved, Failed)
                | (Creating, Resolved(Resolution::Created))
                | (Creating, Failed)
        )
    }
}

/// A resolved resource and how it was obtained.
#[derive(Debug, Clone)]
pub struct Reconciled<T> {
    pub resource: T,
    pub resolution: Resolution,
}

impl<T> Reconciled<T> {
    pub fn was_created(&self) -> bool {
        self.resolution == Resolution::Created
    }
}

/// Tracks and logs the state of one reconciliation.
struct Progress {
    kind: ResourceKind,
    state: ReconcileState,
}

impl Progress {
    fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            state: ReconcileState::Unresolved,
        }
    }

    fn advance(&mut self, next: ReconcileState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(kind = %self.kind, from = ?self.state, to = ?next, "reconcile transition");
        self.state = next;
    }
}

/// Resolves cached ids against the remote service, creating replacements.
pub struct Reconciler {
    service: SharedService,
    store: EnvStore,
    retry: RetryPolicy,
}

impl Reconciler {
    pub fn new(service: SharedService, store: EnvStore) -> Self {
        Self {
            service,
            store,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy used for lookups.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolve the assistant.
    ///
    /// `params` is only called when a new assistant must be created.
    pub async fn assistant<P>(&self, cached: Option<&str>, params: P) -> Result<Reconciled<Assistant>>
    where
        P: FnOnce() -> Result<CreateAssistantRequest>,
    {
        let kind = ResourceKind::Assistant;
        let mut progress = Progress::new(kind);

        if let Some(id) = usable(cached) {
            let found = self
                .lookup(&mut progress, id, || self.service.retrieve_assistant(id))
                .await?;
            if let Some(assistant) = found {
                tracing::info!(id = %assistant.id, name = assistant.display_name(), "Using existing assistant");
                return self.finish(progress, cached, assistant, |a| &a.id);
            }
        }

        progress.advance(ReconcileState::Creating);
        let request = params().inspect_err(|_| progress.advance(ReconcileState::Failed))?;
        let assistant = self
            .create(&mut progress, self.service.create_assistant(&request))
            .await?;
        tracing::info!(id = %assistant.id, name = assistant.display_name(), model = %assistant.model, "Created assistant");
        self.finish(progress, cached, assistant, |a| &a.id)
    }

    /// Resolve the conversation thread.
    pub async fn thread(&self, cached: Option<&str>) -> Result<Reconciled<Thread>> {
        let kind = ResourceKind::Thread;
        let mut progress = Progress::new(kind);

        if let Some(id) = usable(cached) {
            let found = self
                .lookup(&mut progress, id, || self.service.retrieve_thread(id))
                .await?;
            if let Some(thread) = found {
                tracing::info!(id = %thread.id, "Using existing thread");
                return self.finish(progress, cached, thread, |t| &t.id);
            }
        }

        progress.advance(ReconcileState::Creating);
        let thread = self
            .create(&mut progress, self.service.create_thread())
            .await?;
        tracing::info!(id = %thread.id, "Created thread");
        self.finish(progress, cached, thread, |t| &t.id)
    }

    /// Resolve the vector store.
    ///
    /// `name` is only called when a new store must be created.
    pub async fn vector_store<N>(
        &self,
        cached: Option<&str>,
        name: N,
    ) -> Result<Reconciled<VectorStore>>
    where
        N: FnOnce() -> Result<Option<String>>,
    {
        let kind = ResourceKind::VectorStore;
        let mut progress = Progress::new(kind);

        if let Some(id) = usable(cached) {
            let found = self
                .lookup(&mut progress, id, || self.service.retrieve_vector_store(id))
                .await?;
            if let Some(store) = found {
                tracing::info!(id = %store.id, name = store.display_name(), "Using existing vector store");
                return self.finish(progress, cached, store, |s| &s.id);
            }
        }

        progress.advance(ReconcileState::Creating);
        let name = name().inspect_err(|_| progress.advance(ReconcileState::Failed))?;
        let store = self
            .create(
                &mut progress,
                self.service.create_vector_store(name.as_deref()),
            )
            .await?;
        tracing::info!(id = %store.id, name = store.display_name(), "Created vector store");
        self.finish(progress, cached, store, |s| &s.id)
    }

    /// Look up a cached id. `Ok(None)` means it no longer exists remotely.
    async fn lookup<T, F, Fut>(
        &self,
        progress: &mut Progress,
        id: &str,
        retrieve: F,
    ) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = docbot_client::Result<T>>,
    {
        match with_retry(self.retry, "retrieve", retrieve).await {
            Ok(resource) => Ok(Some(resource)),
            Err(e) if e.is_not_found() => {
                tracing::info!(kind = %progress.kind, id, "Cached id not found remotely, creating a new one");
                Ok(None)
            }
            Err(source) => {
                tracing::error!(kind = %progress.kind, id, error = %source, "Lookup failed");
                progress.advance(ReconcileState::Failed);
                Err(Error::Retrieve {
                    kind: progress.kind,
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    async fn create<T, Fut>(&self, progress: &mut Progress, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = docbot_client::Result<T>>,
    {
        timed("create", fut).await.map_err(|source| {
            tracing::error!(kind = %progress.kind, error = %source, "Create failed");
            progress.advance(ReconcileState::Failed);
            Error::Create {
                kind: progress.kind,
                source,
            }
        })
    }

    /// Persist the resolved id and return the handle.
    fn finish<T>(
        &self,
        mut progress: Progress,
        cached: Option<&str>,
        resource: T,
        id_of: impl Fn(&T) -> &String,
    ) -> Result<Reconciled<T>> {
        let resolution = match progress.state {
            ReconcileState::Creating => Resolution::Created,
            _ => Resolution::Retrieved,
        };

        let id = id_of(&resource);
        if cached != Some(id.as_str()) {
            if let Err(e) = self.store.update([(progress.kind.env_key(), id.as_str())]) {
                progress.advance(ReconcileState::Failed);
                return Err(e.into());
            }
            tracing::debug!(kind = %progress.kind, id = %id, path = %self.store.path().display(), "Persisted id");
        }

        progress.advance(ReconcileState::Resolved(resolution));
        Ok(Reconciled {
            resource,
            resolution,
        })
    }
}

/// A cached id worth looking up.
fn usable(cached: Option<&str>) -> Option<&str> {
    cached.map(str::trim).filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use docbot_client::{Error as ClientError, Tool};
    use docbot_config::EnvFile;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::{Call, MockService, Op};

    const ENV: &str = "OPENAI_API_KEY=\"sk-test\"\n# cached ids\nASSISTANT_ID=\"asst_X\"\nTHREAD_ID=thread_1\nVECTOR_STORE_ID=\"\"\nDEFAULT_MODEL=\"gpt-4o-mini\"\n";

    fn setup(mock: MockService) -> (TempDir, Arc<MockService>, Reconciler) {
        let dir = TempDir::new().unwrap();
        let store = EnvStore::new(dir.path().join(".env"));
        std::fs::write(store.path(), ENV).unwrap();
        let mock = Arc::new(mock);
        let reconciler = Reconciler::new(mock.clone(), store).with_retry_policy(RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(10),
        });
        (dir, mock, reconciler)
    }

    fn doc_bot() -> Result<CreateAssistantRequest> {
        Ok(CreateAssistantRequest {
            model: "gpt-4o-mini".to_string(),
            name: Some("Doc Bot".to_string()),
            instructions: Some("Answer from the documents.".to_string()),
            tools: vec![Tool::file_search()],
            tool_resources: None,
        })
    }

    fn env_text(reconciler: &Reconciler) -> String {
        std::fs::read_to_string(reconciler.store.path()).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        use ReconcileState::*;
        assert!(Unresolved.can_advance_to(Creating));
        assert!(Unresolved.can_advance_to(Resolved(Resolution::Retrieved)));
        assert!(Creating.can_advance_to(Resolved(Resolution::Created)));
        assert!(Creating.can_advance_to(Failed));
        assert!(!Creating.can_advance_to(Resolved(Resolution::Retrieved)));
        assert!(!Failed.can_advance_to(Creating));
        assert!(!Resolved(Resolution::Created).can_advance_to(Creating));
        assert!(Failed.is_final());
        assert!(!Creating.is_final());
    }

    #[tokio::test]
    async fn test_existing_assistant_is_reused() {
        let (_dir, mock, reconciler) =
            setup(MockService::new().with_assistant("asst_X", "Doc Bot", "gpt-4o-mini"));

        let resolved = reconciler
            .assistant(Some("asst_X"), || panic!("no create expected"))
            .await
            .unwrap();

        assert_eq!(resolved.resolution, Resolution::Retrieved);
        assert_eq!(resolved.resource.id, "asst_X");
        assert_eq!(mock.count(|c| matches!(c, Call::CreateAssistant { .. })), 0);
        assert_eq!(env_text(&reconciler), ENV);
    }

    #[tokio::test]
    async fn test_missing_assistant_is_created_once_and_persisted() {
        let (_dir, mock, reconciler) = setup(MockService::new());

        let resolved = reconciler.assistant(Some("asst_X"), doc_bot).await.unwrap();

        assert!(resolved.was_created());
        assert_eq!(resolved.resource.name.as_deref(), Some("Doc Bot"));
        assert_eq!(resolved.resource.model, "gpt-4o-mini");
        assert_eq!(
            mock.calls(),
            vec![
                Call::RetrieveAssistant("asst_X".to_string()),
                Call::CreateAssistant {
                    name: Some("Doc Bot".to_string()),
                    model: "gpt-4o-mini".to_string(),
                },
            ]
        );

        let new_id = &resolved.resource.id;
        assert_ne!(new_id, "asst_X");
        let expected = ENV.replace("ASSISTANT_ID=\"asst_X\"", &format!("ASSISTANT_ID=\"{}\"", new_id));
        assert_eq!(env_text(&reconciler), expected);
    }

    #[tokio::test]
    async fn test_invalid_id_counts_as_not_found() {
        let (_dir, mock, reconciler) = setup(MockService::new());
        mock.fail_next(
            Op::RetrieveThread,
            ClientError::Api {
                status: 400,
                code: "invalid_request_error".to_string(),
                message: "Invalid 'thread_id': 'thread_1'.".to_string(),
            },
        );

        let resolved = reconciler.thread(Some("thread_1")).await.unwrap();

        assert!(resolved.was_created());
        assert_eq!(mock.count(|c| matches!(c, Call::CreateThread)), 1);
        let file = EnvFile::parse(&env_text(&reconciler));
        assert_eq!(file.value(EnvKey::ThreadId), Some(resolved.resource.id.as_str()));
    }

    #[tokio::test]
    async fn test_other_bad_request_fails_without_create() {
        let (_dir, mock, reconciler) = setup(MockService::new().with_thread("thread_1"));
        mock.fail_next(
            Op::RetrieveThread,
            ClientError::Api {
                status: 400,
                code: "invalid_request_error".to_string(),
                message: "Invalid request: the body could not be parsed.".to_string(),
            },
        );

        let err = reconciler.thread(Some("thread_1")).await.unwrap_err();

        assert!(matches!(err, Error::Retrieve { kind: ResourceKind::Thread, .. }));
        assert_eq!(mock.count(|c| matches!(c, Call::CreateThread)), 0);
        assert_eq!(env_text(&reconciler), ENV);
    }

    #[tokio::test]
    async fn test_empty_cached_id_skips_lookup() {
        let (_dir, mock, reconciler) = setup(MockService::new());

        let resolved = reconciler
            .vector_store(Some(""), || Ok(Some("Docs".to_string())))
            .await
            .unwrap();

        assert!(resolved.was_created());
        assert_eq!(
            mock.calls(),
            vec![Call::CreateVectorStore(Some("Docs".to_string()))]
        );
        let file = EnvFile::parse(&env_text(&reconciler));
        assert_eq!(
            file.value(EnvKey::VectorStoreId),
            Some(resolved.resource.id.as_str())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried_then_resolves() {
        let (_dir, mock, reconciler) = setup(MockService::new().with_thread("thread_1"));
        mock.fail_next(
            Op::RetrieveThread,
            ClientError::Api {
                status: 502,
                code: "server_error".to_string(),
                message: "bad gateway".to_string(),
            },
        );

        let resolved = reconciler.thread(Some("thread_1")).await.unwrap();

        assert_eq!(resolved.resolution, Resolution::Retrieved);
        assert_eq!(mock.count(|c| matches!(c, Call::RetrieveThread(_))), 2);
        assert_eq!(mock.count(|c| matches!(c, Call::CreateThread)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_transient_failure_fails_without_create() {
        let (_dir, mock, reconciler) = setup(MockService::new().with_thread("thread_1"));
        for _ in 0..3 {
            mock.fail_next(
                Op::RetrieveThread,
                ClientError::Api {
                    status: 429,
                    code: "rate_limit_exceeded".to_string(),
                    message: "slow down".to_string(),
                },
            );
        }

        let err = reconciler.thread(Some("thread_1")).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Retrieve { kind: ResourceKind::Thread, ref id, .. } if id == "thread_1"
        ));
        assert_eq!(mock.count(|c| matches!(c, Call::RetrieveThread(_))), 3);
        assert_eq!(mock.count(|c| matches!(c, Call::CreateThread)), 0);
        assert_eq!(env_text(&reconciler), ENV);
    }

    #[tokio::test]
    async fn test_auth_failure_fails_without_create() {
        let (_dir, mock, reconciler) = setup(MockService::new());
        mock.fail_next(
            Op::RetrieveAssistant,
            ClientError::Auth("Incorrect API key provided".to_string()),
        );

        let err = reconciler
            .assistant(Some("asst_X"), doc_bot)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Retrieve { kind: ResourceKind::Assistant, .. }));
        assert_eq!(mock.count(|c| matches!(c, Call::CreateAssistant { .. })), 0);
    }

    #[tokio::test]
    async fn test_create_failure_is_surfaced() {
        let (_dir, mock, reconciler) = setup(MockService::new());
        mock.fail_next(
            Op::CreateThread,
            ClientError::Api {
                status: 500,
                code: "server_error".to_string(),
                message: "boom".to_string(),
            },
        );

        let err = reconciler.thread(None).await.unwrap_err();

        assert!(matches!(err, Error::Create { kind: ResourceKind::Thread, .. }));
        assert_eq!(mock.count(|c| matches!(c, Call::CreateThread)), 1);
        assert_eq!(env_text(&reconciler), ENV);
    }

    #[tokio::test]
    async fn test_params_error_aborts_creation() {
        let (_dir, mock, reconciler) = setup(MockService::new());

        let err = reconciler
            .assistant(None, || Err(Error::Input("cancelled".to_string())))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Input(_)));
        assert!(mock.calls().is_empty());
    }
}
