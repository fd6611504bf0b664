//! In-memory [`AssistantService`] for tests.
//!
//! Holds a small fake of the remote state, records every call, and replays
//! scripted run statuses and injected failures.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use docbot_client::{
    Assistant, BatchStatus, CreateAssistantRequest, DeletionStatus, Error, FileBatch, FileCounts,
    FileObject, Message, MessageContent, Model, Result, Role, Run, RunStatus, TextContent, Thread,
    UpdateAssistantRequest, VectorStore,
};

use crate::service::AssistantService;

/// Operations that can be made to fail with [`MockService::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListModels,
    RetrieveAssistant,
    CreateAssistant,
    UpdateAssistant,
    RetrieveThread,
    CreateThread,
    RetrieveVectorStore,
    CreateVectorStore,
    CreateMessage,
    ListMessages,
    DeleteMessage,
    CreateRun,
    RetrieveRun,
    UploadFile,
    CreateFileBatch,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListModels,
    RetrieveAssistant(String),
    CreateAssistant { name: Option<String>, model: String },
    UpdateAssistant(String),
    RetrieveThread(String),
    CreateThread,
    RetrieveVectorStore(String),
    CreateVectorStore(Option<String>),
    CreateMessage(String),
    ListMessages,
    RecentMessages,
    DeleteMessage(String),
    CreateRun { thread_id: String, assistant_id: String },
    RetrieveRun(String),
    ListFiles,
    UploadFile(PathBuf),
    CreateFileBatch(Vec<String>),
    RetrieveFileBatch(String),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    failures: HashMap<Op, VecDeque<Error>>,
    next_id: u32,
    models: Vec<Model>,
    assistants: HashMap<String, Assistant>,
    threads: HashSet<String>,
    vector_stores: HashMap<String, VectorStore>,
    messages: Vec<Message>,
    files: Vec<FileObject>,
    runs: HashMap<String, Run>,
    run_script: VecDeque<RunStatus>,
    reply: Option<String>,
    batch_script: VecDeque<BatchStatus>,
    batches: HashMap<String, FileBatch>,
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_mock{}", prefix, self.next_id)
    }

    fn fail(&mut self, op: Op) -> Result<()> {
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Scripted in-memory assistant service.
#[derive(Default)]
pub struct MockService {
    state: Mutex<State>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing assistant.
    pub fn with_assistant(self, id: &str, name: &str, model: &str) -> Self {
        self.state.lock().unwrap().assistants.insert(
            id.to_string(),
            Assistant {
                id: id.to_string(),
                name: Some(name.to_string()),
                model: model.to_string(),
                instructions: None,
                tools: Vec::new(),
                tool_resources: None,
                created_at: 0,
            },
        );
        self
    }

    /// Seed an existing thread.
    pub fn with_thread(self, id: &str) -> Self {
        self.state.lock().unwrap().threads.insert(id.to_string());
        self
    }

    /// Seed an existing vector store.
    pub fn with_vector_store(self, id: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .vector_stores
            .insert(id.to_string(), vector_store(id, Some(name)));
        self
    }

    /// Seed the model list.
    pub fn with_models(self, ids: &[&str]) -> Self {
        self.state.lock().unwrap().models = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Model {
                id: id.to_string(),
                created: 1_700_000_000 + i as i64,
                owned_by: "system".to_string(),
            })
            .collect();
        self
    }

    /// Seed a message in `thread_id`.
    pub fn with_message(self, thread_id: &str, role: Role, text: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.id("msg");
            state.messages.push(message(&id, thread_id, role, text, None));
        }
        self
    }

    /// Statuses returned by successive `retrieve_run` calls.
    ///
    /// The last status repeats once the script runs out.
    pub fn with_run_script(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        self.state.lock().unwrap().run_script = statuses.into_iter().collect();
        self
    }

    /// Text of the assistant message posted when a run completes.
    pub fn with_reply(self, text: &str) -> Self {
        self.state.lock().unwrap().reply = Some(text.to_string());
        self
    }

    /// Statuses returned by successive `retrieve_file_batch` calls.
    pub fn with_batch_script(self, statuses: impl IntoIterator<Item = BatchStatus>) -> Self {
        self.state.lock().unwrap().batch_script = statuses.into_iter().collect();
        self
    }

    /// Make the next call of `op` fail with `error`. Failures queue up.
    pub fn fail_next(&self, op: Op, error: Error) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    /// Messages currently stored for `thread_id`, oldest first.
    pub fn messages(&self, thread_id: &str) -> Vec<Message> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.thread_id == thread_id)
            .cloned()
            .collect()
    }

    /// Current remote copy of an assistant.
    pub fn assistant(&self, id: &str) -> Option<Assistant> {
        self.state.lock().unwrap().assistants.get(id).cloned()
    }
}

fn vector_store(id: &str, name: Option<&str>) -> VectorStore {
    VectorStore {
        id: id.to_string(),
        name: name.map(str::to_string),
        status: "completed".to_string(),
        file_counts: FileCounts::default(),
        usage_bytes: 0,
        created_at: 0,
    }
}

fn message(id: &str, thread_id: &str, role: Role, text: &str, run_id: Option<&str>) -> Message {
    Message {
        id: id.to_string(),
        thread_id: thread_id.to_string(),
        role,
        content: vec![MessageContent {
            kind: "text".to_string(),
            text: Some(TextContent {
                value: text.to_string(),
            }),
        }],
        run_id: run_id.map(str::to_string),
        created_at: 0,
    }
}

fn not_found(what: &str, id: &str) -> Error {
    Error::NotFound(format!("No {} found with id '{}'.", what, id))
}

#[async_trait]
impl AssistantService for MockService {
    async fn list_models(&self) -> Result<Vec<Model>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListModels);
        state.fail(Op::ListModels)?;
        Ok(state.models.clone())
    }

    async fn retrieve_assistant(&self, id: &str) -> Result<Assistant> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RetrieveAssistant(id.to_string()));
        state.fail(Op::RetrieveAssistant)?;
        state
            .assistants
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("assistant", id))
    }

    async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateAssistant {
            name: request.name.clone(),
            model: request.model.clone(),
        });
        state.fail(Op::CreateAssistant)?;
        let id = state.id("asst");
        let assistant = Assistant {
            id: id.clone(),
            name: request.name.clone(),
            model: request.model.clone(),
            instructions: request.instructions.clone(),
            tools: request.tools.clone(),
            tool_resources: request.tool_resources.clone(),
            created_at: 0,
        };
        state.assistants.insert(id, assistant.clone());
        Ok(assistant)
    }

    async fn update_assistant(
        &self,
        id: &str,
        request: &UpdateAssistantRequest,
    ) -> Result<Assistant> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UpdateAssistant(id.to_string()));
        state.fail(Op::UpdateAssistant)?;
        let assistant = state
            .assistants
            .get_mut(id)
            .ok_or_else(|| not_found("assistant", id))?;
        if let Some(model) = &request.model {
            assistant.model = model.clone();
        }
        if let Some(instructions) = &request.instructions {
            assistant.instructions = Some(instructions.clone());
        }
        if let Some(tools) = &request.tools {
            assistant.tools = tools.clone();
        }
        if let Some(resources) = &request.tool_resources {
            assistant.tool_resources = Some(resources.clone());
        }
        Ok(assistant.clone())
    }

    async fn retrieve_thread(&self, id: &str) -> Result<Thread> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RetrieveThread(id.to_string()));
        state.fail(Op::RetrieveThread)?;
        if state.threads.contains(id) {
            Ok(Thread {
                id: id.to_string(),
                created_at: 0,
            })
        } else {
            Err(not_found("thread", id))
        }
    }

    async fn create_thread(&self) -> Result<Thread> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateThread);
        state.fail(Op::CreateThread)?;
        let id = state.id("thread");
        state.threads.insert(id.clone());
        Ok(Thread { id, created_at: 0 })
    }

    async fn retrieve_vector_store(&self, id: &str) -> Result<VectorStore> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RetrieveVectorStore(id.to_string()));
        state.fail(Op::RetrieveVectorStore)?;
        state
            .vector_stores
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("vector store", id))
    }

    async fn create_vector_store(&self, name: Option<&str>) -> Result<VectorStore> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::CreateVectorStore(name.map(str::to_string)));
        state.fail(Op::CreateVectorStore)?;
        let id = state.id("vs");
        let store = vector_store(&id, name);
        state.vector_stores.insert(id, store.clone());
        Ok(store)
    }

    async fn create_message(&self, thread_id: &str, content: &str) -> Result<Message> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateMessage(content.to_string()));
        state.fail(Op::CreateMessage)?;
        let id = state.id("msg");
        let msg = message(&id, thread_id, Role::User, content, None);
        state.messages.push(msg.clone());
        Ok(msg)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListMessages);
        state.fail(Op::ListMessages)?;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.thread_id == thread_id)
            .cloned()
            .collect())
    }

    async fn recent_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<Message>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RecentMessages);
        state.fail(Op::ListMessages)?;
        Ok(state
            .messages
            .iter()
            .rev()
            .filter(|m| m.thread_id == thread_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete_message(&self, thread_id: &str, message_id: &str) -> Result<DeletionStatus> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteMessage(message_id.to_string()));
        state.fail(Op::DeleteMessage)?;
        let before = state.messages.len();
        state
            .messages
            .retain(|m| !(m.thread_id == thread_id && m.id == message_id));
        Ok(DeletionStatus {
            id: message_id.to_string(),
            deleted: state.messages.len() < before,
        })
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateRun {
            thread_id: thread_id.to_string(),
            assistant_id: assistant_id.to_string(),
        });
        state.fail(Op::CreateRun)?;
        let id = state.id("run");
        let run = Run {
            id: id.clone(),
            thread_id: thread_id.to_string(),
            assistant_id: assistant_id.to_string(),
            status: RunStatus::Queued,
            created_at: 0,
            completed_at: None,
            last_error: None,
            incomplete_details: None,
        };
        state.runs.insert(id, run.clone());
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RetrieveRun(run_id.to_string()));
        state.fail(Op::RetrieveRun)?;

        let previous = state
            .runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| not_found("run", run_id))?;

        let status = if state.run_script.len() > 1 {
            state.run_script.pop_front().unwrap_or(previous.status)
        } else {
            state.run_script.front().copied().unwrap_or(previous.status)
        };

        if status == RunStatus::Completed && previous.status != RunStatus::Completed {
            if let Some(reply) = state.reply.clone() {
                let id = state.id("msg");
                state.messages.push(message(
                    &id,
                    thread_id,
                    Role::Assistant,
                    &reply,
                    Some(run_id),
                ));
            }
        }

        let run = Run {
            status,
            completed_at: (status == RunStatus::Completed).then_some(1),
            ..previous
        };
        state.runs.insert(run_id.to_string(), run.clone());
        Ok(run)
    }

    async fn list_files(&self) -> Result<Vec<FileObject>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListFiles);
        Ok(state.files.clone())
    }

    async fn upload_file(&self, path: &Path) -> Result<FileObject> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UploadFile(path.to_path_buf()));
        state.fail(Op::UploadFile)?;
        let id = state.id("file");
        let file = FileObject {
            id,
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes: 0,
            purpose: "assistants".to_string(),
            status: Some("processed".to_string()),
            created_at: 0,
        };
        state.files.push(file.clone());
        Ok(file)
    }

    async fn create_file_batch(
        &self,
        vector_store_id: &str,
        file_ids: Vec<String>,
    ) -> Result<FileBatch> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateFileBatch(file_ids.clone()));
        state.fail(Op::CreateFileBatch)?;
        let id = state.id("vsfb");
        let batch = FileBatch {
            id: id.clone(),
            vector_store_id: vector_store_id.to_string(),
            status: BatchStatus::InProgress,
            file_counts: FileCounts {
                in_progress: file_ids.len() as u64,
                total: file_ids.len() as u64,
                ..Default::default()
            },
        };
        state.batches.insert(id, batch.clone());
        Ok(batch)
    }

    async fn retrieve_file_batch(
        &self,
        _vector_store_id: &str,
        batch_id: &str,
    ) -> Result<FileBatch> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RetrieveFileBatch(batch_id.to_string()));
        let mut batch = state
            .batches
            .get(batch_id)
            .cloned()
            .ok_or_else(|| not_found("file batch", batch_id))?;
        let status = state
            .batch_script
            .pop_front()
            .unwrap_or(BatchStatus::Completed);
        if status == BatchStatus::Completed {
            batch.file_counts.completed = batch.file_counts.total;
            batch.file_counts.in_progress = 0;
        }
        batch.status = status;
        state.batches.insert(batch_id.to_string(), batch.clone());
        Ok(batch)
    }
}
