//! The remote operations the session layer depends on.
//!
//! [`AssistantService`] is the seam between the local state machine and the
//! vendor API. The production implementation forwards to
//! [`AssistantsClient`]; tests use [`crate::mock::MockService`].

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use docbot_client::{
    Assistant, AssistantsClient, CreateAssistantRequest, DeletionStatus, FileBatch, FileObject,
    ListMessagesQuery, Message, Model, Result, Run, Thread, UpdateAssistantRequest, VectorStore,
};

/// Remote operations used by reconciliation, polling and the chat loop.
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// List models available to the configured key.
    async fn list_models(&self) -> Result<Vec<Model>>;

    async fn retrieve_assistant(&self, id: &str) -> Result<Assistant>;
    async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant>;
    async fn update_assistant(
        &self,
        id: &str,
        request: &UpdateAssistantRequest,
    ) -> Result<Assistant>;

    async fn retrieve_thread(&self, id: &str) -> Result<Thread>;
    async fn create_thread(&self) -> Result<Thread>;

    async fn retrieve_vector_store(&self, id: &str) -> Result<VectorStore>;
    async fn create_vector_store(&self, name: Option<&str>) -> Result<VectorStore>;

    /// Append a user message.
    async fn create_message(&self, thread_id: &str, content: &str) -> Result<Message>;
    /// Every message in the thread, oldest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>>;
    /// Up to `limit` messages, newest first.
    async fn recent_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<Message>>;
    async fn delete_message(&self, thread_id: &str, message_id: &str) -> Result<DeletionStatus>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    async fn list_files(&self) -> Result<Vec<FileObject>>;
    async fn upload_file(&self, path: &Path) -> Result<FileObject>;
    async fn create_file_batch(
        &self,
        vector_store_id: &str,
        file_ids: Vec<String>,
    ) -> Result<FileBatch>;
    async fn retrieve_file_batch(&self, vector_store_id: &str, batch_id: &str)
    -> Result<FileBatch>;
}

/// A service that can be shared across the session.
pub type SharedService = Arc<dyn AssistantService>;

#[async_trait]
impl AssistantService for AssistantsClient {
    async fn list_models(&self) -> Result<Vec<Model>> {
        self.models().list().await
    }

    async fn retrieve_assistant(&self, id: &str) -> Result<Assistant> {
        self.assistants().retrieve(id).await
    }

    async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant> {
        self.assistants().create(request).await
    }

    async fn update_assistant(
        &self,
        id: &str,
        request: &UpdateAssistantRequest,
    ) -> Result<Assistant> {
        self.assistants().update(id, request).await
    }

    async fn retrieve_thread(&self, id: &str) -> Result<Thread> {
        self.threads().retrieve(id).await
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.threads().create().await
    }

    async fn retrieve_vector_store(&self, id: &str) -> Result<VectorStore> {
        self.vector_stores().retrieve(id).await
    }

    async fn create_vector_store(&self, name: Option<&str>) -> Result<VectorStore> {
        self.vector_stores().create(name).await
    }

    async fn create_message(&self, thread_id: &str, content: &str) -> Result<Message> {
        self.messages().create(thread_id, content).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        self.messages().list_all(thread_id).await
    }

    async fn recent_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<Message>> {
        let query = ListMessagesQuery {
            order: Some("desc".to_string()),
            limit: Some(limit),
            after: None,
        };
        Ok(self.messages().list_with_query(thread_id, &query).await?.data)
    }

    async fn delete_message(&self, thread_id: &str, message_id: &str) -> Result<DeletionStatus> {
        self.messages().delete(thread_id, message_id).await
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        self.runs().create(thread_id, assistant_id).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.runs().retrieve(thread_id, run_id).await
    }

    async fn list_files(&self) -> Result<Vec<FileObject>> {
        self.files().list().await
    }

    async fn upload_file(&self, path: &Path) -> Result<FileObject> {
        self.files().upload(path).await
    }

    async fn create_file_batch(
        &self,
        vector_store_id: &str,
        file_ids: Vec<String>,
    ) -> Result<FileBatch> {
        self.vector_stores()
            .create_file_batch(vector_store_id, file_ids)
            .await
    }

    async fn retrieve_file_batch(
        &self,
        vector_store_id: &str,
        batch_id: &str,
    ) -> Result<FileBatch> {
        self.vector_stores()
            .retrieve_file_batch(vector_store_id, batch_id)
            .await
    }
}
