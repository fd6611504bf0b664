//! Vector stores API.

use crate::client::AssistantsClient;
use crate::error::Result;
use crate::types::{
    CreateFileBatchRequest, CreateVectorStoreRequest, DeletionStatus, FileBatch, ListResponse,
    VectorStore, VectorStoreFile,
};

/// Vector stores API client.
pub struct VectorStoresApi {
    client: AssistantsClient,
}

impl VectorStoresApi {
    pub(crate) fn new(client: AssistantsClient) -> Self {
        Self { client }
    }

    /// List vector stores (first page).
    pub async fn list(&self) -> Result<ListResponse<VectorStore>> {
        self.client.get("vector_stores").await
    }

    /// Get a vector store by ID.
    pub async fn retrieve(&self, id: &str) -> Result<VectorStore> {
        self.client.get(&format!("vector_stores/{}", id)).await
    }

    /// Create a vector store.
    pub async fn create(&self, name: Option<&str>) -> Result<VectorStore> {
        let request = CreateVectorStoreRequest {
            name: name.map(str::to_string),
        };
        self.client.post("vector_stores", &request).await
    }

    /// Delete a vector store. Uploaded files are not deleted.
    pub async fn delete(&self, id: &str) -> Result<DeletionStatus> {
        self.client.delete(&format!("vector_stores/{}", id)).await
    }

    /// List files attached to a vector store.
    pub async fn files(&self, id: &str) -> Result<ListResponse<VectorStoreFile>> {
        self.client
            .get(&format!("vector_stores/{}/files", id))
            .await
    }

    /// Attach already-uploaded files in one batch.
    pub async fn create_file_batch(&self, id: &str, file_ids: Vec<String>) -> Result<FileBatch> {
        let request = CreateFileBatchRequest { file_ids };
        self.client
            .post(&format!("vector_stores/{}/file_batches", id), &request)
            .await
    }

    /// Get the state of a file batch.
    pub async fn retrieve_file_batch(&self, id: &str, batch_id: &str) -> Result<FileBatch> {
        self.client
            .get(&format!("vector_stores/{}/file_batches/{}", id, batch_id))
            .await
    }
}
