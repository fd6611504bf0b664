//! Assistants API.

use crate::client::AssistantsClient;
use crate::error::Result;
use crate::types::{Assistant, CreateAssistantRequest, ListResponse, UpdateAssistantRequest};

/// Assistants API client.
pub struct AssistantsApi {
    client: AssistantsClient,
}

impl AssistantsApi {
    pub(crate) fn new(client: AssistantsClient) -> Self {
        Self { client }
    }

    /// List assistants (first page).
    pub async fn list(&self) -> Result<ListResponse<Assistant>> {
        self.client.get("assistants").await
    }

    /// Get an assistant by ID.
    pub async fn retrieve(&self, id: &str) -> Result<Assistant> {
        self.client.get(&format!("assistants/{}", id)).await
    }

    /// Create a new assistant.
    pub async fn create(&self, request: &CreateAssistantRequest) -> Result<Assistant> {
        self.client.post("assistants", request).await
    }

    /// Modify an assistant.
    pub async fn update(&self, id: &str, request: &UpdateAssistantRequest) -> Result<Assistant> {
        self.client.post(&format!("assistants/{}", id), request).await
    }
}
