//! Threads API.

use crate::client::AssistantsClient;
use crate::error::Result;
use crate::types::Thread;

/// Threads API client.
pub struct ThreadsApi {
    client: AssistantsClient,
}

impl ThreadsApi {
    pub(crate) fn new(client: AssistantsClient) -> Self {
        Self { client }
    }

    /// Get a thread by ID.
    pub async fn retrieve(&self, id: &str) -> Result<Thread> {
        self.client.get(&format!("threads/{}", id)).await
    }

    /// Create an empty thread.
    pub async fn create(&self) -> Result<Thread> {
        self.client.post("threads", &serde_json::json!({})).await
    }
}
