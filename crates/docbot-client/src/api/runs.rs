//! Runs API.

use crate::client::AssistantsClient;
use crate::error::Result;
use crate::types::{CreateRunRequest, ListResponse, Run, Tool};

/// Runs API client.
pub struct RunsApi {
    client: AssistantsClient,
}

impl RunsApi {
    pub(crate) fn new(client: AssistantsClient) -> Self {
        Self { client }
    }

    /// Start a run of `assistant_id` on `thread_id` with `file_search` enabled.
    pub async fn create(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let request = CreateRunRequest {
            assistant_id: assistant_id.to_string(),
            tools: Some(vec![Tool::file_search()]),
        };
        self.client
            .post(&format!("threads/{}/runs", thread_id), &request)
            .await
    }

    /// Get the current state of a run.
    pub async fn retrieve(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.client
            .get(&format!("threads/{}/runs/{}", thread_id, run_id))
            .await
    }

    /// List runs on a thread (first page, newest first).
    pub async fn list(&self, thread_id: &str) -> Result<ListResponse<Run>> {
        self.client.get(&format!("threads/{}/runs", thread_id)).await
    }
}
