//! Messages API.

use crate::client::AssistantsClient;
use crate::error::Result;
use crate::types::{CreateMessageRequest, DeletionStatus, ListResponse, Message, Role};

/// Maximum page size the API accepts.
const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for listing messages.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct ListMessagesQuery {
    /// `asc` or `desc` by creation time (server default: `desc`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Page size, 1 to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Cursor: return messages after this message ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// Messages API client.
pub struct MessagesApi {
    client: AssistantsClient,
}

impl MessagesApi {
    pub(crate) fn new(client: AssistantsClient) -> Self {
        Self { client }
    }

    /// Append a user message to a thread.
    pub async fn create(&self, thread_id: &str, content: impl Into<String>) -> Result<Message> {
        let request = CreateMessageRequest {
            role: Role::User,
            content: content.into(),
        };
        self.client
            .post(&format!("threads/{}/messages", thread_id), &request)
            .await
    }

    /// List one page of messages.
    pub async fn list_with_query(
        &self,
        thread_id: &str,
        query: &ListMessagesQuery,
    ) -> Result<ListResponse<Message>> {
        self.client
            .get_with_query(&format!("threads/{}/messages", thread_id), query)
            .await
    }

    /// List every message in the thread, oldest first.
    pub async fn list_all(&self, thread_id: &str) -> Result<Vec<Message>> {
        let mut query = ListMessagesQuery {
            order: Some("asc".to_string()),
            limit: Some(MAX_PAGE_SIZE),
            after: None,
        };
        let mut messages = Vec::new();

        loop {
            let page = self.list_with_query(thread_id, &query).await?;
            let has_more = page.has_more;
            let last_id = page.last_id.clone().or_else(|| page.data.last().map(|m| m.id.clone()));
            messages.extend(page.data);

            match last_id {
                Some(id) if has_more => query.after = Some(id),
                _ => break,
            }
        }

        Ok(messages)
    }

    /// Delete a message.
    pub async fn delete(&self, thread_id: &str, message_id: &str) -> Result<DeletionStatus> {
        self.client
            .delete(&format!("threads/{}/messages/{}", thread_id, message_id))
            .await
    }
}
