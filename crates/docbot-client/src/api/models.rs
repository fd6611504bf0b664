//! Models API.

use crate::client::AssistantsClient;
use crate::error::Result;
use crate::types::{ListResponse, Model};

/// Models API client.
pub struct ModelsApi {
    client: AssistantsClient,
}

impl ModelsApi {
    pub(crate) fn new(client: AssistantsClient) -> Self {
        Self { client }
    }

    /// List the models available to the API key.
    ///
    /// Also the cheapest way to check that a key is accepted.
    pub async fn list(&self) -> Result<Vec<Model>> {
        let page: ListResponse<Model> = self.client.get("models").await?;
        Ok(page.data)
    }
}
