//! Files API.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::client::AssistantsClient;
use crate::error::{Error, Result};
use crate::types::{DeletionStatus, FileObject, ListResponse};

/// Purpose tag for files used by assistants and vector stores.
pub const ASSISTANTS_PURPOSE: &str = "assistants";

/// Files API client.
pub struct FilesApi {
    client: AssistantsClient,
}

impl FilesApi {
    pub(crate) fn new(client: AssistantsClient) -> Self {
        Self { client }
    }

    /// List uploaded files.
    pub async fn list(&self) -> Result<Vec<FileObject>> {
        let page: ListResponse<FileObject> = self.client.get("files").await?;
        Ok(page.data)
    }

    /// Upload a local file for use by assistants.
    pub async fn upload(&self, path: &Path) -> Result<FileObject> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let form = Form::new()
            .text("purpose", ASSISTANTS_PURPOSE)
            .part("file", Part::bytes(bytes).file_name(filename));

        self.client.post_multipart("files", form).await
    }

    /// Delete an uploaded file.
    pub async fn delete(&self, file_id: &str) -> Result<DeletionStatus> {
        self.client.delete(&format!("files/{}", file_id)).await
    }
}
