//! Housekeeping on the resolved resources: models, assistant binding,
//! history and cold starts.

use docbot_client::{Assistant, Message, Model, Tool, ToolResources, UpdateAssistantRequest};

use crate::error::Result;
use crate::instrument::timed;
use crate::service::AssistantService;

/// Chat-capable models, in the order the service listed them.
pub fn gpt_models(models: Vec<Model>) -> Vec<Model> {
    models
        .into_iter()
        .filter(|m| m.id.starts_with("gpt"))
        .collect()
}

/// What a line typed at the model picker selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    /// A model from the list (by index or by name).
    Model(String),
    /// Empty input: keep the default.
    Default,
    /// A number outside the list.
    BadIndex(usize),
    /// A name that is not in the list.
    UnknownName(String),
}

/// Interpret `input` against the listed `models`.
pub fn choose_model(models: &[Model], input: &str) -> ModelChoice {
    let input = input.trim();
    if input.is_empty() {
        return ModelChoice::Default;
    }
    if input.bytes().all(|b| b.is_ascii_digit()) {
        return match input.parse::<usize>() {
            Ok(index) if index < models.len() => ModelChoice::Model(models[index].id.clone()),
            Ok(index) => ModelChoice::BadIndex(index),
            Err(_) => ModelChoice::BadIndex(usize::MAX),
        };
    }
    match models.iter().find(|m| m.id == input) {
        Some(model) => ModelChoice::Model(model.id.clone()),
        None => ModelChoice::UnknownName(input.to_string()),
    }
}

/// Attach the vector store to the assistant through `file_search`, and
/// refresh its instructions and model.
pub async fn bind_vector_store(
    service: &dyn AssistantService,
    assistant_id: &str,
    vector_store_id: &str,
    instructions: &str,
    model: Option<&str>,
) -> Result<Assistant> {
    let request = UpdateAssistantRequest {
        model: model.map(str::to_string),
        instructions: Some(instructions.to_string()),
        tools: Some(vec![Tool::file_search()]),
        tool_resources: Some(ToolResources::vector_store(vector_store_id)),
    };
    let assistant = timed(
        "update_assistant",
        service.update_assistant(assistant_id, &request),
    )
    .await?;
    tracing::info!(assistant_id, vector_store_id, model = %assistant.model, "Assistant bound to vector store");
    Ok(assistant)
}

/// Every message in the thread, oldest first.
pub async fn history(service: &dyn AssistantService, thread_id: &str) -> Result<Vec<Message>> {
    Ok(timed("list_messages", service.list_messages(thread_id)).await?)
}

/// Delete every message in the thread. Returns how many were deleted.
pub async fn cold_start(service: &dyn AssistantService, thread_id: &str) -> Result<usize> {
    let messages = history(service, thread_id).await?;
    let mut deleted = 0;
    for message in &messages {
        let status = timed(
            "delete_message",
            service.delete_message(thread_id, &message.id),
        )
        .await?;
        if status.deleted {
            deleted += 1;
        }
    }
    tracing::info!(thread_id, deleted, "Cold start");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use docbot_client::Role;

    use super::*;
    use crate::mock::{Call, MockService};

    fn listed(ids: &[&str]) -> Vec<Model> {
        ids.iter()
            .map(|id| Model {
                id: id.to_string(),
                created: 0,
                owned_by: "system".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_gpt_models_keeps_order() {
        let models = gpt_models(listed(&["whisper-1", "gpt-4o", "dall-e-3", "gpt-4o-mini"]));
        let ids: Vec<_> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gpt-4o", "gpt-4o-mini"]);
    }

    #[test]
    fn test_choose_model() {
        let models = listed(&["gpt-4o", "gpt-4o-mini"]);
        assert_eq!(choose_model(&models, ""), ModelChoice::Default);
        assert_eq!(
            choose_model(&models, "01"),
            ModelChoice::Model("gpt-4o-mini".to_string())
        );
        assert_eq!(
            choose_model(&models, " gpt-4o "),
            ModelChoice::Model("gpt-4o".to_string())
        );
        assert_eq!(choose_model(&models, "2"), ModelChoice::BadIndex(2));
        assert_eq!(
            choose_model(&models, "gpt-5"),
            ModelChoice::UnknownName("gpt-5".to_string())
        );
        assert_eq!(
            choose_model(&models, "-1"),
            ModelChoice::UnknownName("-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_cold_start_deletes_everything() {
        let mock = MockService::new()
            .with_message("thread_1", Role::User, "hi")
            .with_message("thread_1", Role::Assistant, "hello")
            .with_message("thread_2", Role::User, "elsewhere");

        let deleted = cold_start(&mock, "thread_1").await.unwrap();

        assert_eq!(deleted, 2);
        assert!(mock.messages("thread_1").is_empty());
        assert_eq!(mock.messages("thread_2").len(), 1);
    }

    #[tokio::test]
    async fn test_bind_vector_store() {
        let mock = MockService::new().with_assistant("asst_1", "Doc Bot", "gpt-4o");

        let assistant = bind_vector_store(&mock, "asst_1", "vs_1", "Be brief.", Some("gpt-4o-mini"))
            .await
            .unwrap();

        assert_eq!(assistant.model, "gpt-4o-mini");
        assert_eq!(assistant.instructions.as_deref(), Some("Be brief."));
        let ids = assistant
            .tool_resources
            .and_then(|r| r.file_search)
            .map(|f| f.vector_store_ids)
            .unwrap_or_default();
        assert_eq!(ids, vec!["vs_1".to_string()]);
        assert_eq!(mock.calls(), vec![Call::UpdateAssistant("asst_1".to_string())]);
    }
}
