//! The startup flow and chat.

use std::sync::Arc;

use anyhow::Result;
use console::style;
use docbot_client::{CreateAssistantRequest, Tool};
use docbot_config::{EnvKey, EnvStore, load_instructions};
use docbot_session::{
    Error as SessionError, SessionContext, SharedService, bind_vector_store,
    cold_start, gpt_models, history,
};

use super::menu::{self, StartupMode};
use super::repl::Repl;
use super::{Context, listings, models, prompt, setup, uploads};
use crate::exit::Fatal;

/// Name offered when creating a new assistant.
const DEFAULT_ASSISTANT_NAME: &str = "Doc Bot";

/// Run the whole program: setup, then chat until the user leaves.
pub async fn run(ctx: &Context) -> Result<()> {
    let store = EnvStore::new(ctx.env_file.clone());
    if store.ensure_exists()? {
        prompt::print_dim(&format!("Created {}", store.path().display()));
    }
    let instructions = load_instructions(&ctx.instructions)?;

    let connection = setup::connect(ctx, &store, setup::prompt_for_key).await?;
    let chat_models = gpt_models(connection.models);
    let service: SharedService = Arc::new(connection.client);
    let session = SessionContext::new(service.clone(), store.clone()).with_poll_policy(ctx.poll);

    let mode = menu::choose()?;
    let env = store.load()?;
    let cached = |key: EnvKey| {
        if mode.reuses_cache() {
            env.value(key)
        } else {
            None
        }
    };

    let mut default_model = env
        .value(EnvKey::DefaultModel)
        .unwrap_or(models::FALLBACK_MODEL)
        .to_string();
    let mut picked_model = None;
    if mode == StartupMode::ChangeDefaults {
        default_model = models::pick(&chat_models, &default_model)?;
        store.update([(EnvKey::DefaultModel, default_model.as_str())])?;
        picked_model = Some(default_model.clone());
    }

    let reconciler = session.reconciler();
    let assistant = reconciler
        .assistant(cached(EnvKey::AssistantId), || {
            new_assistant(&instructions, picked_model, prompt::ask, || {
                models::pick(&chat_models, &default_model)
            })
            .map_err(|e| SessionError::Input(format!("{:#}", e)))
        })
        .await?;
    let vector_store = reconciler
        .vector_store(cached(EnvKey::VectorStoreId), || {
            prompt::ask("Enter a name for the vector store: ")
                .map(|name| (!name.is_empty()).then_some(name))
                .map_err(|e| SessionError::Input(format!("{:#}", e)))
        })
        .await?;
    let thread = reconciler.thread(cached(EnvKey::ThreadId)).await?;

    let assistant = assistant.resource;
    let vector_store = vector_store.resource;
    let thread = thread.resource;
    println!(
        "{} \"{}\" ({}) using {}",
        style("Assistant").bold(),
        assistant.display_name(),
        assistant.id,
        assistant.model
    );
    println!(
        "{} \"{}\" ({}) {}",
        style("Vector store").bold(),
        vector_store.display_name(),
        vector_store.id,
        vector_store.file_counts
    );
    println!("{} {}", style("Thread").bold(), thread.id);

    let files = service.list_files().await?;
    listings::print_files(&files);

    if mode == StartupMode::EditFiles {
        uploads::run(service.as_ref(), &vector_store.id, ctx.poll).await?;
        listings::print_files(&service.list_files().await?);
    }

    let model = match mode {
        StartupMode::ChangeDefaults => default_model.clone(),
        _ => assistant.model.clone(),
    };
    let assistant = bind_vector_store(
        service.as_ref(),
        &assistant.id,
        &vector_store.id,
        &instructions,
        Some(model.as_str()),
    )
    .await
    .map_err(Fatal::RemoteSetup)?;
    store.update([(EnvKey::DefaultModel, assistant.model.as_str())])?;

    if mode.clears_history() {
        let deleted = cold_start(service.as_ref(), &thread.id).await?;
        prompt::print_dim(&format!("Cold start! {} message(s) deleted.", deleted));
    }
    listings::print_history(&history(service.as_ref(), &thread.id).await?);

    let mut repl = Repl::new(ctx.verbose)?;
    repl.print_welcome();
    session.chat(&assistant.id, &thread.id).run(&mut repl).await;
    Ok(())
}

/// Ask for the new assistant's name and build its creation request.
///
/// A model already chosen this session is used as-is; otherwise
/// `pick_model` asks for one.
fn new_assistant(
    instructions: &str,
    picked_model: Option<String>,
    ask: impl FnOnce(&str) -> Result<String>,
    pick_model: impl FnOnce() -> Result<String>,
) -> Result<CreateAssistantRequest> {
    println!("{}", style("Assistant not found, a new one will be created.").yellow());
    let name = ask(&format!("Enter assistant name [{}]: ", DEFAULT_ASSISTANT_NAME))?;
    let name = if name.is_empty() {
        DEFAULT_ASSISTANT_NAME.to_string()
    } else {
        name
    };
    let model = match picked_model {
        Some(model) => model,
        None => pick_model()?,
    };

    Ok(CreateAssistantRequest {
        model,
        name: Some(name),
        instructions: Some(instructions.to_string()),
        tools: vec![Tool::file_search()],
        tool_resources: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTRUCTIONS: &str = "Answer from the documents.";

    #[test]
    fn test_new_assistant_reuses_picked_model() {
        let request = new_assistant(
            INSTRUCTIONS,
            Some("gpt-4o".to_string()),
            |_| Ok("Manuals".to_string()),
            || panic!("model already picked"),
        )
        .unwrap();

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.name.as_deref(), Some("Manuals"));
        assert_eq!(request.instructions.as_deref(), Some(INSTRUCTIONS));
        assert_eq!(request.tools, vec![Tool::file_search()]);
    }

    #[test]
    fn test_new_assistant_asks_for_model_once_when_none_picked() {
        let mut picks = 0;
        let request = new_assistant(
            INSTRUCTIONS,
            None,
            |_| Ok(String::new()),
            || {
                picks += 1;
                Ok("gpt-4o-mini".to_string())
            },
        )
        .unwrap();

        assert_eq!(picks, 1);
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.name.as_deref(), Some(DEFAULT_ASSISTANT_NAME));
    }
}
