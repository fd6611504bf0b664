//! API key check.

use anyhow::Result;
use docbot_client::{AssistantsClient, Model};
use docbot_config::{EnvKey, EnvStore};
use docbot_session::timed;

use super::{Context, prompt};
use crate::exit::Fatal;

/// Keys tried before giving up.
pub const MAX_KEY_ATTEMPTS: u32 = 3;

/// A client whose key the service accepted, with the models it can use.
pub struct Connection {
    pub client: AssistantsClient,
    pub models: Vec<Model>,
}

/// Build a client from the env file's key, asking for a new key with
/// `ask_key` while the service rejects it. Every entered key is written to
/// the env file before it is tried.
pub async fn connect<F>(ctx: &Context, store: &EnvStore, mut ask_key: F) -> Result<Connection>
where
    F: FnMut() -> Result<String>,
{
    let mut key = store
        .load()?
        .value(EnvKey::ApiKey)
        .map(str::to_string);

    for attempt in 1..=MAX_KEY_ATTEMPTS {
        let candidate = match key.take() {
            Some(k) => k,
            None => {
                let entered = ask_key()?;
                store.update([(EnvKey::ApiKey, entered.as_str())])?;
                entered
            }
        };

        let mut builder = AssistantsClient::builder().api_key(candidate);
        if let Some(url) = &ctx.base_url {
            builder = builder.base_url(url.clone());
        }

        let rejected = match builder.build() {
            Ok(client) => match timed("list_models", client.models().list()).await {
                Ok(models) => {
                    tracing::info!(attempt, models = models.len(), "API key accepted");
                    return Ok(Connection { client, models });
                }
                Err(e) if e.is_auth_error() => e,
                Err(e) => return Err(e.into()),
            },
            Err(e @ docbot_client::Error::Config(_)) => e,
            Err(e) => return Err(e.into()),
        };

        tracing::warn!(attempt, error = %rejected, "API key rejected");
        prompt::print_error(&rejected.to_string());
    }

    Err(Fatal::CredentialRejected {
        attempts: MAX_KEY_ATTEMPTS,
    }
    .into())
}

/// Ask for a key on the terminal without echoing it.
pub fn prompt_for_key() -> Result<String> {
    prompt::ask_secret("Please enter your OpenAI API key: ")
}
