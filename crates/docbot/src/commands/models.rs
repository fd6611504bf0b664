//! Interactive model picker.

use anyhow::Result;
use docbot_client::Model;
use docbot_session::{ModelChoice, choose_model};

use super::{listings, prompt};

/// Fallback when neither the env file nor the user names a model.
pub const FALLBACK_MODEL: &str = "gpt-4o-mini";

/// Show the chat models and ask for one until the answer is valid.
///
/// Empty input keeps `default`.
pub fn pick(models: &[Model], default: &str) -> Result<String> {
    listings::print_models(models);
    let last = models.len().saturating_sub(1);

    loop {
        println!();
        println!("(a) Enter a number between 00 and {:02} to select one of the above models.", last);
        println!("(b) Or, type the name of the model (e.g. 'gpt-4o').");
        println!("(c) Or press 'Enter' to continue with the default model '{}'.", default);
        let answer = prompt::ask("Model: ")?;

        match choose_model(models, &answer) {
            ModelChoice::Model(id) => return Ok(id),
            ModelChoice::Default => return Ok(default.to_string()),
            ModelChoice::BadIndex(_) => prompt::print_error(&format!(
                "Invalid model number. Please enter a number between 00 and {:02}.",
                last
            )),
            ModelChoice::UnknownName(name) => prompt::print_error(&format!(
                "\"{}\" is not an available model. Check the spelling or make a different choice.",
                name
            )),
        }
    }
}
