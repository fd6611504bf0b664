//! Process exit codes.

use docbot_config::ConfigError;

/// Everything went fine.
pub const SUCCESS: u8 = 0;
/// Anything not covered below.
pub const UNEXPECTED: u8 = 1;
/// The API key was rejected on every attempt.
pub const CREDENTIAL_REJECTED: u8 = 2;
/// A local file (env file, instructions) could not be used.
pub const LOCAL_CONFIG: u8 = 3;
/// The assistant, thread or vector store could not be prepared.
pub const REMOTE_SETUP: u8 = 4;

/// Failures that end the startup flow with a dedicated exit code.
#[derive(Debug, thiserror::Error)]
pub enum Fatal {
    #[error("API key rejected {attempts} times, giving up")]
    CredentialRejected { attempts: u32 },

    #[error("could not prepare the remote assistant")]
    RemoteSetup(#[source] docbot_session::Error),
}

/// Exit code for an error that ended the program.
pub fn code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(fatal) = cause.downcast_ref::<Fatal>() {
            return match fatal {
                Fatal::CredentialRejected { .. } => CREDENTIAL_REJECTED,
                Fatal::RemoteSetup(_) => REMOTE_SETUP,
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return LOCAL_CONFIG;
        }
        if let Some(e) = cause.downcast_ref::<docbot_session::Error>() {
            match e {
                docbot_session::Error::Config(_) => return LOCAL_CONFIG,
                docbot_session::Error::Retrieve { .. } | docbot_session::Error::Create { .. } => {
                    return REMOTE_SETUP;
                }
                _ => {}
            }
        }
    }
    UNEXPECTED
}
