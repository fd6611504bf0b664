//! Local state for the docbot client.
//!
//! Two files live next to the user:
//! - the env file (`.env` by default), a `KEY=VALUE` list that caches the API
//!   key and the ids of the remote assistant, thread and vector store, and
//! - the instructions file, whose contents become the assistant's system
//!   instructions.
//!
//! The env file is rewritten in place on every update. Lines this crate does
//! not recognize (unknown keys, comments, malformed lines) are carried through
//! untouched so a load/save cycle never loses data.

pub mod env_file;
pub mod error;
pub mod instructions;
pub mod paths;

pub use env_file::{EnvFile, EnvKey, EnvStore, DEFAULT_ENV_FILE};
pub use error::{ConfigError, Result};
pub use instructions::{load_instructions, DEFAULT_INSTRUCTIONS_FILE};
pub use paths::{config_dir, log_dir};
