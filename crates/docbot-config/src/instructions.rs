//! The assistant instructions file.

use std::io::ErrorKind;
use std::path::Path;

use crate::{ConfigError, Result};

/// Default instructions file name, relative to the working directory.
pub const DEFAULT_INSTRUCTIONS_FILE: &str = "instructions.txt";

/// Read the whole instructions file.
///
/// A missing file is reported as [`ConfigError::InstructionsNotFound`] so the
/// caller can tell the user where to put it.
pub fn load_instructions(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            if text.trim().is_empty() {
                tracing::warn!(path = %path.display(), "instructions file is empty");
            }
            Ok(text)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ConfigError::InstructionsNotFound {
            path: path.display().to_string(),
        }),
        Err(e) => Err(ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        }),
    }
}
