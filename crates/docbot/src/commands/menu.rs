//! Startup mode menu.

use anyhow::Result;
use console::style;

use super::prompt;

/// How the session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupMode {
    /// Ignore cached ids and create everything fresh.
    FromZero,
    /// Reuse cached resources and clear the conversation.
    LoadDefaults,
    /// Reuse cached resources and keep the conversation.
    LoadWithMessages,
    /// Upload documents, then as [`StartupMode::LoadDefaults`].
    EditFiles,
    /// Pick a new default model, then as [`StartupMode::LoadDefaults`].
    ChangeDefaults,
}

impl StartupMode {
    pub const ALL: [StartupMode; 5] = [
        StartupMode::FromZero,
        StartupMode::LoadDefaults,
        StartupMode::LoadWithMessages,
        StartupMode::EditFiles,
        StartupMode::ChangeDefaults,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StartupMode::FromZero => "Start from zero",
            StartupMode::LoadDefaults => "Load defaults (recents)",
            StartupMode::LoadWithMessages => "Load defaults and messages",
            StartupMode::EditFiles => "Edit files and load defaults",
            StartupMode::ChangeDefaults => "Change defaults [Advanced]",
        }
    }

    /// Parse a menu answer. Empty input picks [`StartupMode::LoadDefaults`].
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "" | "1" => Some(StartupMode::LoadDefaults),
            "0" => Some(StartupMode::FromZero),
            "2" => Some(StartupMode::LoadWithMessages),
            "3" => Some(StartupMode::EditFiles),
            "4" => Some(StartupMode::ChangeDefaults),
            _ => None,
        }
    }

    /// Whether cached ids should be looked up at all.
    pub fn reuses_cache(&self) -> bool {
        *self != StartupMode::FromZero
    }

    /// Whether the conversation is cleared before chatting.
    pub fn clears_history(&self) -> bool {
        *self != StartupMode::LoadWithMessages
    }
}

/// Show the menu until a valid choice is made.
pub fn choose() -> Result<StartupMode> {
    println!();
    println!("{}", style("Choose one of the options below and press 'Enter':").bold());
    println!();
    for (i, mode) in StartupMode::ALL.iter().enumerate() {
        println!("  {} {}", style(format!("[{}]", i)).cyan(), mode.label());
    }
    println!();

    loop {
        let answer = prompt::ask("Option: ")?;
        match StartupMode::parse(&answer) {
            Some(mode) => {
                tracing::debug!(?mode, "Startup mode");
                return Ok(mode);
            }
            None => prompt::print_error(&format!("'{}' is not an option, enter 0-4", answer)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_answers() {
        assert_eq!(StartupMode::parse("0"), Some(StartupMode::FromZero));
        assert_eq!(StartupMode::parse(" 2 "), Some(StartupMode::LoadWithMessages));
        assert_eq!(StartupMode::parse("4"), Some(StartupMode::ChangeDefaults));
        assert_eq!(StartupMode::parse(""), Some(StartupMode::LoadDefaults));
        assert_eq!(StartupMode::parse("5"), None);
        assert_eq!(StartupMode::parse("load"), None);
    }

    #[test]
    fn test_menu_order_matches_numbers() {
        for (i, mode) in StartupMode::ALL.iter().enumerate() {
            assert_eq!(StartupMode::parse(&i.to_string()), Some(*mode));
        }
    }

    #[test]
    fn test_mode_flags() {
        assert!(!StartupMode::FromZero.reuses_cache());
        assert!(StartupMode::EditFiles.reuses_cache());
        assert!(!StartupMode::LoadWithMessages.clears_history());
        assert!(StartupMode::ChangeDefaults.clears_history());
    }
}
