//! REPL (Read-Eval-Print Loop) implementation for interactive chat.

use std::time::Duration;

use anyhow::Result;
use console::{Style, style};
use docbot_client::RunStatus;
use docbot_session::{ChatFrontend, EXIT_WORDS, Error};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

/// Terminal front end for a chat session.
pub struct Repl {
    editor: Editor<(), DefaultHistory>,
    spinner: Option<ProgressBar>,
    verbose: bool,
}

impl Repl {
    /// Create a new REPL instance.
    pub fn new(verbose: bool) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();

        let editor = Editor::with_config(config)?;

        Ok(Self {
            editor,
            spinner: None,
            verbose,
        })
    }

    pub fn print_welcome(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("Docbot Chat").bold().cyan());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!(
            "{}",
            dim.apply_to("Type your question and press Enter to chat.")
        );
        println!(
            "{}",
            dim.apply_to(format!("Type {} or press Ctrl+D to exit.", EXIT_WORDS.join(", ")))
        );
        println!();
    }

    fn format_prompt(&self) -> String {
        format!("{} ", style("User:").green().bold())
    }

    fn start_spinner(&mut self) -> &ProgressBar {
        self.spinner.get_or_insert_with(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
                spinner.set_style(template);
            }
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        })
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn print_dim(&self, msg: &str) {
        let dim = Style::new().dim();
        println!("{}", dim.apply_to(msg));
    }
}

impl ChatFrontend for Repl {
    fn read_line(&mut self) -> Option<String> {
        let prompt = self.format_prompt();
        match self.editor.readline(&prompt) {
            Ok(line) => Some(line),
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C - don't exit
                println!();
                self.print_dim(&format!("(Interrupted - type {} to exit)", EXIT_WORDS[1]));
                Some(String::new())
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!();
                None
            }
            Err(e) => {
                let red = Style::new().red();
                println!("{} Input error: {}", red.apply_to("Error:"), e);
                None
            }
        }
    }

    fn on_status(&mut self, status: RunStatus) {
        let verbose = self.verbose;
        let spinner = self.start_spinner();
        if verbose {
            spinner.set_message(format!("Thinking... ({})", status));
        } else {
            spinner.set_message("Thinking...");
        }
    }

    fn on_reply(&mut self, reply: &str) {
        self.stop_spinner();
        println!();
        println!("{} {}", style("Assistant:").cyan().bold(), reply);
        println!();
    }

    fn on_no_reply(&mut self) {
        self.stop_spinner();
        self.print_dim("(The assistant did not reply.)");
    }

    fn on_error(&mut self, error: &Error) {
        self.stop_spinner();
        let red = Style::new().red();
        println!("{} {}", red.apply_to("Error:"), error);
    }

    fn on_exit(&mut self) {
        self.stop_spinner();
        self.print_dim("Sorry to see you go!");
    }
}
