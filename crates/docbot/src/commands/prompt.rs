//! Line prompts on the terminal.

use anyhow::Result;
use console::{Style, Term};

/// Print `label` and read one trimmed line. End of input reads as empty.
pub fn ask(label: &str) -> Result<String> {
    let term = Term::stdout();
    term.write_str(label)?;
    term.flush()?;
    Ok(term.read_line()?.trim().to_string())
}

/// Read a secret without echoing it.
pub fn ask_secret(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(label)?.trim().to_string())
}

pub fn print_dim(msg: &str) {
    println!("{}", Style::new().dim().apply_to(msg));
}

pub fn print_error(msg: &str) {
    println!("{} {}", Style::new().red().apply_to("Error:"), msg);
}

pub fn print_ok(msg: &str) {
    println!("{} {}", Style::new().green().apply_to("✓"), msg);
}
