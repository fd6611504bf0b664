//! Upload prompt.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use console::style;
use docbot_session::{AssistantService, PollPolicy, upload_to_vector_store};
use indicatif::{ProgressBar, ProgressStyle};

use super::prompt;

/// Ask for files or folders until an empty line, then upload them into the
/// vector store.
pub async fn run(
    service: &dyn AssistantService,
    vector_store_id: &str,
    policy: PollPolicy,
) -> Result<()> {
    let mut paths = Vec::new();
    println!();
    println!("Enter a file name (with extension) or a folder name to upload.");
    println!("Press 'Enter' on an empty line when you are finished.");
    loop {
        let answer = prompt::ask("Path: ")?;
        if answer.is_empty() {
            break;
        }
        let path = PathBuf::from(&answer);
        if !path.exists() {
            prompt::print_error(&format!("'{}' does not exist", answer));
            continue;
        }
        paths.push(path);
    }

    if paths.is_empty() {
        prompt::print_dim("Nothing to upload.");
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Uploading files...");

    let report = upload_to_vector_store(service, vector_store_id, &paths, policy).await;
    spinner.finish_and_clear();
    let report = report?;

    for file in &report.uploaded {
        prompt::print_ok(&format!("{} ({})", file.filename, file.id));
    }
    for (path, reason) in &report.failed {
        prompt::print_error(&format!("{}: {}", path.display(), reason));
    }
    if let Some(batch) = &report.batch {
        println!(
            "{} {}",
            style("File batch:").bold(),
            batch.file_counts
        );
    }
    Ok(())
}
