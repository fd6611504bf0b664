//! Tables printed during startup.

use chrono::DateTime;
use console::{Style, style};
use docbot_client::{FileObject, Message, Model, Role};

const RULE: usize = 100;

/// Unix seconds as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Bytes as megabytes with two decimals.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// One numbered row of the model table.
pub fn model_row(index: usize, model: &Model) -> String {
    format!(
        "[{:02}] {:<30} {:<19}",
        index,
        model.id,
        format_timestamp(model.created)
    )
}

/// One numbered row of the file table.
pub fn file_row(index: usize, file: &FileObject) -> String {
    format!(
        "{:<5}{:<30}{:<32}{:<7}{:<5}{:<12}{:<8}",
        index + 1,
        file.filename,
        file.id,
        format_megabytes(file.bytes),
        "MB",
        file.purpose,
        file.status.as_deref().unwrap_or("-")
    )
}

pub fn print_models(models: &[Model]) {
    let dim = Style::new().dim();
    println!();
    println!("{}", style("Models available").bold());
    println!("{:<4} {:<30} {:<19}", "No.", "Model", "Created");
    println!("{}", dim.apply_to(format!("{} {} {}", "-".repeat(4), "-".repeat(30), "-".repeat(19))));
    for (i, model) in models.iter().enumerate() {
        println!("{}", model_row(i, model));
    }
}

pub fn print_files(files: &[FileObject]) {
    let dim = Style::new().dim();
    if files.is_empty() {
        println!("{}", dim.apply_to("No files found."));
        return;
    }
    println!();
    println!("{}", style(format!("Total Files: {}", files.len())).bold());
    println!(
        "{:<5}{:<30}{:<32}{:<12}{:<12}{:<8}",
        "No.", "Filename", "ID", "Size", "Purpose", "Status"
    );
    println!("{}", dim.apply_to("-".repeat(RULE)));
    for (i, file) in files.iter().enumerate() {
        println!("{}", file_row(i, file));
    }
    println!();
}

pub fn print_history(messages: &[Message]) {
    let dim = Style::new().dim();
    for (i, message) in messages.iter().enumerate() {
        let role = match message.role {
            Role::User => style(message.role.to_string()).green(),
            Role::Assistant => style(message.role.to_string()).cyan(),
        };
        println!(
            "{} {} {}",
            dim.apply_to(format!("Message {} --->", i)),
            role.bold(),
            dim.apply_to(format!("({})", message.id))
        );
        println!("{}", message.text());
        println!();
    }
    println!("{}", dim.apply_to(format!("--- Total Messages: {} ---", messages.len())));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_is_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.00");
        assert_eq!(format_megabytes(1_572_864), "1.50");
    }

    #[test]
    fn test_rows() {
        let model = Model {
            id: "gpt-4o".to_string(),
            created: 0,
            owned_by: "system".to_string(),
        };
        assert!(model_row(3, &model).starts_with("[03] gpt-4o "));

        let file = FileObject {
            id: "file_1".to_string(),
            filename: "manual.pdf".to_string(),
            bytes: 2 * 1024 * 1024,
            purpose: "assistants".to_string(),
            status: None,
            created_at: 0,
        };
        let row = file_row(0, &file);
        assert!(row.starts_with("1    manual.pdf"));
        assert!(row.contains("2.00   MB"));
        assert!(row.trim_end().ends_with('-'));
    }
}
