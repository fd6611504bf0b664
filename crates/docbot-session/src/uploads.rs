//! Uploading local documents into the vector store.

use std::path::{Path, PathBuf};

use docbot_client::{BatchStatus, FileBatch, FileObject};
use tokio::time::Instant;
use walkdir::WalkDir;

use crate::error::Result;
use crate::instrument::timed;
use crate::poller::PollPolicy;
use crate::service::AssistantService;

/// Outcome of an upload pass.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Files the service accepted.
    pub uploaded: Vec<FileObject>,
    /// Files that could not be uploaded, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// The batch that attached the uploaded files, as last observed.
    pub batch: Option<FileBatch>,
}

/// Expand `inputs` into files. Folders are walked recursively, skipping
/// hidden entries; files are returned as given.
pub fn expand_paths(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let walker = WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));
            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "Skipping unreadable entry"),
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Upload `paths` (files or folders) and attach them to the vector store in
/// one batch.
///
/// A file that fails to upload is recorded in the report and the rest carry
/// on. The batch is polled with `policy` until it leaves `in_progress`.
pub async fn upload_to_vector_store(
    service: &dyn AssistantService,
    vector_store_id: &str,
    paths: &[PathBuf],
    policy: PollPolicy,
) -> Result<UploadReport> {
    let mut report = UploadReport::default();

    for path in expand_paths(paths) {
        match timed("upload_file", service.upload_file(&path)).await {
            Ok(file) => {
                tracing::info!(path = %path.display(), file_id = %file.id, bytes = file.bytes, "Uploaded file");
                report.uploaded.push(file);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Upload failed");
                report.failed.push((path, e.to_string()));
            }
        }
    }

    if report.uploaded.is_empty() {
        return Ok(report);
    }

    let file_ids = report.uploaded.iter().map(|f| f.id.clone()).collect();
    let mut batch = timed(
        "create_file_batch",
        service.create_file_batch(vector_store_id, file_ids),
    )
    .await?;

    let started = Instant::now();
    while batch.status == BatchStatus::InProgress {
        if started.elapsed() >= policy.max_wait {
            tracing::warn!(batch_id = %batch.id, counts = %batch.file_counts, "Batch still indexing, not waiting any longer");
            break;
        }
        tokio::time::sleep(policy.interval).await;
        batch = timed(
            "retrieve_file_batch",
            service.retrieve_file_batch(vector_store_id, &batch.id),
        )
        .await?;
    }

    tracing::info!(batch_id = %batch.id, status = ?batch.status, counts = %batch.file_counts, "File batch finished");
    report.batch = Some(batch);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use docbot_client::Error as ClientError;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::{Call, MockService, Op};

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("books/part2")).unwrap();
        fs::create_dir_all(dir.path().join("books/.cache")).unwrap();
        fs::write(dir.path().join("books/a.pdf"), b"a").unwrap();
        fs::write(dir.path().join("books/part2/b.pdf"), b"b").unwrap();
        fs::write(dir.path().join("books/.hidden.pdf"), b"h").unwrap();
        fs::write(dir.path().join("books/.cache/c.pdf"), b"c").unwrap();
        fs::write(dir.path().join("notes.txt"), b"n").unwrap();
        dir
    }

    #[test]
    fn test_expand_paths_walks_folders() {
        let dir = tree();
        let files = expand_paths(&[dir.path().join("books"), dir.path().join("notes.txt")]);

        assert_eq!(
            files,
            vec![
                dir.path().join("books/a.pdf"),
                dir.path().join("books/part2/b.pdf"),
                dir.path().join("notes.txt"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_continues_past_failures() {
        let dir = tree();
        let mock = MockService::new().with_batch_script([BatchStatus::InProgress, BatchStatus::Completed]);
        mock.fail_next(
            Op::UploadFile,
            ClientError::Io {
                path: "a.pdf".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            },
        );

        let report = upload_to_vector_store(
            &mock,
            "vs_1",
            &[dir.path().join("books"), dir.path().join("notes.txt")],
            PollPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, dir.path().join("books/a.pdf"));
        assert_eq!(report.uploaded.len(), 2);

        let batch = report.batch.unwrap();
        assert_eq!(batch.status, BatchStatus::Completed);
        assert_eq!(batch.file_counts.completed, 2);
        assert_eq!(mock.count(|c| matches!(c, Call::RetrieveFileBatch(_))), 2);
        assert_eq!(
            mock.count(|c| matches!(c, Call::CreateFileBatch(ids) if ids.len() == 2)),
            1
        );
    }

    #[tokio::test]
    async fn test_no_batch_when_nothing_uploaded() {
        let mock = MockService::new();
        mock.fail_next(Op::UploadFile, ClientError::Auth("revoked".to_string()));

        let report = upload_to_vector_store(
            &mock,
            "vs_1",
            &[PathBuf::from("missing.pdf")],
            PollPolicy::default(),
        )
        .await
        .unwrap();

        assert!(report.uploaded.is_empty());
        assert!(report.batch.is_none());
        assert_eq!(mock.count(|c| matches!(c, Call::CreateFileBatch(_))), 0);
    }
}
