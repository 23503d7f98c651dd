//! File-backed reporter.
//!
//! Each run gets one JSON Lines file under `json/` (one object per harvested
//! page) and one plain-text log under `logs/`. Writes happen on a background
//! task fed by an unbounded channel so the fetch path never waits on disk.

use crate::error::{ReportError, Result};
use crate::reporter::{LogLevel, Reporter};
use chrono::{DateTime, Local};
use godork_core::PageReport;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

enum Entry {
    Page(Box<PageReport>),
    Log {
        at: DateTime<Local>,
        level: LogLevel,
        message: String,
    },
}

/// Reporter persisting pages and log lines under a report directory.
pub struct FileReporter {
    json_path: PathBuf,
    log_path: PathBuf,
    sender: Mutex<Option<mpsc::UnboundedSender<Entry>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl FileReporter {
    /// Create the `logs/` and `json/` directories under `base_dir` and start the writer task.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn create(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();

        for sub in ["logs", "json"] {
            let dir = base_dir.join(sub);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| ReportError::Directory {
                    path: dir.display().to_string(),
                    source,
                })?;
        }

        let stem = run_file_stem(Local::now());
        let json_path = base_dir.join("json").join(format!("{stem}.json"));
        let log_path = base_dir.join("logs").join(format!("{stem}.log"));

        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_entries(receiver, json_path.clone(), log_path.clone()));

        tracing::debug!(
            json = %json_path.display(),
            log = %log_path.display(),
            "report files prepared"
        );

        Ok(Self {
            json_path,
            log_path,
            sender: Mutex::new(Some(sender)),
            writer: Mutex::new(Some(writer)),
        })
    }

    #[must_use]
    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Stop accepting entries and wait until everything queued is on disk.
    ///
    /// Calling it more than once is harmless.
    pub async fn close(&self) {
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let writer = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                tracing::error!("Report writer task failed: {}", e);
            }
        }
    }

    fn send(&self, entry: Entry) {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(sender) => {
                if sender.send(entry).is_err() {
                    tracing::warn!("Report writer stopped; entry dropped");
                }
            }
            None => tracing::warn!("Report already closed; entry dropped"),
        }
    }
}

impl Reporter for FileReporter {
    fn record(&self, page: &PageReport) {
        self.send(Entry::Page(Box::new(page.clone())));
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.send(Entry::Log {
            at: Local::now(),
            level,
            message: message.to_string(),
        });
    }
}

fn run_file_stem(now: DateTime<Local>) -> String {
    let run_id = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_godork",
        now.format("%Y-%m-%d-%H%M%S"),
        &run_id[..8]
    )
}

pub(crate) fn format_log_line(at: DateTime<Local>, level: LogLevel, message: &str) -> String {
    format!("[{}] [{}] {}", at.format("%Y/%m/%d %H:%M:%S"), level, message)
}

async fn write_entries(
    mut receiver: mpsc::UnboundedReceiver<Entry>,
    json_path: PathBuf,
    log_path: PathBuf,
) {
    while let Some(entry) = receiver.recv().await {
        let result = match entry {
            Entry::Page(page) => match serde_json::to_string(&page) {
                Ok(line) => append_line(&json_path, &line).await,
                Err(e) => Err(e.into()),
            },
            Entry::Log { at, level, message } => {
                append_line(&log_path, &format_log_line(at, level, &message)).await
            }
        };

        if let Err(e) = result {
            tracing::error!("Failed to persist report entry: {}", e);
        }
    }
}

async fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use godork_core::DataOutput;
    use tempfile::TempDir;

    fn page(n: u32) -> PageReport {
        PageReport {
            timestamp: Utc::now(),
            query: "intitle:index.of".to_string(),
            page: n,
            size_page: 2048,
            data_output: DataOutput {
                title: vec!["Index of /backup".to_string()],
                links: vec!["https://example.com/backup/".to_string()],
            },
        }
    }

    #[test]
    fn test_log_line_format() {
        let at = Local
            .with_ymd_and_hms(2025, 3, 4, 5, 6, 7)
            .single()
            .expect("unambiguous local time");
        assert_eq!(
            format_log_line(at, LogLevel::Warning, "blocked"),
            "[2025/03/04 05:06:07] [WARNING] blocked"
        );
    }

    #[tokio::test]
    async fn test_pages_and_logs_are_appended() {
        let tmp = TempDir::new().expect("create temp dir");
        let reporter = FileReporter::create(tmp.path()).await.expect("create reporter");

        reporter.log(LogLevel::Info, "Starting enumeration for intitle:index.of");
        reporter.record(&page(1));
        reporter.record(&page(2));
        reporter.log(LogLevel::Error, "Server error on page 3");
        reporter.close().await;

        let json = std::fs::read_to_string(reporter.json_path()).expect("read json report");
        let pages: Vec<PageReport> = json
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json line"))
            .collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 1);
        assert_eq!(pages[1].page, 2);

        let log = std::fs::read_to_string(reporter.log_path()).expect("read log");
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[INFO] Starting enumeration"));
        assert!(lines[1].contains("[ERROR] Server error on page 3"));
    }

    #[tokio::test]
    async fn test_entries_after_close_are_dropped() {
        let tmp = TempDir::new().expect("create temp dir");
        let reporter = FileReporter::create(tmp.path()).await.expect("create reporter");

        reporter.close().await;
        reporter.log(LogLevel::Info, "late");
        reporter.close().await;

        assert!(!reporter.log_path().exists());
    }
}
