//! Append-only run log
//!
//! The pipeline records every state transition (swap start/end, batch
//! completion, percentile snapshots, errors) through an injected sink. Sink
//! failures are defined to never propagate: a log line that cannot be written
//! becomes a console warning and nothing else.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

/// Observability side-channel for the pipeline. Implementations must swallow
/// their own failures.
pub trait EventSink: Send + Sync {
    /// Record one timestamped event
    fn record_event(&self, kind: &str, detail: &str);
}

/// Appends timestamped lines to a process-local log file
pub struct FileEventSink {
    path: PathBuf,
}

impl FileEventSink {
    /// Create the sink, truncating any previous log and writing a header
    /// line. Initialization failure is downgraded to a warning; subsequent
    /// appends will retry the open.
    pub fn create(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let header = format!("Run started at {}\n", Utc::now().to_rfc3339());
        if let Err(e) = std::fs::write(&path, header) {
            warn!(path = %path.display(), error = %e, "Failed to initialize execution log");
        }
        Self { path }
    }

    /// Open an existing log for appending without truncation
    pub fn append_to(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl EventSink for FileEventSink {
    fn record_event(&self, kind: &str, detail: &str) {
        let line = format!("{}, {}: {}\n", Utc::now().to_rfc3339(), kind, detail);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to write to execution log");
        }
    }
}

/// Sink that drops every event; for tests
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn record_event(&self, _kind: &str, _detail: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_truncates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        std::fs::write(&path, "stale contents\n").unwrap();

        let sink = FileEventSink::create(&path);
        sink.record_event("swap_start", "iteration 1");
        sink.record_event("swap_complete", "duration: 123ms");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale contents"));
        assert!(contents.starts_with("Run started at "));
        assert!(contents.contains("swap_start: iteration 1"));
        assert!(contents.contains("swap_complete: duration: 123ms"));
    }

    #[test]
    fn test_write_failure_never_panics() {
        // A directory path cannot be opened as a file; the sink must swallow it
        let dir = tempfile::tempdir().unwrap();
        let sink = FileEventSink::append_to(dir.path());
        sink.record_event("swap_start", "detail");
    }
}
