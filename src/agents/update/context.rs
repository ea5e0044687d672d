use crate::agents::publisher::PublishOutcome;
use std::collections::HashMap;

/// Per-file outcome of a synchronization run.
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    /// Paths written locally, in the order they were processed.
    pub updated_files: Vec<String>,
    /// Paths that could not be fetched or written.
    pub failed_files: Vec<String>,
    /// Base64 content of each updated path, kept only for full updates.
    pub encoded_contents: HashMap<String, String>,
}

impl SyncResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, path: &str, encoded: Option<String>) {
        self.updated_files.push(path.to_string());
        if let Some(encoded) = encoded {
            self.encoded_contents.insert(path.to_string(), encoded);
        }
    }

    pub fn record_failure(&mut self, path: &str) {
        self.failed_files.push(path.to_string());
    }

    pub fn content_for(&self, path: &str) -> Option<&str> {
        self.encoded_contents.get(path).map(String::as_str)
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_files.is_empty()
    }
}

/// Everything that happened while applying a confirmed plan.
#[derive(Debug)]
pub struct UpdateReport {
    pub target_version: String,
    pub sync: SyncResult,
    /// `None` for runtime-only updates, or when nothing was synchronized.
    pub publish: Option<PublishOutcome>,
}

impl UpdateReport {
    pub fn render(&self) -> String {
        let mut lines = vec![
            "Runtime update complete".to_string(),
            format!("Version: {}", self.target_version),
            format!("Updated: {}", self.sync.updated_files.len()),
        ];

        if self.sync.has_failures() {
            lines.push(format!(
                "Failed: {} ({})",
                self.sync.failed_files.len(),
                self.sync.failed_files.join(", ")
            ));
        }

        let mut report = lines.join("\n");
        if let Some(outcome) = &self.publish {
            report.push_str("\n\n");
            report.push_str(&outcome.summary());
        }
        report
    }
}
