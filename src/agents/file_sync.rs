use crate::agents::update::SyncResult;
use crate::error::Result;
use crate::repository::RemoteSource;
use crate::utils::PathValidator;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Downloads planned files into the install root.
///
/// Files are processed one at a time. A failure is recorded and logged and
/// the loop moves on; nothing already written is rolled back.
pub struct FileSynchronizer<'a> {
    source: &'a dyn RemoteSource,
    install_root: PathBuf,
    show_progress: bool,
}

impl<'a> FileSynchronizer<'a> {
    pub fn new(source: &'a dyn RemoteSource, install_root: impl AsRef<Path>) -> Self {
        Self {
            source,
            install_root: install_root.as_ref().to_path_buf(),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Sync every path, keeping base64 content of successes when
    /// `keep_content` is set.
    pub fn apply(&self, files: &[String], keep_content: bool) -> SyncResult {
        let mut result = SyncResult::new();

        let pb = ProgressBar::new(files.len() as u64);
        if !self.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::default_bar().template("  [{bar:40}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }

        for path in files {
            pb.set_message(path.clone());

            match self.sync_one(path) {
                Ok(content) => {
                    info!(path = %path, bytes = content.len(), "file updated");
                    let encoded = keep_content.then(|| BASE64_STANDARD.encode(&content));
                    result.record_success(path, encoded);
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "file update failed");
                    result.record_failure(path);
                }
            }

            pb.inc(1);
        }
        pb.finish_and_clear();

        result
    }

    fn sync_one(&self, relative_path: &str) -> Result<Vec<u8>> {
        let destination = PathValidator::resolve_relative(&self.install_root, relative_path)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.source.fetch_file(relative_path)?;
        fs::write(&destination, &content)?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeSource;
    use tempfile::tempdir;

    #[test]
    fn one_failure_does_not_abort_the_batch() {
        let dir = tempdir().unwrap();
        let source = FakeSource::new(&[("b/ok.js", b"module.exports = 1;")]);

        let result = FileSynchronizer::new(&source, dir.path())
            .apply(&["a/missing.js".to_string(), "b/ok.js".to_string()], false);

        assert_eq!(result.failed_files, vec!["a/missing.js"]);
        assert_eq!(result.updated_files, vec!["b/ok.js"]);
        assert_eq!(
            fs::read(dir.path().join("b/ok.js")).unwrap(),
            b"module.exports = 1;"
        );
        assert!(!dir.path().join("a/missing.js").exists());
        assert!(result.encoded_contents.is_empty());
    }

    #[test]
    fn writes_binary_content_and_keeps_base64_for_full_updates() {
        let dir = tempdir().unwrap();
        let png: &[u8] = &[0x89, b'P', b'N', b'G', 0x00, 0xff];
        let source = FakeSource::new(&[("assets/img/logo.png", png)]);

        let result = FileSynchronizer::new(&source, dir.path())
            .apply(&["assets/img/logo.png".to_string()], true);

        assert_eq!(fs::read(dir.path().join("assets/img/logo.png")).unwrap(), png);
        assert_eq!(
            result.content_for("assets/img/logo.png"),
            Some(BASE64_STANDARD.encode(png).as_str())
        );
    }

    #[test]
    fn overwrites_existing_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.js"), "old").unwrap();
        let source = FakeSource::new(&[("index.js", b"new")]);

        FileSynchronizer::new(&source, dir.path()).apply(&["index.js".to_string()], false);

        assert_eq!(fs::read_to_string(dir.path().join("index.js")).unwrap(), "new");
    }

    #[test]
    fn unsafe_paths_fail_without_fetching() {
        let dir = tempdir().unwrap();
        let source = FakeSource::new(&[("../escape.js", b"x")]);

        let result = FileSynchronizer::new(&source, dir.path())
            .apply(&["../escape.js".to_string()], false);

        assert_eq!(result.failed_files, vec!["../escape.js"]);
        assert!(source.requested().is_empty());
    }

    #[test]
    fn processes_files_in_plan_order() {
        let dir = tempdir().unwrap();
        let source = FakeSource::new(&[("z.js", b"z"), ("a.js", b"a"), ("m.js", b"m")]);
        let files = vec!["z.js".to_string(), "a.js".to_string(), "m.js".to_string()];

        let result = FileSynchronizer::new(&source, dir.path()).apply(&files, false);

        assert_eq!(result.updated_files, files);
        assert_eq!(source.requested(), files);
    }
}
