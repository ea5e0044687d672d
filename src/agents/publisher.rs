use crate::agents::update::SyncResult;
use crate::config::{GithubConfig, is_placeholder};
use crate::error::{Result, UpdaterError};
use crate::repository::{ContentsApi, PutFileRequest};
use std::sync::Arc;
use tracing::{info, warn};

/// Validated credentials for the source-control host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCredentials {
    pub token: String,
    pub owner: String,
    pub repo: String,
}

impl PublishCredentials {
    /// Returns the reason publishing must be skipped when any field is empty
    /// or still holds a sample placeholder.
    pub fn from_config(config: &GithubConfig) -> std::result::Result<Self, String> {
        let fields = [
            ("token", &config.token),
            ("owner", &config.owner),
            ("repo", &config.repo),
        ];

        for (name, value) in fields {
            let value = value.trim();
            if value.is_empty() {
                return Err(format!("missing GitHub {name}"));
            }
            if is_placeholder(value) {
                return Err(format!("GitHub {name} is still a placeholder"));
            }
        }

        Ok(Self {
            token: config.token.trim().to_string(),
            owner: config.owner.trim().to_string(),
            repo: config.repo.trim().to_string(),
        })
    }
}

#[derive(Debug)]
pub enum PublishOutcome {
    Published { count: usize },
    Skipped { reason: String },
    Failed { published: usize, error: UpdaterError },
}

impl PublishOutcome {
    pub fn summary(&self) -> String {
        match self {
            PublishOutcome::Published { count } => {
                format!("Remote sync: {count} files pushed.")
            }
            PublishOutcome::Skipped { reason } => {
                format!("Remote push skipped: {reason}.")
            }
            PublishOutcome::Failed { published, error } => {
                format!("Remote push error after {published} files pushed: {error}")
            }
        }
    }
}

/// Mirrors synchronized files to a source-control host, one file at a time.
pub struct RemotePublisher {
    api: Arc<dyn ContentsApi>,
}

/// Whether full updates can be mirrored, decided once at construction.
pub enum PublisherState {
    Ready(RemotePublisher),
    Unavailable { reason: String },
}

impl PublisherState {
    pub fn publish(&self, sync: &SyncResult, target_version: &str) -> PublishOutcome {
        match self {
            PublisherState::Ready(publisher) => publisher.publish(sync, target_version),
            PublisherState::Unavailable { reason } => {
                warn!(%reason, "skipping remote publish");
                PublishOutcome::Skipped {
                    reason: reason.clone(),
                }
            }
        }
    }
}

impl RemotePublisher {
    pub fn new(api: Arc<dyn ContentsApi>) -> Self {
        Self { api }
    }

    /// Push every updated file in sync order, stopping at the first failure.
    pub fn publish(&self, sync: &SyncResult, target_version: &str) -> PublishOutcome {
        let message = format!("Auto-update to v{target_version}");
        let mut published = 0;

        for path in &sync.updated_files {
            let result = sync
                .content_for(path)
                .ok_or_else(|| UpdaterError::Publish {
                    path: path.clone(),
                    message: "no downloaded content was kept for this file".to_string(),
                })
                .and_then(|content| self.publish_one(path, content, &message));

            if let Err(error) = result {
                warn!(path = %path, published, error = %error, "remote publish aborted");
                return PublishOutcome::Failed { published, error };
            }
            published += 1;
        }

        info!(count = published, "remote publish finished");
        PublishOutcome::Published { count: published }
    }

    fn publish_one(&self, path: &str, content_base64: &str, message: &str) -> Result<()> {
        let sha = self.api.file_revision(path)?;
        self.api.put_file(&PutFileRequest {
            path,
            message,
            content_base64,
            sha: sha.as_deref(),
        })
    }
}
