use crate::agents::{PublishCredentials, PublisherState, RemotePublisher};
use crate::config::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use crate::remote::{GithubContents, RawRepository};
use crate::repository::RemoteSource;
use std::sync::Arc;
use tracing::debug;

pub struct RemoteFactory;

impl RemoteFactory {
    /// Release source for the configured base URL; `None` when the base URL
    /// is unset so the command can report it to the requester.
    pub fn create_source(config: &UpdaterConfig) -> Result<Option<Arc<dyn RemoteSource>>> {
        let base_url = match config.remote_base_url() {
            Ok(url) => url,
            Err(UpdaterError::ConfigurationMissing(reason)) => {
                debug!(%reason, "release source not configured");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let source = RawRepository::new(
            base_url,
            &config.manifest_name,
            config.request_timeout(),
            config.allow_private_hosts,
        )?;
        Ok(Some(Arc::new(source)))
    }

    pub fn create_publisher(config: &UpdaterConfig) -> Result<PublisherState> {
        let credentials = match PublishCredentials::from_config(&config.github) {
            Ok(credentials) => credentials,
            Err(reason) => return Ok(PublisherState::Unavailable { reason }),
        };

        let api = GithubContents::new(
            &credentials,
            &config.github.api_url,
            config.github.branch.clone(),
            config.request_timeout(),
        )?;
        Ok(PublisherState::Ready(RemotePublisher::new(Arc::new(api))))
    }
}
