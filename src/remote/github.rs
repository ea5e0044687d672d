use crate::agents::publisher::PublishCredentials;
use crate::error::{Result, UpdaterError};
use crate::repository::{ContentsApi, PutFileRequest};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// GitHub "repository contents" API client.
pub struct GithubContents {
    client: Client,
    api_url: Url,
    owner: String,
    repo: String,
    token: String,
    branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentMetadata {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

impl GithubContents {
    pub fn new(
        credentials: &PublishCredentials,
        api_url: &str,
        branch: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bot-updater/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpdaterError::Io(std::io::Error::other(e)))?;

        let api_url = Url::parse(api_url.trim())
            .map_err(|_| UpdaterError::Config(format!("Invalid GitHub API URL: {api_url}")))?;

        Ok(Self {
            client,
            api_url,
            owner: credentials.owner.clone(),
            repo: credentials.repo.clone(),
            token: credentials.token.clone(),
            branch,
        })
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}` with every segment
    /// percent-encoded.
    fn contents_url(&self, path: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpdaterError::Config(format!("Invalid GitHub API URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
    }

    fn failure(path: &str, response: Response) -> UpdaterError {
        let status = response.status();
        let detail = response
            .json::<ApiError>()
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.to_string());

        UpdaterError::Publish {
            path: path.to_string(),
            message: detail,
        }
    }
}

impl ContentsApi for GithubContents {
    fn file_revision(&self, path: &str) -> Result<Option<String>> {
        let mut request = self.client.get(self.contents_url(path)?);
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = self
            .authorized(request)
            .send()
            .map_err(|e| UpdaterError::Publish {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "no remote file yet");
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Self::failure(path, response));
        }

        let metadata: ContentMetadata = response.json().map_err(|e| UpdaterError::Publish {
            path: path.to_string(),
            message: format!("unexpected metadata response: {e}"),
        })?;
        Ok(Some(metadata.sha))
    }

    fn put_file(&self, request: &PutFileRequest<'_>) -> Result<()> {
        let body = PutContentBody {
            message: request.message,
            content: request.content_base64,
            sha: request.sha,
            branch: self.branch.as_deref(),
        };

        let response = self
            .authorized(self.client.put(self.contents_url(request.path)?))
            .json(&body)
            .send()
            .map_err(|e| UpdaterError::Publish {
                path: request.path.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Self::failure(request.path, response));
        }

        debug!(path = request.path, status = %response.status(), "remote file written");
        Ok(())
    }
}
