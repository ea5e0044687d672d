use crate::error::{Result, UpdaterError};
use crate::repository::RemoteSource;
use reqwest::blocking::Client;
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const MAX_MANIFEST_BYTES: usize = 10 * 1024 * 1024;

/// Release repository served as raw files over HTTP(S).
pub struct RawRepository {
    client: Client,
    base_url: Url,
    manifest_name: String,
}

impl RawRepository {
    pub fn new(
        base_url: &str,
        manifest_name: &str,
        timeout: Duration,
        allow_private_hosts: bool,
    ) -> Result<Self> {
        let base_url = Self::validate_base_url(base_url, allow_private_hosts)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bot-updater/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpdaterError::Io(std::io::Error::other(e)))?;

        Ok(Self {
            client,
            base_url,
            manifest_name: manifest_name.to_string(),
        })
    }

    /// Append `relative_path` to the base URL segment by segment. Each
    /// segment is percent-encoded, so `?`, `#`, `%` and scheme-like prefixes
    /// stay inside the release directory.
    fn file_url(&self, relative_path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpdaterError::FileFetch {
                path: relative_path.to_string(),
                message: format!("base URL {} cannot hold a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(relative_path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    fn validate_base_url(url: &str, allow_private_hosts: bool) -> Result<Url> {
        let mut parsed = Url::parse(url.trim())
            .map_err(|_| UpdaterError::Config(format!("Invalid base URL: {url}")))?;

        match parsed.scheme() {
            "https" | "http" => {}
            scheme => {
                return Err(UpdaterError::Config(format!(
                    "Unsupported base URL scheme: {scheme}"
                )));
            }
        }

        if !allow_private_hosts {
            if let Some(host) = parsed.host_str() {
                if Self::is_private_host(host) {
                    return Err(UpdaterError::Config(format!(
                        "Base URL host '{host}' is not allowed"
                    )));
                }
            }
        }

        // Url::join replaces the last segment unless the base ends with '/'.
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        Ok(parsed)
    }

    fn is_private_host(host: &str) -> bool {
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            match ip {
                IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
                IpAddr::V6(v6) => v6.is_loopback() || v6.is_unique_local(),
            }
        } else {
            false
        }
    }
}

impl RemoteSource for RawRepository {
    fn fetch_manifest(&self) -> Result<Value> {
        let url = self
            .base_url
            .join(&self.manifest_name)
            .map_err(|e| UpdaterError::ManifestUnreachable(e.to_string()))?;
        debug!(%url, "fetching update manifest");

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| UpdaterError::ManifestUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpdaterError::ManifestUnreachable(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| UpdaterError::ManifestUnreachable(e.to_string()))?;

        if body.len() > MAX_MANIFEST_BYTES {
            return Err(UpdaterError::ManifestUnreachable(
                "manifest exceeded 10MB limit".to_string(),
            ));
        }

        // A body that is not JSON normalizes to "no valid versions".
        match serde_json::from_slice(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(%url, error = %e, "manifest is not valid JSON");
                Ok(Value::Null)
            }
        }
    }

    fn fetch_file(&self, relative_path: &str) -> Result<Vec<u8>> {
        let url = self.file_url(relative_path)?;
        debug!(%url, "downloading file");

        let fetch_error = |message: String| UpdaterError::FileFetch {
            path: relative_path.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
