use crate::error::{Result, UpdaterError};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "updater.toml";
const DEFAULT_MANIFEST_NAME: &str = "update.json";
const DEFAULT_VERSION_FILE: &str = "package.json";
const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Values shipped in sample configs that were never filled in.
const PLACEHOLDER_PATTERN: &str = r"^YOUR_[A-Z0-9_]+$";

static PLACEHOLDER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).ok());

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Raw-content base URL of the release repository.
    pub base_url: Option<String>,
    pub manifest_name: String,
    pub install_root: PathBuf,
    /// Version metadata file, relative to `install_root`.
    pub version_file: PathBuf,
    pub request_timeout_secs: u64,
    pub allow_private_hosts: bool,
    pub confirmation_ttl_secs: Option<u64>,
    pub github: GithubConfig,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            install_root: PathBuf::from("."),
            version_file: PathBuf::from(DEFAULT_VERSION_FILE),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            allow_private_hosts: false,
            confirmation_ttl_secs: None,
            github: GithubConfig::default(),
        }
    }
}

/// Credentials for mirroring updated files to a GitHub repository.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    pub branch: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            api_url: DEFAULT_GITHUB_API.to_string(),
            branch: None,
        }
    }
}

impl UpdaterConfig {
    /// Load the config file, falling back to defaults when it does not
    /// exist, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                UpdaterError::Config(format!("Failed to read {}: {e}", path.display()))
            })?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(base_url) = non_empty("BOT_UPDATER_BASE_URL") {
            self.base_url = Some(base_url);
        }
        if let Some(token) = non_empty("BOT_UPDATER_GITHUB_TOKEN") {
            self.github.token = token;
        }
        if let Some(owner) = non_empty("BOT_UPDATER_GITHUB_OWNER") {
            self.github.owner = owner;
        }
        if let Some(repo) = non_empty("BOT_UPDATER_GITHUB_REPO") {
            self.github.repo = repo;
        }
    }

    /// The configured release base URL, unless it is unset or a placeholder.
    pub fn remote_base_url(&self) -> Result<&str> {
        match self.base_url.as_deref().map(str::trim) {
            None | Some("") => Err(UpdaterError::ConfigurationMissing(
                "set `base_url` in the updater config".to_string(),
            )),
            Some(url) if is_placeholder(url) => Err(UpdaterError::ConfigurationMissing(format!(
                "`base_url` still holds the placeholder '{url}'"
            ))),
            Some(url) => Ok(url),
        }
    }

    pub fn version_file_path(&self) -> PathBuf {
        self.install_root.join(&self.version_file)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirmation_ttl(&self) -> Option<Duration> {
        self.confirmation_ttl_secs.map(Duration::from_secs)
    }
}

/// Whether `value` is an unfilled sample value such as `YOUR_GITHUB_TOKEN`.
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER_RE
        .as_ref()
        .is_some_and(|re| re.is_match(value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn parses_full_config() {
        let config = UpdaterConfig::from_toml_str(
            r#"
            base_url = "https://gitlab.com/acme/bot/-/raw/main/"
            install_root = "/srv/bot"
            confirmation_ttl_secs = 300

            [github]
            token = "ghp_abc"
            owner = "acme"
            repo = "bot"
            branch = "main"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.remote_base_url().unwrap(),
            "https://gitlab.com/acme/bot/-/raw/main/"
        );
        assert_eq!(config.manifest_name, "update.json");
        assert_eq!(config.version_file_path(), PathBuf::from("/srv/bot/package.json"));
        assert_eq!(config.confirmation_ttl(), Some(Duration::from_secs(300)));
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.branch.as_deref(), Some("main"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = UpdaterConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.confirmation_ttl().is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("updater.toml");
        std::fs::write(&path, "base_url = [").unwrap();
        assert!(matches!(
            UpdaterConfig::load(&path).unwrap_err(),
            UpdaterError::Toml(_)
        ));
    }

    #[test]
    fn unset_or_placeholder_base_url_is_missing() {
        let mut config = UpdaterConfig::default();
        assert!(matches!(
            config.remote_base_url().unwrap_err(),
            UpdaterError::ConfigurationMissing(_)
        ));

        config.base_url = Some("YOUR_REPO_RAW_URL_HERE".into());
        assert!(matches!(
            config.remote_base_url().unwrap_err(),
            UpdaterError::ConfigurationMissing(_)
        ));
    }

    #[test]
    fn env_overrides_replace_non_empty_values_only() {
        let env: HashMap<&str, &str> = [
            ("BOT_UPDATER_BASE_URL", "https://example.com/raw/"),
            ("BOT_UPDATER_GITHUB_TOKEN", "ghp_env"),
            ("BOT_UPDATER_GITHUB_OWNER", ""),
        ]
        .into_iter()
        .collect();

        let mut config = UpdaterConfig::default();
        config.github.owner = "from-file".into();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url.as_deref(), Some("https://example.com/raw/"));
        assert_eq!(config.github.token, "ghp_env");
        assert_eq!(config.github.owner, "from-file");
    }

    #[test]
    fn detects_placeholders() {
        assert!(is_placeholder("YOUR_GITHUB_TOKEN"));
        assert!(is_placeholder(" YOUR_REPO_RAW_URL_HERE "));
        assert!(!is_placeholder("ghp_realtoken"));
        assert!(!is_placeholder("your_lowercase"));
        assert!(PLACEHOLDER_RE.is_some());
    }
}
