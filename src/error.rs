use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdaterError {
    #[error("Remote base URL is not configured: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to fetch update manifest: {0}")]
    ManifestUnreachable(String),

    #[error("Remote manifest does not contain any valid versions")]
    ManifestInvalid,

    #[error("Failed to download {path}: {message}")]
    FileFetch { path: String, message: String },

    #[error("Refusing to write '{path}': {reason}")]
    UnsafePath { path: String, reason: String },

    #[error("Version metadata error: {0}")]
    VersionMetadata(String),

    #[error("Failed to push {path}: {message}")]
    Publish { path: String, message: String },

    #[error("Chat transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UpdaterError>;
