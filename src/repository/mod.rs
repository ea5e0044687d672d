use crate::error::Result;
use serde_json::Value;

pub mod factory;
pub use factory::RemoteFactory;

/// Where releases are published: the manifest plus raw file contents.
pub trait RemoteSource: Send + Sync {
    /// Fetch and decode the update manifest.
    fn fetch_manifest(&self) -> Result<Value>;

    /// Fetch the raw bytes of a file relative to the release base URL.
    fn fetch_file(&self, relative_path: &str) -> Result<Vec<u8>>;
}

/// Request body for a create-or-update call against a source-control host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutFileRequest<'a> {
    pub path: &'a str,
    pub message: &'a str,
    pub content_base64: &'a str,
    /// Revision marker of the file being replaced; `None` creates a new file.
    pub sha: Option<&'a str>,
}

/// The subset of a source-control host's contents API used for mirroring.
pub trait ContentsApi: Send + Sync {
    /// Current revision marker of `path`, or `None` when the file does not exist.
    fn file_revision(&self, path: &str) -> Result<Option<String>>;

    fn put_file(&self, request: &PutFileRequest<'_>) -> Result<()>;
}
