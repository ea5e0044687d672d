use crate::error::{Result, UpdaterError};
use crate::manifest::ReleaseVersion;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const FALLBACK_VERSION: &str = "0.0.0";

/// Local version metadata: a JSON object (typically `package.json`) whose
/// `version` field records the installed release.
pub struct VersionFile {
    path: PathBuf,
}

impl VersionFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Installed version; a missing `version` field reads as `0.0.0`.
    pub fn read_version(&self) -> Result<ReleaseVersion> {
        let document = self.load()?;
        Ok(match document.get("version") {
            Some(value) => ReleaseVersion::from_json(value),
            None => ReleaseVersion::parse(FALLBACK_VERSION),
        })
    }

    /// Rewrite the `version` field, leaving every other key in place.
    pub fn write_version(&self, version: &str) -> Result<()> {
        let mut document = self.load()?;
        if let Value::Object(map) = &mut document {
            map.insert("version".to_string(), Value::String(version.to_string()));
        }

        let rendered = serde_json::to_string_pretty(&document)?;
        fs::write(&self.path, rendered).map_err(|e| {
            UpdaterError::VersionMetadata(format!(
                "Failed to write {}: {e}",
                self.path.display()
            ))
        })?;

        info!(path = %self.path.display(), version, "local version updated");
        Ok(())
    }

    fn load(&self) -> Result<Value> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            UpdaterError::VersionMetadata(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        let document: Value = serde_json::from_str(&content).map_err(|e| {
            UpdaterError::VersionMetadata(format!(
                "Failed to parse {}: {e}",
                self.path.display()
            ))
        })?;

        if !document.is_object() {
            return Err(UpdaterError::VersionMetadata(format!(
                "{} is not a JSON object",
                self.path.display()
            )));
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_and_rewrites_version_preserving_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(
            &path,
            r#"{"name":"bot","version":"1.0.0","dependencies":{"axios":"^1.6.0"}}"#,
        )
        .unwrap();

        let file = VersionFile::new(&path);
        assert_eq!(file.read_version().unwrap().original, "1.0.0");

        file.write_version("1.2.0").unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"name\": \"bot\",\n  \"version\": \"1.2.0\",\n  \"dependencies\": {\n    \"axios\": \"^1.6.0\"\n  }\n}"
        );
        assert_eq!(file.read_version().unwrap().original, "1.2.0");
    }

    #[test]
    fn missing_version_field_reads_as_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"name":"bot"}"#).unwrap();

        let version = VersionFile::new(&path).read_version().unwrap();
        assert_eq!(version, ReleaseVersion::parse("0.0.0"));
    }

    #[test]
    fn missing_or_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = VersionFile::new(dir.path().join("nope.json"));
        assert!(matches!(
            missing.read_version().unwrap_err(),
            UpdaterError::VersionMetadata(_)
        ));

        let path = dir.path().join("array.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            VersionFile::new(&path).write_version("1.0.0").unwrap_err(),
            UpdaterError::VersionMetadata(_)
        ));
    }
}
