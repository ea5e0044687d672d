use crate::manifest::version::ReleaseVersion;
use serde::Serialize;
use serde_json::Value;

/// One release listed in the remote manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub version: String,
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
}

impl ManifestEntry {
    pub fn release_version(&self) -> ReleaseVersion {
        ReleaseVersion::parse(&self.version)
    }

    /// Builds an entry from a JSON object, or `None` when the object lacks a
    /// non-empty `version` string or a `files` array.
    fn from_value(value: &Value) -> Option<Self> {
        let version = value
            .get("version")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())?;
        let files = value.get("files").and_then(Value::as_array)?;

        let changelog = value
            .get("changelog")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Some(ManifestEntry {
            version: version.to_string(),
            files: files
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            changelog,
        })
    }
}

/// Reduces the accepted manifest shapes to a flat list of entries.
///
/// Two shapes are understood: `{"versions": [entry, ...]}` and a bare entry
/// object. Malformed entries are dropped without error; an empty result means
/// the manifest has no usable versions.
pub struct ManifestNormalizer;

impl ManifestNormalizer {
    pub fn normalize(raw: &Value) -> Vec<ManifestEntry> {
        if let Some(versions) = raw.get("versions").and_then(Value::as_array) {
            return versions.iter().filter_map(ManifestEntry::from_value).collect();
        }

        ManifestEntry::from_value(raw).into_iter().collect()
    }
}
