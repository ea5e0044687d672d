use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// Release version as it appears in the manifest or the local metadata file.
///
/// Parsing is lenient: up to three dot-separated components are read, a
/// component that is missing or does not start with digits counts as zero,
/// and anything past the third component is ignored. Two versions are equal
/// when their numeric triples are equal, so `1.0` and `1.0.0` compare equal.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    pub original: String,
    pub triple: Version,
}

impl ReleaseVersion {
    pub fn parse(version: &str) -> Self {
        let mut components = version.split('.').map(Self::parse_component);
        let major = components.next().unwrap_or(0);
        let minor = components.next().unwrap_or(0);
        let patch = components.next().unwrap_or(0);

        ReleaseVersion {
            original: version.to_string(),
            triple: Version::new(major, minor, patch),
        }
    }

    /// Non-string values (numbers, null, objects) parse as `0.0.0`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value.as_str() {
            Some(s) => Self::parse(s),
            None => ReleaseVersion {
                original: value.to_string(),
                triple: Version::new(0, 0, 0),
            },
        }
    }

    fn parse_component(component: &str) -> u64 {
        let digits: String = component
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse::<u64>().unwrap_or(0)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.triple == other.triple
    }
}

impl Eq for ReleaseVersion {}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Only numeric components are produced, so this is a plain
        // (major, minor, patch) comparison.
        self.triple.cmp(&other.triple)
    }
}

pub struct VersionComparator;

impl VersionComparator {
    /// Order two version strings by their (major, minor, patch) triples.
    pub fn compare(a: &str, b: &str) -> Ordering {
        ReleaseVersion::parse(a).cmp(&ReleaseVersion::parse(b))
    }
}
