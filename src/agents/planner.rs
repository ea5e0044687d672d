use crate::error::{Result, UpdaterError};
use crate::manifest::{ManifestEntry, ReleaseVersion, VersionComparator};
use std::collections::HashSet;

pub const NO_CHANGELOG: &str = "No changelog provided.";

/// Files and changelog needed to move from the local version to the newest
/// release in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    pub target_version: String,
    pub files: Vec<String>,
    pub changelog_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Update(UpdatePlan),
    UpToDate { local_version: String },
}

pub struct UpdatePlanner;

impl UpdatePlanner {
    /// Merge every release newer than `local` into a single plan.
    ///
    /// Newer releases are applied oldest first: changelog lines read in that
    /// order, the file list keeps the first position each path was seen at,
    /// and the target is the highest release.
    pub fn plan(mut entries: Vec<ManifestEntry>, local: &ReleaseVersion) -> Result<PlanOutcome> {
        entries.sort_by(|a, b| VersionComparator::compare(&b.version, &a.version));

        if entries.is_empty() {
            return Err(UpdaterError::ManifestInvalid);
        }

        let mut newer: Vec<ManifestEntry> = entries
            .into_iter()
            .filter(|entry| entry.release_version() > *local)
            .collect();

        if newer.is_empty() {
            return Ok(PlanOutcome::UpToDate {
                local_version: local.original.clone(),
            });
        }

        newer.sort_by(|a, b| VersionComparator::compare(&a.version, &b.version));

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for entry in &newer {
            for file in &entry.files {
                if seen.insert(file.as_str()) {
                    files.push(file.clone());
                }
            }
        }

        let changelog_lines = newer
            .iter()
            .map(|entry| {
                format!(
                    "v{}: {}",
                    entry.version,
                    entry.changelog.as_deref().unwrap_or(NO_CHANGELOG)
                )
            })
            .collect();

        let target_version = newer
            .last()
            .map(|entry| entry.version.clone())
            .ok_or(UpdaterError::ManifestInvalid)?;

        Ok(PlanOutcome::Update(UpdatePlan {
            target_version,
            files,
            changelog_lines,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str, files: &[&str], changelog: Option<&str>) -> ManifestEntry {
        ManifestEntry {
            version: version.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
            changelog: changelog.map(str::to_string),
        }
    }

    #[test]
    fn merges_newer_releases_in_ascending_order() {
        let entries = vec![
            entry("1.2.0", &["y", "x"], Some("second")),
            entry("1.1.0", &["x"], None),
            entry("0.9.0", &["old"], Some("ancient")),
        ];

        let outcome = UpdatePlanner::plan(entries, &ReleaseVersion::parse("1.0.0")).unwrap();
        let PlanOutcome::Update(plan) = outcome else {
            panic!("expected an update plan");
        };

        assert_eq!(plan.target_version, "1.2.0");
        assert_eq!(plan.files, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(
            plan.changelog_lines,
            vec![
                format!("v1.1.0: {NO_CHANGELOG}"),
                "v1.2.0: second".to_string()
            ]
        );
    }

    #[test]
    fn up_to_date_when_nothing_is_newer() {
        let entries = vec![entry("1.0.0", &["a"], None), entry("0.5.0", &["b"], None)];

        let outcome = UpdatePlanner::plan(entries.clone(), &ReleaseVersion::parse("1.0.0")).unwrap();
        assert_eq!(
            outcome,
            PlanOutcome::UpToDate {
                local_version: "1.0.0".into()
            }
        );

        let outcome = UpdatePlanner::plan(entries, &ReleaseVersion::parse("3.0")).unwrap();
        assert!(matches!(outcome, PlanOutcome::UpToDate { .. }));
    }

    #[test]
    fn empty_manifest_is_invalid() {
        let err = UpdatePlanner::plan(Vec::new(), &ReleaseVersion::parse("1.0.0")).unwrap_err();
        assert!(matches!(err, UpdaterError::ManifestInvalid));
    }

    #[test]
    fn target_is_strictly_newer_than_local() {
        let entries = vec![entry("1.0", &["same"], None), entry("1.0.1", &[], None)];
        let outcome = UpdatePlanner::plan(entries, &ReleaseVersion::parse("1.0.0")).unwrap();
        let PlanOutcome::Update(plan) = outcome else {
            panic!("expected an update plan");
        };
        assert_eq!(plan.target_version, "1.0.1");
        assert!(plan.files.is_empty());
        assert_eq!(plan.changelog_lines.len(), 1);
    }
}
