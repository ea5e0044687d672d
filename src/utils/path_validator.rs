use crate::error::{Result, UpdaterError};
use std::path::{Component, Path, PathBuf};

/// Path checks that keep manifest-driven writes inside the install root.
pub struct PathValidator;

impl PathValidator {
    /// Validates and canonicalises the install root.
    pub fn validate_install_root(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            UpdaterError::Config(format!("Invalid install root '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(UpdaterError::Config(format!(
                "Install root '{}' is not a directory",
                canonical.display()
            )));
        }

        const FORBIDDEN: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

        for forbidden in FORBIDDEN {
            let forbidden_path = Path::new(forbidden);

            if path.starts_with(forbidden_path) || canonical.starts_with(forbidden_path) {
                return Err(UpdaterError::Config(format!(
                    "Installing into system directory '{}' is not allowed",
                    forbidden
                )));
            }

            if let Ok(canonical_forbidden) = forbidden_path.canonicalize() {
                if canonical.starts_with(&canonical_forbidden) {
                    return Err(UpdaterError::Config(format!(
                        "Installing into system directory '{}' is not allowed",
                        forbidden
                    )));
                }
            }
        }

        Ok(canonical)
    }

    /// Resolves a manifest path against the install root.
    ///
    /// Only plain relative paths are accepted: no root, drive prefix or `..`.
    pub fn resolve_relative(install_root: impl AsRef<Path>, relative: &str) -> Result<PathBuf> {
        let unsafe_path = |reason: &str| UpdaterError::UnsafePath {
            path: relative.to_string(),
            reason: reason.to_string(),
        };

        if relative.trim().is_empty() {
            return Err(unsafe_path("path is empty"));
        }

        if relative.starts_with('/') || relative.starts_with('\\') {
            return Err(unsafe_path("absolute paths are not allowed"));
        }

        let candidate = Path::new(relative);
        for component in candidate.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => {
                    return Err(unsafe_path("parent directory references are not allowed"));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(unsafe_path("absolute paths are not allowed"));
                }
            }
        }

        Ok(install_root.as_ref().join(candidate))
    }
}
