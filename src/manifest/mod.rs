pub mod normalize;
pub mod version;

pub use normalize::{ManifestEntry, ManifestNormalizer};
pub use version::{ReleaseVersion, VersionComparator};
