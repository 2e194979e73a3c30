//! Source paths and the directory convention they encode.
//!
//! Documents live at
//! `<root>/specification/<namespace>/resource-manager/<resource-namespace>/<stable|preview>/<version>/<file>.json`.
//! The convention is anchored at the end of the path, so the root may have
//! any depth. For a single-segment root such as `azure-rest-api-specs` the
//! stability tier is path segment 5 and the version is segment 6.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SPECIFICATION_DIR: &str = "specification";
const RESOURCE_MANAGER_DIR: &str = "resource-manager";

/// Number of trailing segments the convention occupies, from
/// `specification` to the file name inclusive.
pub const CONVENTION_SEGMENTS: usize = 7;

/// Stability tier of a specification version directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Preview,
}

impl Stability {
    /// Directory name for this tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Preview => "preview",
        }
    }

    /// Parses a directory name; only the exact names are recognized.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "stable" => Some(Self::Stable),
            "preview" => Some(Self::Preview),
            _ => None,
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path that does not follow the specification directory convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourcePathError {
    /// Fewer segments than the convention requires.
    #[error("path '{path}' has {found} segment(s), expected at least {CONVENTION_SEGMENTS}")]
    TooFewSegments { path: String, found: usize },
    /// A fixed directory name is not where the convention puts it.
    #[error("path '{path}': expected '{expected}' at segment {index}, found '{found}'")]
    UnexpectedSegment {
        path: String,
        index: usize,
        expected: &'static str,
        found: String,
    },
    /// The stability directory is neither `stable` nor `preview`.
    #[error("path '{path}': unknown stability tier '{found}'")]
    UnknownStability { path: String, found: String },
    /// A positional segment is empty (e.g. a doubled slash).
    #[error("path '{path}': empty segment at index {index}")]
    EmptySegment { path: String, index: usize },
}

/// Immutable, `/`-separated location of one specification document.
///
/// # Examples
///
/// ```
/// use spec_validator_core::{SourcePath, Stability};
///
/// let path = SourcePath::new(
///     "azure-rest-api-specs/specification/compute/resource-manager/Microsoft.Compute/stable/2020-01-01/compute.json",
/// );
/// let layout = path.layout().unwrap();
/// assert_eq!(layout.stability, Stability::Stable);
/// assert_eq!(layout.version, "2020-01-01");
/// assert_eq!(path.segments().nth(6), Some("2020-01-01"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourcePath(String);

impl SourcePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Converts a filesystem path, normalizing separators to `/` and
    /// dropping leading `.` components.
    pub fn from_path(path: &Path) -> Self {
        let cleaned: PathBuf = path
            .components()
            .skip_while(|component| matches!(component, Component::CurDir))
            .collect();
        let raw = cleaned.to_string_lossy();
        if std::path::MAIN_SEPARATOR == '/' {
            Self(raw.into_owned())
        } else {
            Self(raw.replace(std::path::MAIN_SEPARATOR, "/"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Parses the convention-defined segments.
    ///
    /// # Errors
    ///
    /// Returns a [`SourcePathError`] when the path is too short, a fixed
    /// directory name is missing, the stability tier is unknown, or a
    /// positional segment is empty.
    pub fn layout(&self) -> Result<SpecLayout<'_>, SourcePathError> {
        let segments: Vec<&str> = self.segments().collect();
        let count = segments.len();
        if count < CONVENTION_SEGMENTS {
            return Err(SourcePathError::TooFewSegments {
                path: self.0.clone(),
                found: count,
            });
        }

        let base = count - CONVENTION_SEGMENTS;
        self.expect_segment(&segments, base, SPECIFICATION_DIR)?;
        self.expect_segment(&segments, base + 2, RESOURCE_MANAGER_DIR)?;

        if let Some(offset) = segments[base + 1..].iter().position(|s| s.is_empty()) {
            return Err(SourcePathError::EmptySegment {
                path: self.0.clone(),
                index: base + 1 + offset,
            });
        }

        let stability_dir = segments[base + 4];
        let stability = Stability::from_dir_name(stability_dir).ok_or_else(|| {
            SourcePathError::UnknownStability {
                path: self.0.clone(),
                found: stability_dir.to_string(),
            }
        })?;

        Ok(SpecLayout {
            namespace: segments[base + 1],
            resource_namespace: segments[base + 3],
            stability,
            version: segments[base + 5],
            file_name: segments[base + 6],
        })
    }

    fn expect_segment(
        &self,
        segments: &[&str],
        index: usize,
        expected: &'static str,
    ) -> Result<(), SourcePathError> {
        if segments[index] == expected {
            Ok(())
        } else {
            Err(SourcePathError::UnexpectedSegment {
                path: self.0.clone(),
                index,
                expected,
                found: segments[index].to_string(),
            })
        }
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Path> for SourcePath {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

/// Convention-defined view of a [`SourcePath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecLayout<'a> {
    pub namespace: &'a str,
    pub resource_namespace: &'a str,
    pub stability: Stability,
    pub version: &'a str,
    pub file_name: &'a str,
}

impl SpecLayout<'_> {
    pub fn is_preview(&self) -> bool {
        self.stability == Stability::Preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "azure-rest-api-specs/specification/foo/resource-manager/Microsoft.Foo/preview/2021-01-01-preview/foo.json";

    #[test]
    fn test_layout_matches_positional_indices_for_single_segment_root() {
        let path = SourcePath::new(CANONICAL);
        let segments: Vec<&str> = path.segments().collect();
        let layout = path.layout().unwrap();

        assert_eq!(segments[5], layout.stability.as_str());
        assert_eq!(segments[6], layout.version);
        assert_eq!(layout.namespace, "foo");
        assert_eq!(layout.resource_namespace, "Microsoft.Foo");
        assert_eq!(layout.file_name, "foo.json");
        assert!(layout.is_preview());
    }

    #[test]
    fn test_from_path_drops_leading_current_dir() {
        let path = SourcePath::from_path(Path::new(&format!("./{CANONICAL}")));
        assert_eq!(path.as_str(), CANONICAL);
        assert_eq!(path.segments().nth(5), Some("preview"));
        assert_eq!(path.segments().nth(6), Some("2021-01-01-preview"));

        let absolute = SourcePath::from_path(Path::new("/srv/./specs/a.json"));
        assert_eq!(absolute.as_str(), "/srv/specs/a.json");
    }

    #[test]
    fn test_layout_is_anchored_at_the_end_for_deeper_roots() {
        let path = SourcePath::new(format!("/tmp/run/{CANONICAL}"));
        let layout = path.layout().unwrap();
        assert_eq!(layout.version, "2021-01-01-preview");
        assert_eq!(layout.stability, Stability::Preview);
    }

    #[test]
    fn test_layout_rejects_short_paths() {
        let err = SourcePath::new("stable/2020-01-01/a.json").layout().unwrap_err();
        assert!(matches!(
            err,
            SourcePathError::TooFewSegments { found: 3, .. }
        ));
    }

    #[test]
    fn test_layout_rejects_missing_resource_manager() {
        let path = SourcePath::new("specification/foo/data-plane/Foo/stable/2020-01-01/a.json");
        let err = path.layout().unwrap_err();
        assert!(matches!(
            err,
            SourcePathError::UnexpectedSegment {
                expected: "resource-manager",
                index: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_layout_rejects_unknown_stability() {
        let path = SourcePath::new("specification/foo/resource-manager/Foo/beta/2020-01-01/a.json");
        assert!(matches!(
            path.layout(),
            Err(SourcePathError::UnknownStability { .. })
        ));
    }

    #[test]
    fn test_layout_rejects_empty_version_segment() {
        let path = SourcePath::new("specification/foo/resource-manager/Foo/stable//a.json");
        assert!(matches!(
            path.layout(),
            Err(SourcePathError::EmptySegment { index: 5, .. })
        ));
    }

    #[test]
    fn test_source_path_serializes_as_plain_string() {
        let path = SourcePath::new(CANONICAL);
        assert_eq!(
            serde_json::to_string(&path).unwrap(),
            format!("\"{CANONICAL}\"")
        );
    }
}
