//! Finding and category definitions shared by every stage of the pipeline.
//!
//! A [`Finding`] is the unit of output: one reported inconsistency tied to a
//! single [`Category`]. Categories are a closed set; their serialized names
//! are the identifiers users pass on the command line and the identifiers
//! written to the report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::SourcePath;

/// How a category behaves when the caller does or does not supply a list.
///
/// # Examples
///
/// ```
/// use spec_validator_core::{Category, CategoryDefault};
///
/// assert_eq!(Category::DocumentLoadFailed.default_state(), CategoryDefault::Always);
/// assert_eq!(Category::SchemaValidationFailed.default_state(), CategoryDefault::Disabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDefault {
    /// Enabled in every run, whatever the caller asks for.
    Always,
    /// Enabled when no list is supplied, otherwise only when listed.
    Enabled,
    /// Enabled only when the caller lists it.
    Disabled,
}

/// Named class of check that can be selectively enabled per run.
///
/// The variant name is the serialized identifier (`"IncorrectSchemaVersion"`,
/// ...), so reports and `--categories` values use the same spelling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    /// The document does not conform to the specification schema.
    SchemaValidationFailed,
    /// The version directory differs from the declared `info.version`.
    IncorrectSchemaVersion,
    /// A document under `preview/` declares a non-preview version.
    PreviewSchemaWithoutPreviewVersion,
    /// A document under `stable/` declares a preview version.
    StableSchemaWithPreviewVersion,
    /// A `list*` endpoint is exposed through POST.
    ListOperationUsingPost,
    /// The document could not be read or parsed.
    DocumentLoadFailed,
    /// The document path does not follow the directory convention.
    InvalidSourcePath,
}

impl Category {
    /// Every known category, in declaration order.
    pub const ALL: [Category; 7] = [
        Category::SchemaValidationFailed,
        Category::IncorrectSchemaVersion,
        Category::PreviewSchemaWithoutPreviewVersion,
        Category::StableSchemaWithPreviewVersion,
        Category::ListOperationUsingPost,
        Category::DocumentLoadFailed,
        Category::InvalidSourcePath,
    ];

    /// Number of known categories.
    pub const COUNT: usize = Self::ALL.len();

    /// Serialized identifier of this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SchemaValidationFailed => "SchemaValidationFailed",
            Self::IncorrectSchemaVersion => "IncorrectSchemaVersion",
            Self::PreviewSchemaWithoutPreviewVersion => "PreviewSchemaWithoutPreviewVersion",
            Self::StableSchemaWithPreviewVersion => "StableSchemaWithPreviewVersion",
            Self::ListOperationUsingPost => "ListOperationUsingPost",
            Self::DocumentLoadFailed => "DocumentLoadFailed",
            Self::InvalidSourcePath => "InvalidSourcePath",
        }
    }

    /// Built-in default for this category.
    pub fn default_state(self) -> CategoryDefault {
        match self {
            Self::DocumentLoadFailed | Self::InvalidSourcePath => CategoryDefault::Always,
            Self::SchemaValidationFailed => CategoryDefault::Disabled,
            Self::IncorrectSchemaVersion
            | Self::PreviewSchemaWithoutPreviewVersion
            | Self::StableSchemaWithPreviewVersion
            | Self::ListOperationUsingPost => CategoryDefault::Enabled,
        }
    }

    /// Dense index used by [`CategorySet`](crate::CategorySet).
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == trimmed)
            .ok_or_else(|| UnknownCategory(trimmed.to_string()))
    }
}

/// One reported inconsistency or validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub message: String,
}

impl Finding {
    /// Creates a finding for `category`.
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// All findings produced for one document by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub path: SourcePath,
    pub findings: Vec<Finding>,
}

impl ResultRecord {
    pub fn new(path: SourcePath, findings: Vec<Finding>) -> Self {
        Self { path, findings }
    }

    /// Returns `true` when the document produced at least one finding.
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}
