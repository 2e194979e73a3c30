//! Loaded specification documents.
//!
//! A [`SpecDocument`] keeps the raw JSON (for schema validation) alongside a
//! typed view of the parts the consistency rules read: `info.version` and
//! the operations defined under `paths`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// HTTP operation that a Swagger path item may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Get,
        Operation::Put,
        Operation::Post,
        Operation::Delete,
        Operation::Options,
        Operation::Head,
        Operation::Patch,
    ];

    /// Key of this operation inside a path item object.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations defined for one URL template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathItem {
    operations: BTreeSet<Operation>,
}

impl PathItem {
    pub fn new(operations: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            operations: operations.into_iter().collect(),
        }
    }

    pub fn defines(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.operations.iter().copied()
    }
}

#[derive(Debug, Default, Deserialize)]
struct Info {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Header {
    #[serde(default)]
    info: Option<Info>,
    #[serde(default)]
    paths: Option<Map<String, Value>>,
}

/// Errors raised while reading or parsing a document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a well-formed specification document.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory, read-only representation of one specification file.
///
/// # Examples
///
/// ```
/// use spec_validator_core::{Operation, SpecDocument};
///
/// let doc = SpecDocument::parse(r#"{
///     "swagger": "2.0",
///     "info": { "title": "Items", "version": "2020-01-01" },
///     "paths": { "/items/list": { "post": { "responses": {} } } }
/// }"#).unwrap();
///
/// assert_eq!(doc.declared_version(), Some("2020-01-01"));
/// let (url, item) = doc.paths().next().unwrap();
/// assert_eq!(url, "/items/list");
/// assert!(item.defines(Operation::Post));
/// ```
#[derive(Debug, Clone)]
pub struct SpecDocument {
    raw: Value,
    version: Option<String>,
    paths: BTreeMap<String, PathItem>,
}

impl SpecDocument {
    /// Reads and parses a document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read and
    /// [`LoadError::Parse`] if it is not a valid specification document.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| LoadError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parses a document from JSON text.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Builds a document from an already-parsed JSON value.
    ///
    /// Fails if `info`, `info.version`, `paths` or a path item has the wrong
    /// JSON type. Only keys starting with `/` are path items; vendor
    /// extensions (`x-*`, any case) and other keys under `paths` are skipped.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        if !raw.is_object() {
            return Err(serde::de::Error::custom(
                "specification document must be a JSON object",
            ));
        }
        let header = Header::deserialize(&raw)?;
        let mut paths = BTreeMap::new();

        for (url, item) in header.paths.unwrap_or_default() {
            if !url.starts_with('/') {
                continue;
            }
            let object = Map::<String, Value>::deserialize(&item)?;
            let operations = Operation::ALL
                .into_iter()
                .filter(|op| object.get(op.as_str()).is_some_and(|v| !v.is_null()));
            paths.insert(url, PathItem::new(operations));
        }

        Ok(Self {
            version: header.info.and_then(|info| info.version),
            raw,
            paths,
        })
    }

    /// The declared `info.version`, if present.
    pub fn declared_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Path items keyed by URL template, in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = (&str, &PathItem)> {
        self.paths.iter().map(|(url, item)| (url.as_str(), item))
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Per-file load result handed to the checks.
#[derive(Debug)]
pub enum DocumentOutcome {
    Loaded(SpecDocument),
    LoadFailed(LoadError),
}

impl DocumentOutcome {
    /// Loads `path`, capturing a failure instead of returning it.
    pub fn load(path: &Path) -> Self {
        SpecDocument::load(path).into()
    }

    pub fn document(&self) -> Option<&SpecDocument> {
        match self {
            Self::Loaded(document) => Some(document),
            Self::LoadFailed(_) => None,
        }
    }
}

impl From<Result<SpecDocument, LoadError>> for DocumentOutcome {
    fn from(result: Result<SpecDocument, LoadError>) -> Self {
        match result {
            Ok(document) => Self::Loaded(document),
            Err(err) => Self::LoadFailed(err),
        }
    }
}
