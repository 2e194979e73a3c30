//! Core model and consistency checks for versioned API specification trees.
//!
//! This crate defines the pieces of the validation pipeline that do not
//! touch the filesystem layout or threads:
//!
//! - [`SourcePath`] / [`SpecLayout`]: document locations and the
//!   `specification/<ns>/resource-manager/<rns>/<stable|preview>/<version>`
//!   convention they encode.
//! - [`SpecDocument`] / [`DocumentOutcome`]: a loaded document, or the
//!   reason it could not be loaded.
//! - [`Category`] / [`CategorySet`]: the named checks and the per-run
//!   enabled state.
//! - [`ConsistencyChecker`]: applies the enabled [`Rule`]s and returns
//!   [`Finding`]s.
//! - [`SchemaValidator`]: seam for structural schema conformance checks.
//!
//! # Example
//!
//! ```
//! use spec_validator_core::*;
//!
//! let checker = ConsistencyChecker::new(CategorySet::defaults());
//! let path = SourcePath::new(
//!     "specs/specification/foo/resource-manager/bar/preview/2021-01-01-preview/svc.json",
//! );
//! let doc = SpecDocument::parse(r#"{ "info": { "version": "2021-01-01-preview" } }"#).unwrap();
//!
//! assert!(checker.check(&path, &DocumentOutcome::Loaded(doc)).is_empty());
//! ```

mod checks;
mod document;
mod path;
mod registry;
mod types;

pub use checks::{
    CheckContext, ConsistencyChecker, ListOperationUsingPostRule, PreviewWithoutPreviewVersionRule,
    Rule, SchemaValidator, SchemaVersionRule, StableWithPreviewVersionRule, builtin_rules,
    schema_findings,
};
pub use document::{DocumentOutcome, LoadError, Operation, PathItem, SpecDocument};
pub use path::{CONVENTION_SEGMENTS, SourcePath, SourcePathError, SpecLayout, Stability};
pub use registry::CategorySet;
pub use types::{Category, CategoryDefault, Finding, ResultRecord, UnknownCategory};
