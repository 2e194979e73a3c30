//! Consistency checks run against every loaded document.
//!
//! Each check is a [`Rule`] bound to one [`Category`]. The
//! [`ConsistencyChecker`] evaluates the enabled rules in a fixed order:
//!
//! 1. [`SchemaVersionRule`]: version directory vs. `info.version`
//! 2. [`PreviewWithoutPreviewVersionRule`]
//! 3. [`StableWithPreviewVersionRule`]
//! 4. [`ListOperationUsingPostRule`]
//!
//! # Examples
//!
//! ```
//! use spec_validator_core::*;
//!
//! let checker = ConsistencyChecker::new(CategorySet::defaults());
//! let path = SourcePath::new(
//!     "specs/specification/foo/resource-manager/bar/stable/2020-01-01/svc.json",
//! );
//! let doc = SpecDocument::parse(r#"{ "info": { "version": "2020-01-02" } }"#).unwrap();
//!
//! let findings = checker.check(&path, &DocumentOutcome::Loaded(doc));
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].category, Category::IncorrectSchemaVersion);
//! ```

use tracing::debug;

use crate::document::{DocumentOutcome, Operation, SpecDocument};
use crate::path::{SourcePath, SpecLayout};
use crate::registry::CategorySet;
use crate::types::{Category, Finding};

const PREVIEW_MARKER: &str = "preview";
const LIST_PREFIX: &str = "list";

/// Inputs available to a rule for one document.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub path: &'a SourcePath,
    /// Parsed directory convention; `None` when the path does not follow it.
    pub layout: Option<SpecLayout<'a>>,
    pub document: &'a SpecDocument,
}

impl CheckContext<'_> {
    /// Declared version, with a missing `info.version` read as empty.
    pub fn declared_version(&self) -> &str {
        self.document.declared_version().unwrap_or_default()
    }
}

/// A single consistency check.
pub trait Rule: Send + Sync {
    /// Category this rule reports under; the rule only runs when it is enabled.
    fn category(&self) -> Category;

    /// Appends zero or more findings for the document in `ctx`.
    fn check(&self, ctx: &CheckContext<'_>, findings: &mut Vec<Finding>);
}

/// Reports a version directory that differs from `info.version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaVersionRule;

impl Rule for SchemaVersionRule {
    fn category(&self) -> Category {
        Category::IncorrectSchemaVersion
    }

    fn check(&self, ctx: &CheckContext<'_>, findings: &mut Vec<Finding>) {
        let Some(layout) = ctx.layout else {
            return;
        };
        let declared = ctx.declared_version();
        if layout.version != declared {
            findings.push(Finding::new(
                self.category(),
                format!(
                    "incorrect schema version. Path: {}, Spec: {declared}",
                    layout.version
                ),
            ));
        }
    }
}

/// Reports a document under `preview/` whose version lacks `preview`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewWithoutPreviewVersionRule;

impl Rule for PreviewWithoutPreviewVersionRule {
    fn category(&self) -> Category {
        Category::PreviewSchemaWithoutPreviewVersion
    }

    fn check(&self, ctx: &CheckContext<'_>, findings: &mut Vec<Finding>) {
        let Some(layout) = ctx.layout else {
            return;
        };
        let declared = ctx.declared_version();
        if layout.is_preview() && !declared.contains(PREVIEW_MARKER) {
            findings.push(Finding::new(
                self.category(),
                format!(
                    "preview schema without preview version. Path: {}, Spec: {declared}",
                    layout.version
                ),
            ));
        }
    }
}

/// Reports a document under `stable/` whose version contains `preview`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StableWithPreviewVersionRule;

impl Rule for StableWithPreviewVersionRule {
    fn category(&self) -> Category {
        Category::StableSchemaWithPreviewVersion
    }

    fn check(&self, ctx: &CheckContext<'_>, findings: &mut Vec<Finding>) {
        let Some(layout) = ctx.layout else {
            return;
        };
        let declared = ctx.declared_version();
        if !layout.is_preview() && declared.contains(PREVIEW_MARKER) {
            findings.push(Finding::new(
                self.category(),
                format!(
                    "stable schema with preview version. Path: {}, Spec: {declared}",
                    layout.version
                ),
            ));
        }
    }
}

/// Reports `list*` endpoints that define a POST operation.
///
/// Only the last `/`-separated segment of the URL template is inspected, and
/// the prefix match is case-sensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOperationUsingPostRule;

impl Rule for ListOperationUsingPostRule {
    fn category(&self) -> Category {
        Category::ListOperationUsingPost
    }

    fn check(&self, ctx: &CheckContext<'_>, findings: &mut Vec<Finding>) {
        for (url, item) in ctx.document.paths() {
            let ending = url.rsplit('/').next().unwrap_or(url);
            if item.defines(Operation::Post) && ending.starts_with(LIST_PREFIX) {
                findings.push(Finding::new(
                    self.category(),
                    format!("list operation using post. Path: {url}"),
                ));
            }
        }
    }
}

/// Built-in rules in evaluation order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(SchemaVersionRule),
        Box::new(PreviewWithoutPreviewVersionRule),
        Box::new(StableWithPreviewVersionRule),
        Box::new(ListOperationUsingPostRule),
    ]
}

/// Applies every enabled rule to one document.
pub struct ConsistencyChecker {
    categories: CategorySet,
    rules: Vec<Box<dyn Rule>>,
}

impl ConsistencyChecker {
    /// Checker running the [`builtin_rules`].
    pub fn new(categories: CategorySet) -> Self {
        Self::with_rules(categories, builtin_rules())
    }

    /// Checker running `rules` in the given order.
    pub fn with_rules(categories: CategorySet, rules: Vec<Box<dyn Rule>>) -> Self {
        Self { categories, rules }
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Produces the findings for one document, in rule order.
    ///
    /// A document that failed to load yields a single
    /// [`Category::DocumentLoadFailed`] finding and no rule runs. A path that
    /// does not follow the directory convention yields a
    /// [`Category::InvalidSourcePath`] finding; rules that depend on the
    /// layout then skip the document while the others still run.
    pub fn check(&self, path: &SourcePath, outcome: &DocumentOutcome) -> Vec<Finding> {
        let mut findings = Vec::new();

        let document = match outcome {
            DocumentOutcome::Loaded(document) => document,
            DocumentOutcome::LoadFailed(err) => {
                if self.categories.is_enabled(Category::DocumentLoadFailed) {
                    findings.push(Finding::new(Category::DocumentLoadFailed, err.to_string()));
                }
                return findings;
            }
        };

        let layout = match path.layout() {
            Ok(layout) => Some(layout),
            Err(err) => {
                debug!(path = %path, error = %err, "path does not follow the directory convention");
                if self.categories.is_enabled(Category::InvalidSourcePath) {
                    findings.push(Finding::new(Category::InvalidSourcePath, err.to_string()));
                }
                None
            }
        };

        let ctx = CheckContext {
            path,
            layout,
            document,
        };

        for rule in &self.rules {
            if self.categories.is_enabled(rule.category()) {
                rule.check(&ctx, &mut findings);
            }
        }

        findings
    }
}

impl std::fmt::Debug for ConsistencyChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules: Vec<Category> = self.rules.iter().map(|rule| rule.category()).collect();
        f.debug_struct("ConsistencyChecker")
            .field("categories", &self.categories)
            .field("rules", &rules)
            .finish()
    }
}

/// Structural conformance check supplied by the caller.
///
/// Implementations return one human-readable message per violation; the
/// caller reports each as a [`Category::SchemaValidationFailed`] finding.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, document: &SpecDocument) -> Vec<String>;
}

/// Wraps schema violations for `document` as findings.
pub fn schema_findings(validator: &dyn SchemaValidator, document: &SpecDocument) -> Vec<Finding> {
    validator
        .validate(document)
        .into_iter()
        .map(|message| Finding::new(Category::SchemaValidationFailed, message))
        .collect()
}
