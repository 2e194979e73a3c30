//! Report serialization.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::report::ReportMap;

/// Supported report formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON with two-space indentation.
    #[default]
    Json,
    Yaml,
}

/// Renders `report` in the requested format.
pub fn format_report(report: &ReportMap, format: OutputFormat) -> Result<String, ValidationError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| ValidationError::Serialize(format!("JSON serialization failed: {e}"))),
        OutputFormat::Yaml => serde_yaml::to_string(report)
            .map_err(|e| ValidationError::Serialize(format!("YAML serialization failed: {e}"))),
    }
}

/// Writes `report` to `path`, replacing any existing file.
///
/// Missing parent directories are created.
pub fn write_report(
    path: &Path,
    report: &ReportMap,
    format: OutputFormat,
) -> Result<(), ValidationError> {
    let output_err = |source: std::io::Error| ValidationError::Output {
        path: path.to_path_buf(),
        source,
    };

    let raw = format_report(report, format)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(output_err)?;
        }
    }
    fs::write(path, raw).map_err(output_err)
}
