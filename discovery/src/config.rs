//! Run configuration.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags (or their `AZ_SPEC_VALIDATOR_*` environment variables), an optional
//! YAML file, and the built-in defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! source: ./azure-rest-api-specs
//! output: reports/validation-errors.json
//! format: json
//! categories:
//!   - IncorrectSchemaVersion
//!   - ListOperationUsingPost
//! schema_file: schemas/swagger-2.0.json
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spec_validator_core::CategorySet;

use crate::error::ConfigError;
use crate::output::OutputFormat;

/// Default specification tree root.
pub const DEFAULT_SOURCE: &str = "./azure-rest-api-specs";
/// Default report path.
pub const DEFAULT_OUTPUT: &str = "validation-errors.json";
/// Prefix of the environment variables bound to command-line flags.
pub const ENV_PREFIX: &str = "AZ_SPEC_VALIDATOR";
/// Number of concurrent validation workers.
pub const DEFAULT_WORKERS: usize = 10;

/// Fully resolved settings for one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Root containing the `specification` directory.
    pub source: PathBuf,
    /// Report destination; overwritten if it exists.
    pub output: PathBuf,
    /// Categories to enable; `None` selects the built-in defaults.
    pub categories: Option<Vec<String>>,
    pub format: OutputFormat,
    /// Schema replacing the embedded Swagger 2.0 structure schema.
    pub schema_file: Option<PathBuf>,
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            categories: None,
            format: OutputFormat::default(),
            schema_file: None,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl PipelineConfig {
    /// Enabled categories for this run.
    pub fn category_set(&self) -> CategorySet {
        CategorySet::from_selection(self.categories.as_deref())
    }
}

/// One layer of optional settings, as read from YAML or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub categories: Option<Vec<String>>,
    pub format: Option<OutputFormat>,
    pub schema_file: Option<PathBuf>,
}

impl FileConfig {
    /// Loads a layer from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it is not valid configuration YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fills every unset field of `self` from `lower`.
    pub fn layered_over(self, lower: FileConfig) -> FileConfig {
        FileConfig {
            source: self.source.or(lower.source),
            output: self.output.or(lower.output),
            categories: self.categories.or(lower.categories),
            format: self.format.or(lower.format),
            schema_file: self.schema_file.or(lower.schema_file),
        }
    }

    /// Resolves the remaining gaps with the built-in defaults.
    pub fn resolve(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            source: self.source.unwrap_or(defaults.source),
            output: self.output.unwrap_or(defaults.output),
            categories: self.categories,
            format: self.format.unwrap_or(defaults.format),
            schema_file: self.schema_file,
            workers: defaults.workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use spec_validator_core::Category;

    use super::*;

    #[test]
    fn test_defaults_match_cli_contract() {
        let config = PipelineConfig::default();
        assert_eq!(config.source, PathBuf::from("./azure-rest-api-specs"));
        assert_eq!(config.output, PathBuf::from("validation-errors.json"));
        assert_eq!(config.workers, 10);
        assert_eq!(config.category_set(), CategorySet::defaults());
    }

    #[test]
    fn test_layers_prefer_upper_values() {
        let upper = FileConfig {
            output: Some(PathBuf::from("cli.json")),
            ..FileConfig::default()
        };
        let lower = FileConfig {
            source: Some(PathBuf::from("from-file")),
            output: Some(PathBuf::from("file.json")),
            format: Some(OutputFormat::Yaml),
            ..FileConfig::default()
        };

        let config = upper.layered_over(lower).resolve();
        assert_eq!(config.source, PathBuf::from("from-file"));
        assert_eq!(config.output, PathBuf::from("cli.json"));
        assert_eq!(config.format, OutputFormat::Yaml);
    }

    #[test]
    fn test_load_yaml_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yml");
        std::fs::write(
            &path,
            "source: specs\nformat: yaml\ncategories:\n  - SchemaValidationFailed\n",
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap().resolve();
        assert_eq!(config.source, PathBuf::from("specs"));
        assert_eq!(config.format, OutputFormat::Yaml);
        let categories = config.category_set();
        assert!(categories.is_enabled(Category::SchemaValidationFailed));
        assert!(!categories.is_enabled(Category::IncorrectSchemaVersion));
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yml");
        std::fs::write(&path, "sources: specs\n").unwrap();
        assert!(matches!(
            FileConfig::load(&path),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
