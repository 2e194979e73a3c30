//! Structural schema validation backed by the `jsonschema` crate.
//!
//! By default documents are checked against an embedded description of the
//! Swagger 2.0 document structure (root object, `info`, `paths`, operations
//! and responses). A complete schema can be supplied from a file instead.

use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;
use spec_validator_core::{SchemaValidator, SpecDocument};
use tracing::debug;

use crate::error::SchemaError;

/// Embedded Swagger 2.0 structure schema (JSON Schema draft 4).
pub const SWAGGER_STRUCTURE_SCHEMA: &str = include_str!("../schemas/swagger-2.0-structure.json");

const EMBEDDED_SOURCE: &str = "embedded:swagger-2.0-structure";

/// A compiled JSON Schema shared read-only by all workers.
pub struct JsonSchemaValidator {
    validator: Validator,
    source_name: String,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("source_name", &self.source_name)
            .finish_non_exhaustive()
    }
}

impl JsonSchemaValidator {
    /// Compiles the embedded Swagger 2.0 structure schema.
    pub fn embedded() -> Result<Self, SchemaError> {
        let schema: Value =
            serde_json::from_str(SWAGGER_STRUCTURE_SCHEMA).map_err(|source| SchemaError::Json {
                source_name: EMBEDDED_SOURCE.to_string(),
                source,
            })?;
        Self::from_schema(&schema, EMBEDDED_SOURCE)
    }

    /// Reads and compiles a schema file.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema: Value = serde_json::from_str(&raw).map_err(|source| SchemaError::Json {
            source_name: path.display().to_string(),
            source,
        })?;
        Self::from_schema(&schema, path.display().to_string())
    }

    /// Compiles `schema` as JSON Schema draft 4, the draft Swagger 2.0 uses.
    pub fn from_schema(schema: &Value, source_name: impl Into<String>) -> Result<Self, SchemaError> {
        let source_name = source_name.into();
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft4);
        let validator = opts.build(schema).map_err(|e| SchemaError::Compile {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        debug!(schema = %source_name, "compiled specification schema");
        Ok(Self {
            validator,
            source_name,
        })
    }

    /// Where the compiled schema came from (file path or embedded name).
    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, document: &SpecDocument) -> Vec<String> {
        self.validator
            .iter_errors(document.raw())
            .map(|error| {
                let location = error.instance_path.to_string();
                if location.is_empty() {
                    format!("(root): {error}")
                } else {
                    format!("{location}: {error}")
                }
            })
            .collect()
    }
}
