//! Error types for discovery, configuration and validation runs.

use std::path::PathBuf;

use thiserror::Error;

/// A directory in the specification tree could not be listed.
///
/// Aborts the whole run: a partial file list would produce a report that
/// silently skips documents.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot list directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The schema used for structural validation could not be prepared.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("cannot read schema '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema '{source_name}' is not valid JSON: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema '{source_name}' cannot be compiled: {reason}")]
    Compile { source_name: String, reason: String },
}

/// A configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level failure of a validation run.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The result channel closed before every file reported.
    #[error("received {received} of {expected} validation result(s) before the workers stopped")]
    IncompleteResults { expected: usize, received: usize },

    #[error("failed to write report '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(String),
}
