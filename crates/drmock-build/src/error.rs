//! Error types for drmock-build.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for drmock-build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while loading configuration.
#[derive(Error, Diagnostic, Debug)]
pub enum BuildError {
    /// Failed to read a configuration file.
    #[error("Failed to read `{}`", path.display())]
    #[diagnostic(code(drmock::build::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    #[diagnostic(code(drmock::build::toml))]
    ParseToml(#[from] toml::de::Error),

    /// Failed to parse JSON (compile_commands.json).
    #[error("Failed to parse JSON: {0}")]
    #[diagnostic(code(drmock::build::json))]
    ParseJson(#[from] serde_json::Error),

    /// Configuration validation error.
    #[error("Config validation error: {0}")]
    #[diagnostic(code(drmock::build::validation))]
    Validation(String),
}
