//! Error types for the Liquid Labs CLI

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error at {}: {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Container runtime is not available: {0}")]
    RuntimeUnavailable(String),

    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    #[error("docker compose {action} failed\nOutput: {output}")]
    Compose { action: String, output: String },

    #[error("Docker error: {0}")]
    Docker(String),

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CliError {
    /// Attach the offending path to an IO error
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::IoAt {
            path: path.into(),
            source,
        }
    }
}
