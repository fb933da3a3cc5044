use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures acquiring or reading the line source. Fatal for a run.
///
/// Malformed line content is never an error; it classifies as plain text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Spawned process has no stdout pipe")]
    MissingStdout,

    #[error("Read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("`{command}` exited with {status}")]
    ExitStatus { command: String, status: ExitStatus },

    #[error("Session task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid grammar: {0}")]
    Layout(#[from] crate::parser::LayoutError),
}

// Convenience type alias
pub type SourceResult<T> = Result<T, SourceError>;
