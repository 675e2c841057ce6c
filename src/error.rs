use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command '{0}' failed with exit code {1}")]
    CommandFailed(String, i32),

    #[error("Command '{0}' not found — is it installed?")]
    CommandNotFound(String),

    #[error("Installation cancelled by user")]
    Cancelled,

    #[error("This installer must be run as root (sudo)")]
    NotRoot,

    #[error("System not booted in EFI mode")]
    NotEfi,

    #[error("Not connected to internet")]
    Offline,

    #[error("No installable disk found")]
    NoDisks,

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config file {}: {source}", path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("Nothing to select for {0}")]
    NoOptions(String),

    /// A step ran before the step that produces its input.
    #[error("Missing pipeline state: {0}")]
    MissingState(&'static str),

    #[error("{step}: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<InstallerError>,
    },
}

pub type Result<T> = std::result::Result<T, InstallerError>;
