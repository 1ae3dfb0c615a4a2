use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("File I/O Error: {0}")]
    Io(String),

    #[error("Failed to create directory '{}': {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path '{}' exists but is not a directory.", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to open log file '{}': {source}", path.display())]
    LogFileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("Invalid timestamp format '{0}'")]
    InvalidTimestampFormat(String),

    #[error("Capture Error: {0}")]
    Capture(String),

    #[error("A print capture scope is already active in this process")]
    CaptureActive,
}

// Allow conversion from std::io::Error to HelperError::Io
impl From<std::io::Error> for HelperError {
    fn from(err: std::io::Error) -> Self {
        HelperError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HelperError>;
