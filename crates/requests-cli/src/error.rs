//! CLI error handling.

use std::io;
use std::process::ExitCode;

use requests_session::{ConfigError, HttpError};
use thiserror::Error;

/// Application exit codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    NetworkError = 4,
    ValidationError = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Http(#[from] HttpError),

    #[error("invalid argument: {0}")]
    Usage(String),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Exit status category for this error
    pub fn exit(&self) -> Exit {
        match self {
            Self::Config(_) | Self::Http(HttpError::Config(_)) => Exit::ConfigError,
            Self::Http(e) if e.is_transport() => Exit::NetworkError,
            Self::Http(HttpError::MalformedUrl { .. } | HttpError::InvalidHeader { .. }) => {
                Exit::ValidationError
            }
            Self::Http(_) => Exit::GeneralError,
            Self::Usage(_) => Exit::ValidationError,
            Self::Io(_) => Exit::IoError,
        }
    }
}
