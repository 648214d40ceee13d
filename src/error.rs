//! Top-level error type and exit-code mapping.

use crate::arlo::SessionError;
use crate::config::ConfigError;
use crate::envelope::EnvelopeError;
use crate::stream::StreamError;

/// Every way a command can end other than success.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("please supply a username and password")]
    MissingCredentials,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unable to login to Arlo: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Something asked for was not there. Printed to stdout; not a failure.
    #[error("{0}")]
    LookupMiss(String),
}

impl AppError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::LookupMiss(_) => 0,
            AppError::MissingCredentials | AppError::Config(_) => 1,
            AppError::Session(_) => 2,
            AppError::Envelope(_) => 3,
            AppError::Io(_) | AppError::Serialize(_) => 4,
            AppError::Stream(_) => 5,
        }
    }

    /// True for errors that are reported on stdout and end the run normally.
    pub fn is_reported(&self) -> bool {
        matches!(self, AppError::LookupMiss(_))
    }
}
