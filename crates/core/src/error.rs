//! Error types for Sift.

use alloc::string::String;
use core::fmt;

/// Result type alias for Sift operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for query execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A component was configured with values it cannot run with,
    /// e.g. a cache with zero capacity. Not recoverable by retry.
    InvalidConfiguration {
        message: String,
    },
    /// An operator or collaborator failed while computing a result.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration { message } => {
                write!(f, "Invalid configuration: {}", message)
            }
            Error::InvalidOperation { message } => {
                write!(f, "Invalid operation: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidConfiguration { .. })
    }
}
