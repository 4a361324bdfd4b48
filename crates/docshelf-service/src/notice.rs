//! User-facing notices derived from operation outcomes.

use serde::{Deserialize, Serialize};

use docshelf_core::error::{AppError, ErrorKind};

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information.
    Info,
    /// An operation completed.
    Success,
    /// Something was refused or degraded; nothing was lost.
    Warning,
    /// An operation failed.
    Error,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub severity: Severity,
    /// Text to show.
    pub message: String,
}

impl Notice {
    /// A neutral notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// A notice that something completed.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    /// A notice that something was refused.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// A notice that something failed.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        match err.kind {
            ErrorKind::NotFound
            | ErrorKind::DuplicateName
            | ErrorKind::ParentNotFound
            | ErrorKind::NotEmpty
            | ErrorKind::NotAllowed
            | ErrorKind::Validation
            | ErrorKind::OversizeOrWrongType => Self::warning(err.message.clone()),
            ErrorKind::CapacityExceeded => Self::error(format!(
                "Storage is full, the change was not saved: {}",
                err.message
            )),
            ErrorKind::Corrupt => Self::warning(format!(
                "Stored library could not be read and was reset: {}",
                err.message
            )),
            ErrorKind::InvalidFormat => {
                Self::error(format!("Not a valid backup file: {}", err.message))
            }
            ErrorKind::InvalidPdf => {
                Self::error(format!("The document could not be opened: {}", err.message))
            }
            ErrorKind::Storage
            | ErrorKind::Serialization
            | ErrorKind::Configuration
            | ErrorKind::Internal => Self::error(err.to_string()),
        }
    }
}
