//! Error types for path generation.

use thiserror::Error;

/// Error raised when a template cannot be rendered with the given parameters.
///
/// These are configuration errors on the caller's side, never transport
/// failures, and are not retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A required placeholder has no corresponding parameter.
    #[error("Expected \"{name}\" to be defined")]
    MissingParam {
        /// Placeholder name
        name: String,
    },

    /// A parameter value cannot be used as a path segment.
    #[error("Expected \"{name}\" to be a valid path segment: {reason}")]
    InvalidParam {
        /// Placeholder name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl PathError {
    /// Returns the name of the offending placeholder.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::MissingParam { name } | Self::InvalidParam { name, .. } => name,
        }
    }
}
