//! Error types for promptfold

use thiserror::Error;

/// Core error type for prompt folding operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoldError {
    /// Neither an explicit override nor a host default prompt pattern exists.
    #[error("Configuration error: no prompt pattern available for mode '{mode}'")]
    MissingPromptPattern { mode: String },

    #[error("Configuration error: prompt pattern is empty")]
    EmptyPattern,

    #[error("Invalid prompt pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Offset {offset} is out of bounds (buffer length: {len})")]
    OutOfBounds { offset: usize, len: usize },

    #[error("No fold spec registered for mode '{0}'")]
    UnknownMode(String),
}

impl FoldError {
    /// Returns true for errors raised while resolving configuration.
    ///
    /// These leave folding inactive for the buffer instead of failing the host.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingPromptPattern { .. } | Self::EmptyPattern | Self::InvalidPattern { .. }
        )
    }
}

/// Result type alias for prompt folding operations
pub type Result<T> = std::result::Result<T, FoldError>;
