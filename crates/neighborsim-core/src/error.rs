//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A validation error occurred.
    #[error("validation error: {0}")]
    Validation(String),

    /// A result was routed to a shard that does not own its source node.
    #[error("node {node} is outside the shard range {start}..{end}")]
    ShardOutOfRange {
        /// The node the result belongs to.
        node: u32,
        /// First node owned by the shard.
        start: u32,
        /// One past the last node owned by the shard.
        end: u32,
    },
}

impl CoreError {
    /// Creates a validation error from any displayable message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CoreError::validation("capacity must be at least 1");
        assert_eq!(err.to_string(), "validation error: capacity must be at least 1");

        let err = CoreError::ShardOutOfRange { node: 12, start: 0, end: 8 };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("0..8"));
    }
}
