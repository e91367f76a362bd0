//! Error types for envelope construction, mutation, and resolution.
//!
//! Uses `thiserror` for ergonomic error handling with typed variants
//! that can be inspected by callers. Nothing here is retried internally
//! and no condition is process-fatal; every variant is recoverable by
//! the caller.

use thiserror::Error;

/// Errors that can occur while constructing or mutating a message.
#[derive(Debug, Error)]
pub enum MessageError {
    /// An operation received an invalid input, such as closing a payload
    /// writer against a message other than the one that opened it.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A character-set name could not be resolved to a supported encoding.
    #[error("unsupported content encoding '{0}'")]
    UnsupportedEncoding(String),

    /// An output stream is already open for this message; it must be
    /// closed or aborted before another can be acquired.
    #[error("an output stream is already open for this message")]
    ResourceBusy,

    /// A metadata-reference template failed to parse.
    #[error("malformed expression at byte {position}: {reason}")]
    MalformedExpression {
        /// Byte offset of the offending token within the template.
        position: usize,
        /// Description of the parse failure.
        reason: String,
    },

    /// A referenced metadata key was absent while resolving in strict mode.
    #[error("unresolved metadata reference '{0}'")]
    UnresolvedReference(String),

    /// Reading payload bytes from a stream source failed.
    #[error("payload stream error: {0}")]
    PayloadStream(#[from] std::io::Error),
}

impl MessageError {
    /// Creates an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Creates an unsupported-encoding error for the given charset name.
    #[must_use]
    pub fn unsupported_encoding(name: impl Into<String>) -> Self {
        Self::UnsupportedEncoding(name.into())
    }

    /// Creates a malformed-expression error at the given template offset.
    #[must_use]
    pub fn malformed_expression(position: usize, reason: impl Into<String>) -> Self {
        Self::MalformedExpression {
            position,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error indicates a busy output stream.
    #[must_use]
    pub const fn is_resource_busy(&self) -> bool {
        matches!(self, Self::ResourceBusy)
    }
}
