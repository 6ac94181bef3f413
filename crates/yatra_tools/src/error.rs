//! Tool failures.

use core::time::Duration;
use thiserror::Error;

/// Why a tool call produced no payload.
///
/// The `Display` text is what the model reads back in the tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// A tool with this name is already registered.
    #[error("Tool '{0}' is already registered")]
    AlreadyRegistered(String),

    /// Arguments could not be parsed or did not match the schema.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// The handler did not finish in time.
    #[error("Timed out after {after:?}")]
    Timeout {
        /// Tool name.
        name: String,
        /// The limit that was exceeded.
        after: Duration,
    },

    /// The handler failed or panicked.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// A payload could not be encoded.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ToolError {
    /// Shorthand for [`ToolError::ParameterError`].
    pub fn parameter_error(message: impl Into<String>) -> Self {
        Self::ParameterError(message.into())
    }

    /// Shorthand for [`ToolError::ExecutionError`].
    pub fn execution_error(message: impl Into<String>) -> Self {
        Self::ExecutionError(message.into())
    }

    /// Shorthand for [`ToolError::NotFound`].
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }
}
