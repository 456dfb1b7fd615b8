//! Error types for delegation and finalization

use thiserror::Error;

/// Errors raised while dispatching an operation or finalizing a proxy.
///
/// The proxy itself never produces or translates these; they come from the
/// wrapped value's operations, from formatting, or from user callbacks.
#[derive(Error, Debug)]
pub enum LiquefyError {
    #[error("undefined method `{operation}' for {type_name}")]
    UnsupportedOperation {
        type_name: String,
        operation: String,
    },

    #[error("wrong number of arguments for `{operation}' (given {given}, expected {expected})")]
    ArgumentCount {
        operation: String,
        expected: String,
        given: usize,
    },

    #[error("invalid argument for `{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    #[error("divided by 0 in `{operation}'")]
    ZeroDivision { operation: String },

    #[error("format error: {0}")]
    Format(String),

    #[error("transform failed: {0}")]
    Transform(String),

    #[error("invalid finalizer config: {0}")]
    Config(#[from] serde_json::Error),
}

impl LiquefyError {
    pub fn unsupported(type_name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            type_name: type_name.into(),
            operation: operation.into(),
        }
    }

    pub fn invalid_argument(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Error for user-supplied callbacks and default transforms.
    pub fn transform(reason: impl Into<String>) -> Self {
        Self::Transform(reason.into())
    }

    /// Is this a missing-operation failure?
    pub fn is_unsupported(&self) -> bool {
        matches!(self, LiquefyError::UnsupportedOperation { .. })
    }
}

/// Result type alias for dispatch and finalization
pub type LiquefyResult<T> = Result<T, LiquefyError>;
