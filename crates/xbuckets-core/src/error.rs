use thiserror::Error;

/// Errors raised while deriving desired state from a request.
///
/// None of these escape [`crate::Function::run_function`]; they are folded
/// into the response as a failing condition and a fatal result.
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Cannot serialize composed resource {name}: {source}")]
    Serialization {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FunctionError {
    /// Create a new MalformedInput error
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Create a new Serialization error for the composed resource `name`
    pub fn serialization(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            name: name.into(),
            source,
        }
    }

    /// Machine-readable reason reported on conditions and results.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "MalformedInput",
            Self::Serialization { .. } => "InternalError",
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedInput { .. } => ErrorCategory::Validation,
            Self::Serialization { .. } => ErrorCategory::Serialization,
        }
    }

    /// Whether the caller sent something we cannot work with.
    pub fn is_input_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Validation)
    }
}

/// Error categories for log classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for function operations
pub type Result<T> = std::result::Result<T, FunctionError>;
