//! Errors raised by the Content-Security-Policy model.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CspError {
    /// A directive name was empty or blank.
    #[error("Invalid argument to {operation}: directive name must not be empty")]
    InvalidArgument { operation: &'static str },

    /// Stored directive value does not satisfy the model invariants.
    #[error("Invalid state for directive '{directive}': stored sources are malformed")]
    InvalidState { directive: String },

    #[error("Policy header too long: {length} bytes (max {max})")]
    HeaderTooLong { length: usize, max: usize },

    #[error("Too many directives in policy: {count} (max {max})")]
    TooManyDirectives { count: usize, max: usize },

    #[error("Too many sources for directive '{directive}': {count} (max {max})")]
    TooManySources {
        directive: String,
        count: usize,
        max: usize,
    },
}

/// Result type for policy operations
pub type CspResult<T> = Result<T, CspError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CspError::InvalidArgument { operation: "get" };
        assert_eq!(
            err.to_string(),
            "Invalid argument to get: directive name must not be empty"
        );

        let err = CspError::TooManySources {
            directive: "script-src".to_string(),
            count: 3,
            max: 2,
        };
        assert!(err.to_string().contains("script-src"));
    }
}
