//! Unified error type for the analysis core.
//!
//! Per the error-handling design, insufficient data and numerical
//! degeneracy are *not* represented as [`LifetrackError`] variants — they
//! are recovered from locally (a well-formed result with `model_fitted:
//! false`, or a clamped/zeroed parameter) and never bubble up as an
//! error. [`LifetrackError`] exists for the remaining "unexpected
//! failure" category: malformed input that cannot be recovered from.

use thiserror::Error;

/// Unified error type for all lifetrack-core operations.
#[derive(Error, Debug)]
pub enum LifetrackError {
    /// An event's type name was empty.
    #[error("event type name must not be empty")]
    EmptyTypeName,

    /// A basis size outside `1..=B_MAX` was requested.
    #[error("invalid basis count: {0} (must be 1..={1})")]
    InvalidBasisCount(usize, usize),

    /// Generic errors for wrapping unexpected failures.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias for `Result<T, LifetrackError>`.
pub type LifetrackResult<T> = Result<T, LifetrackError>;

impl From<String> for LifetrackError {
    fn from(s: String) -> Self {
        LifetrackError::Other(s)
    }
}

impl From<&str> for LifetrackError {
    fn from(s: &str) -> Self {
        LifetrackError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LifetrackError::InvalidBasisCount(12, 9);
        assert!(err.to_string().contains("invalid basis count"));
    }

    #[test]
    fn test_result_type_alias() {
        fn example_fn() -> LifetrackResult<i32> {
            Ok(42)
        }
        assert_eq!(example_fn().unwrap(), 42);
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> LifetrackResult<()> {
            Err(LifetrackError::EmptyTypeName)
        }

        fn outer() -> LifetrackResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
