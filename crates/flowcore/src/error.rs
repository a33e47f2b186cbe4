use crate::TypeTag;
use thiserror::Error;

/// Failure raised by a validator or a native operation before it is
/// converted into an error record
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Value must be {}", .expected.expectation())]
    TypeMismatch {
        expected: TypeTag,
        found: &'static str,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Iterator value {found} is not an entry object (index {index})")]
    MalformedEntry { index: usize, found: String },

    #[error("{0}")]
    Range(String),

    #[error("{0} overflowed")]
    Overflow(&'static str),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid regular expression: {0}")]
    InvalidPattern(String),

    #[error("{0} is not a method")]
    UnknownMethod(String),

    #[error("Cannot build a flow for type tag '{0}'")]
    InvalidTag(TypeTag),
}

impl ValidationError {
    pub fn mismatch(expected: TypeTag, found: &crate::Value) -> Self {
        ValidationError::TypeMismatch {
            expected,
            found: found.type_name(),
        }
    }
}

/// Bad positional argument passed to a dynamically dispatched method
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("Missing argument {index}: expected {expected}")]
    Missing { index: usize, expected: &'static str },

    #[error("Invalid argument {index}: expected {expected}, got {actual}")]
    InvalidType {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown flow type: {0}")]
pub struct TagParseError(pub String);
