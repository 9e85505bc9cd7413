//! Signals raised by object model implementations.

use crate::{DataType, QName};
use thiserror::Error;

/// Errors an object model implementation reports to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The object has no property with the given name.
    #[error("property not found: {0}")]
    NotFound(QName),

    /// The value was accessed as a type it does not hold.
    #[error("invalid data type for {qname}: expected {expected}, found {actual}")]
    InvalidDataType {
        qname: QName,
        expected: DataType,
        actual: DataType,
    },

    /// The implementation could not answer.
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// Result type for object model operations.
pub type ModelResult<T> = Result<T, ModelError>;
