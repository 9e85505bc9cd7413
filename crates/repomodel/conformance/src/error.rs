//! Error types for conformance runs.
//!
//! Verification itself never fails: defects in the model are reported as
//! [`crate::Finding`]s. These errors cover misconfiguration of a run.

use repomodel_types::QName;
use thiserror::Error;

/// Errors that can occur while setting up or running conformance checks.
#[derive(Debug, Error)]
pub enum ConformanceError {
    /// Configuration could not be parsed or is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A requested class does not exist in the repository.
    #[error("unknown class: {0}")]
    UnknownClass(QName),

    /// A schema fixture table could not be parsed.
    #[error("invalid schema fixture: {0}")]
    Fixture(#[from] serde_json::Error),
}

/// Convenience result type for conformance operations.
pub type ConformanceResult<T> = Result<T, ConformanceError>;
