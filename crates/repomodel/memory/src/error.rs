//! Error types for building in-memory models.

use repomodel_types::{ObjectId, QName};
use thiserror::Error;

/// Errors raised while assembling a model from definitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate class: {0}")]
    DuplicateClass(QName),

    #[error("duplicate object: {0}")]
    DuplicateObject(ObjectId),

    #[error("class {class} refers to unknown class {target}")]
    UnknownClass { class: QName, target: QName },

    #[error("object {object} is an instance of unknown class {class}")]
    UnknownObjectClass { object: ObjectId, class: QName },

    #[error("invalid model definition: {0}")]
    Definition(#[from] serde_json::Error),
}

/// Result type for model building.
pub type BuildResult<T> = Result<T, BuildError>;
