use thiserror::Error as ThisError;
use zkcred_types::{ConversionError, ValidationError};

pub type ZkCredResult<T> = Result<T, ZkCredError>;

#[derive(Debug, ThisError)]
pub enum ZkCredError {
    /// A serialized entity could not be parsed into its expected shape.
    #[error("Malformed input: {0}")]
    Format(String),
    /// Structurally valid input that is semantically unacceptable.
    #[error("Validation error: {0}")]
    Validation(String),
    /// A referenced identifier is absent from a supplied catalog.
    #[error("Not found: {0}")]
    NotFound(String),
    /// A revocation index outside the registry bounds, or one whose
    /// transition was already applied.
    #[error("Index out of range: {0}")]
    OutOfRange(String),
    /// Opaque failure surfaced from the proof engine.
    #[error("Proof engine failure: {0}")]
    Engine(String),
}

impl From<serde_json::Error> for ZkCredError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

impl From<ValidationError> for ZkCredError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ConversionError> for ZkCredError {
    fn from(err: ConversionError) -> Self {
        Self::Format(err.to_string())
    }
}
