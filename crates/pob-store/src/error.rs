use pob_types::{DataType, Name, ObjectRef, ValueId};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Literal text could not be parsed as a value.
    #[error("parse error at offset {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    /// The value id does not name a live value.
    #[error("unknown value: {0}")]
    UnknownValue(ValueId),

    /// The value has a different type than the operation requires.
    #[error("type mismatch for {id}: expected {expected}, got {actual}")]
    TypeMismatch {
        id: ValueId,
        expected: DataType,
        actual: DataType,
    },

    /// Array insertion past the end of the array.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Dictionary insertion of a key that is already present.
    #[error("duplicate key: {0}")]
    DuplicateKey(Name),

    /// Two indirect objects with the same number and generation.
    #[error("duplicate object: {0}")]
    DuplicateObject(ObjectRef),

    /// An object listing without a trailer.
    #[error("object listing has no trailer")]
    MissingTrailer,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
