use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object reference: {0}")]
    InvalidReference(String),

    #[error("invalid name: {0}")]
    InvalidName(String),
}
