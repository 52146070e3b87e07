use pob_store::StoreError;
use pob_types::{DataType, ObjectRef};

use crate::node::NodeId;

/// Errors from building or editing the tree projection.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The trailer record is not a dictionary.
    #[error("trailer is not a dictionary (found {0})")]
    NonDictionaryTrailer(DataType),

    /// The trailer has no `/Root` entry.
    #[error("trailer has no /Root entry")]
    MissingRoot,

    /// The trailer's `/Root` entry is not a reference.
    #[error("/Root entry is not a reference (found {0})")]
    InvalidRootEntry(DataType),

    /// The trailer's `/Root` reference names no object.
    #[error("/Root reference {0} does not resolve")]
    DanglingRoot(ObjectRef),

    /// The catalog object is not a dictionary.
    #[error("catalog {reference} is not a dictionary (found {actual})")]
    InvalidCatalog {
        reference: ObjectRef,
        actual: DataType,
    },

    /// The node id does not name a live node.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Edit text could not be parsed as a value.
    #[error("invalid value {text:?}: {source}")]
    InvalidValue {
        text: String,
        #[source]
        source: StoreError,
    },

    /// The object store rejected an operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
