//! Error types for nodeperm

use thiserror::Error;

use crate::model::{GroupId, NodeId};

/// Failures raised by a store or directory collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lmdb: {0}")]
    Lmdb(#[from] heed::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored data that cannot be decoded
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// The main error type for nodeperm operations
#[derive(Debug, Error)]
pub enum Error {
    /// The starting node of a query does not exist
    #[error("node {0} was not found")]
    NodeNotFound(NodeId),

    #[error("store lookup failed at node {node}: {source}")]
    StoreFailure {
        node: NodeId,
        #[source]
        source: StoreError,
    },

    /// A node was reached twice while walking towards the root
    #[error("cycle detected: node {0} was visited twice")]
    CycleDetected(NodeId),

    /// A node points at a parent the store does not have
    #[error("node {node} references missing parent {parent}")]
    BrokenAncestry { node: NodeId, parent: NodeId },

    #[error("the none permission cannot be queried")]
    InvalidQuery,

    #[error("user lookup failed for group {group}: {source}")]
    DirectoryFailure {
        group: GroupId,
        #[source]
        source: StoreError,
    },

    #[error("unknown permission code {0:?}")]
    UnknownPermission(char),

    #[error("unknown permission {0:?}")]
    UnknownPermissionName(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Store failure outside of a resolution walk (open, write, load)
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for nodeperm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Convert any store-level error into an [`Error`]
pub fn err<E: Into<StoreError>>(e: E) -> Error {
    Error::Store(e.into())
}
