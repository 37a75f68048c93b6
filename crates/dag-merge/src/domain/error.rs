//! Error types for the merge engine.

use shared_types::{Hash, TransformError};

/// Failure of the DAG collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DagError {
    #[error("Unknown block: {}", hex::encode(.0))]
    UnknownBlock(Hash),

    #[error("DAG unavailable: {0}")]
    Unavailable(String),
}

/// Merge errors.
///
/// Conflicts between parents are never reported here; they end up in
/// [`MergeResult::rejected_parents`](super::MergeResult::rejected_parents).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("DAG query failed: {0}")]
    Dag(#[from] DagError),

    #[error("Transform composition failed for parent {}: {source}", hex::encode(.parent))]
    Composition {
        parent: Hash,
        #[source]
        source: TransformError,
    },
}

/// Result type for merge operations.
pub type MergeOutcome<T> = Result<T, MergeError>;
