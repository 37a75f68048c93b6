//! Outbound ports (driven side).

use crate::domain::DagError;
use shared_types::{Block, Hash};
use std::sync::Arc;

/// Read-only view of the block DAG.
///
/// Implementations must tolerate concurrent readers; the merge engine may be
/// driven by several validation pipelines at once.
pub trait DagView: Send + Sync {
    /// Whether `ancestor` is reachable from `descendant` by following
    /// parent links. A block is not its own ancestor.
    fn is_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> Result<bool, DagError>;

    /// A stored block, or [`DagError::UnknownBlock`].
    fn block(&self, hash: &Hash) -> Result<Block, DagError>;
}

impl<T: DagView + ?Sized> DagView for Arc<T> {
    fn is_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> Result<bool, DagError> {
        (**self).is_ancestor(ancestor, descendant)
    }

    fn block(&self, hash: &Hash) -> Result<Block, DagError> {
        (**self).block(hash)
    }
}

impl<T: DagView + ?Sized> DagView for &T {
    fn is_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> Result<bool, DagError> {
        (**self).is_ancestor(ancestor, descendant)
    }

    fn block(&self, hash: &Hash) -> Result<Block, DagError> {
        (**self).block(hash)
    }
}
