//! In-memory block DAG.

use crate::domain::StorageError;
use crate::ports::BlockStore;
use async_trait::async_trait;
use dag_merge::{DagError, DagView};
use parking_lot::RwLock;
use shared_types::{Block, Hash};
use std::collections::{HashMap, HashSet, VecDeque};

/// Blocks keyed by hash, serving both block lookups and ancestry queries.
#[derive(Default)]
pub struct InMemoryBlockDag {
    blocks: RwLock<HashMap<Hash, Block>>,
}

impl InMemoryBlockDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block. Returns `false` if it was already present.
    pub fn insert(&self, block: Block) -> bool {
        let mut blocks = self.blocks.write();
        if blocks.contains_key(&block.hash) {
            return false;
        }
        blocks.insert(block.hash, block);
        true
    }

    pub fn get(&self, hash: &Hash) -> Option<Block> {
        self.blocks.read().get(hash).cloned()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.blocks.read().contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockDag {
    async fn get_block(&self, hash: &Hash) -> Result<Option<Block>, StorageError> {
        Ok(self.get(hash))
    }
}

impl DagView for InMemoryBlockDag {
    fn is_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> Result<bool, DagError> {
        let blocks = self.blocks.read();
        let start = blocks
            .get(descendant)
            .ok_or(DagError::UnknownBlock(*descendant))?;

        let mut queue: VecDeque<&Hash> = start.parents.iter().collect();
        let mut visited = HashSet::new();
        while let Some(hash) = queue.pop_front() {
            if hash == ancestor {
                return Ok(true);
            }
            if !visited.insert(*hash) {
                continue;
            }
            let block = blocks.get(hash).ok_or(DagError::UnknownBlock(*hash))?;
            queue.extend(block.parents.iter());
        }
        Ok(false)
    }

    fn block(&self, hash: &Hash) -> Result<Block, DagError> {
        self.get(hash).ok_or(DagError::UnknownBlock(*hash))
    }
}
