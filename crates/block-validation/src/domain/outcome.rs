//! Result of a successful validation.

use super::Bond;
use dag_merge::MergeResult;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// A block whose pre-state and post-state both matched the engine's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedBlock {
    pub block_hash: Hash,
    /// Merge of the block's parents, including rejected and redundant ones.
    pub merge: MergeResult,
    pub pre_state_hash: Hash,
    pub post_state_hash: Hash,
    /// Bonds in the post-state.
    pub bonds: Vec<Bond>,
    /// Deploys that ran but reported an execution error, by index.
    pub deploy_errors: Vec<(usize, String)>,
    /// Sum of the cost of every executed deploy.
    pub total_cost: u64,
}
