//! Driven ports (Outbound dependencies)
//!
//! The DAG ancestry port is [`dag_merge::DagView`], shared with the merge
//! engine.

use crate::domain::{
    CommitResult, DeployResult, EngineError, GenesisConfig, GenesisResult, StorageError,
};
use async_trait::async_trait;
use shared_types::{Block, Deploy, Hash, Key, Transform};
use std::collections::BTreeMap;

/// Read access to stored blocks.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Look a block up by hash. `Ok(None)` when it is not stored.
    async fn get_block(&self, hash: &Hash) -> Result<Option<Block>, StorageError>;
}

/// The execution engine. Every call may cross a process boundary.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Build the genesis state.
    async fn run_genesis(&self, config: &GenesisConfig) -> Result<GenesisResult, EngineError>;

    /// Execute `deploys` against `pre_state_hash`, one result per deploy in
    /// order. Nothing is committed.
    async fn exec(
        &self,
        pre_state_hash: Hash,
        block_time: u64,
        deploys: &[Deploy],
        protocol_version: u32,
    ) -> Result<Vec<DeployResult>, EngineError>;

    /// Apply `transforms` on top of `pre_state_hash` and return the new root.
    async fn commit(
        &self,
        pre_state_hash: Hash,
        transforms: &BTreeMap<Key, Transform>,
    ) -> Result<CommitResult, EngineError>;

    /// Read the value under `base_key`, following named keys along `path`.
    async fn query(
        &self,
        state_hash: Hash,
        base_key: &Key,
        path: &[String],
    ) -> Result<Vec<u8>, EngineError>;

    /// Check contract bytecode before it is executed.
    ///
    /// The inner `Err` is the engine's verdict that the code is unusable;
    /// the outer one is a failure to reach a verdict at all.
    async fn verify_wasm(&self, code: &[u8]) -> Result<Result<(), String>, EngineError>;
}
