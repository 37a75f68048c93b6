//! Driving ports (Inbound API)

use crate::domain::{GenesisConfig, GenesisResult, ValidatedBlock, ValidationResult};
use async_trait::async_trait;
use shared_types::{Block, Hash, Key};

/// Block validation API offered to the consensus layer.
#[async_trait]
pub trait ValidationApi: Send + Sync {
    /// Run genesis on the engine and remember its post-state as the base
    /// for parentless blocks.
    async fn initialize_genesis(&self, config: &GenesisConfig) -> ValidationResult<GenesisResult>;

    /// Validate one block: merge parents, check the pre-state, execute the
    /// deploys and check the post-state.
    ///
    /// Never panics. The error says whether the block is invalid or the
    /// attempt should be retried.
    async fn validate_block(&self, block: &Block) -> ValidationResult<ValidatedBlock>;

    /// Validate independent blocks concurrently. Results are in input order.
    async fn validate_blocks(&self, blocks: &[Block]) -> Vec<ValidationResult<ValidatedBlock>>;

    /// Read a value from the post-state of a stored block, following
    /// named keys along `path`.
    async fn query_state(
        &self,
        block_hash: Hash,
        key: &Key,
        path: &[String],
    ) -> ValidationResult<Vec<u8>>;
}
