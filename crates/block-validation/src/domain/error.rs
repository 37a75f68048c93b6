//! Error types for the validation pipeline

use dag_merge::MergeError;
use shared_crypto::CryptoError;
use shared_types::Hash;

/// Why a single deploy was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    #[error("Body hash does not match payment and session")]
    InvalidBodyHash,

    #[error("Deploy hash does not match header")]
    InvalidDeployHash,

    #[error("Duplicate deploy in block")]
    Duplicate,

    #[error("Chain name mismatch: expected {expected}, got {actual}")]
    WrongChainName { expected: String, actual: String },

    #[error("Gas limit must be non-zero")]
    ZeroGasLimit,

    #[error("Gas limit {limit} exceeds maximum {max}")]
    GasLimitExceeded { limit: u64, max: u64 },

    #[error("TTL {ttl_ms} ms exceeds maximum {max_ms} ms")]
    TtlTooLong { ttl_ms: u64, max_ms: u64 },

    #[error("Deploy timestamp {timestamp} is after block timestamp {block_timestamp}")]
    FutureTimestamp { timestamp: u64, block_timestamp: u64 },

    #[error("Deploy expired at {expired_at}, block timestamp {block_timestamp}")]
    Expired { expired_at: u64, block_timestamp: u64 },

    #[error("Deploy has no approvals")]
    MissingApprovals,

    #[error("Deploy account did not approve it")]
    MissingAccountApproval,

    #[error("Approval {index} does not verify")]
    InvalidApproval { index: usize },

    #[error("Approval {index} has an unusable key: {source}")]
    InvalidApprovalKey {
        index: usize,
        #[source]
        source: CryptoError,
    },

    #[error("Contract code rejected: {0}")]
    InvalidWasm(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
}

/// Block storage failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Block storage unavailable: {0}")]
    Unavailable(String),
}

/// Validation pipeline errors.
///
/// Each variant is either block invalidity ([`is_block_invalid`]) or an
/// infrastructure failure the caller may retry ([`is_retryable`]).
///
/// [`is_block_invalid`]: ValidationError::is_block_invalid
/// [`is_retryable`]: ValidationError::is_retryable
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown parent block: {}", hex::encode(.0))]
    UnknownParent(Hash),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Block hash does not match its contents")]
    InvalidBlockHash,

    #[error("Invalid block signature")]
    InvalidBlockSignature,

    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    ProtocolVersionMismatch { expected: u32, actual: u32 },

    #[error("Too many deploys: {count} > {limit}")]
    TooManyDeploys { count: usize, limit: usize },

    #[error("Block gas exceeds limit: {used} > {limit}")]
    BlockGasExceeded { used: u64, limit: u64 },

    #[error("Invalid deploy at index {index}: {reason}")]
    InvalidDeploy { index: usize, reason: DeployError },

    #[error("Invalid pre-state: block claims {}, computed {}", hex::encode(.expected), hex::encode(.computed))]
    InvalidPreState { expected: Hash, computed: Hash },

    #[error("Invalid post-state: block claims {}, computed {}", hex::encode(.expected), hex::encode(.computed))]
    InvalidPostState { expected: Hash, computed: Hash },

    #[error("Declared effects do not match execution: {0}")]
    InvalidEffects(String),

    #[error("Proposer {} is not bonded", hex::encode(.0))]
    UnbondedProposer(Hash),

    #[error("Genesis state has not been initialized")]
    GenesisNotInitialized,

    #[error("Execution engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Execution engine error: {0}")]
    Engine(String),
}

impl ValidationError {
    /// The block itself is bad and must be rejected.
    pub fn is_block_invalid(&self) -> bool {
        matches!(
            self,
            Self::InvalidBlockHash
                | Self::InvalidBlockSignature
                | Self::ProtocolVersionMismatch { .. }
                | Self::TooManyDeploys { .. }
                | Self::BlockGasExceeded { .. }
                | Self::InvalidDeploy { .. }
                | Self::InvalidPreState { .. }
                | Self::InvalidPostState { .. }
                | Self::InvalidEffects(_)
                | Self::UnbondedProposer(_)
        )
    }

    /// Infrastructure failure; validating the same block later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UnknownParent(_)
                | Self::Storage(_)
                | Self::Merge(_)
                | Self::EngineUnavailable(_)
                | Self::Engine(_)
        )
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
