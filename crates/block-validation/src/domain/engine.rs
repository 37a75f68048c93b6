//! Data exchanged with the execution engine.

use primitive_types::U512;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, Key, PublicKey, Transform};
use std::collections::BTreeMap;

/// Stake bonded by one validator, keyed by account hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub validator: Hash,
    pub stake: U512,
}

/// An account created at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub public_key: PublicKey,
    pub balance: U512,
    /// Zero for accounts that do not validate.
    pub bonded_amount: U512,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub chain_name: String,
    pub timestamp: u64,
    pub protocol_version: u32,
    pub accounts: Vec<GenesisAccount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisResult {
    pub post_state_hash: Hash,
    pub bonds: Vec<Bond>,
    pub effects: BTreeMap<Key, Transform>,
}

/// Outcome of executing one deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployResult {
    /// The deploy ran. Its effects are committed even when `error` is set
    /// (payment is still charged for a failed session).
    Executed {
        effects: BTreeMap<Key, Transform>,
        cost: u64,
        error: Option<String>,
    },
    /// The deploy could not run at all (bad nonce, unknown account,
    /// insufficient payment). A block containing it is invalid.
    PreconditionFailure { reason: String },
}

impl DeployResult {
    pub fn executed(effects: BTreeMap<Key, Transform>, cost: u64) -> Self {
        DeployResult::Executed {
            effects,
            cost,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub post_state_hash: Hash,
    pub bonds: Vec<Bond>,
}

/// Failure reported by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine could not be reached or the call was cut off.
    #[error("Engine transport error: {0}")]
    Transport(String),

    /// The engine answered and refused the request.
    #[error("Engine rejected request: {0}")]
    Rejected(String),
}
