//! # Blocks and Deploys
//!
//! Entities produced by block proposal and consumed read-only by the merge
//! engine and the validation pipeline.
//!
//! Hashes are BLAKE3 over a canonical field-by-field encoding, so they do
//! not depend on any serde format.

use crate::identity::{PublicKey, Signature};
use crate::key::Key;
use crate::transform::Transform;
use crate::Hash;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::BTreeMap;

/// Code to run for the payment or session part of a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutableItem {
    /// Raw contract bytecode shipped with the deploy.
    ModuleBytes(Vec<u8>),
    StoredContractByHash(Hash),
    StoredContractByName(String),
    /// Native transfer, no contract code.
    Transfer,
}

impl ExecutableItem {
    /// Bytecode the engine must verify before execution, if any.
    pub fn module_bytes(&self) -> Option<&[u8]> {
        match self {
            ExecutableItem::ModuleBytes(code) => Some(code),
            _ => None,
        }
    }

    fn hash_into(&self, hasher: &mut blake3::Hasher) {
        match self {
            ExecutableItem::ModuleBytes(code) => {
                hasher.update(&[0]);
                hasher.update(&(code.len() as u64).to_le_bytes());
                hasher.update(code);
            }
            ExecutableItem::StoredContractByHash(hash) => {
                hasher.update(&[1]);
                hasher.update(hash);
            }
            ExecutableItem::StoredContractByName(name) => {
                hasher.update(&[2]);
                hasher.update(&(name.len() as u64).to_le_bytes());
                hasher.update(name.as_bytes());
            }
            ExecutableItem::Transfer => {
                hasher.update(&[3]);
            }
        }
    }
}

/// Signed, hashed metadata of a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployHeader {
    /// Account the deploy runs as; must be among the approvers.
    pub account: PublicKey,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub ttl_ms: u64,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Hash of the payment and session code.
    pub body_hash: Hash,
    pub chain_name: String,
    /// Deploys that must be included before this one.
    pub dependencies: Vec<Hash>,
}

impl DeployHeader {
    /// Compute the deploy hash.
    pub fn hash(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.account.to_bytes());
        hasher.update(&self.timestamp.to_le_bytes());
        hasher.update(&self.ttl_ms.to_le_bytes());
        hasher.update(&self.gas_price.to_le_bytes());
        hasher.update(&self.gas_limit.to_le_bytes());
        hasher.update(&self.body_hash);
        hasher.update(&(self.chain_name.len() as u64).to_le_bytes());
        hasher.update(self.chain_name.as_bytes());
        hasher.update(&(self.dependencies.len() as u64).to_le_bytes());
        for dependency in &self.dependencies {
            hasher.update(dependency);
        }
        *hasher.finalize().as_bytes()
    }

    /// Whether the deploy's lifetime ended before `at_ms`.
    pub fn expired_at(&self, at_ms: u64) -> bool {
        self.timestamp.saturating_add(self.ttl_ms) < at_ms
    }
}

/// One signer's signature over the deploy hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub signer: PublicKey,
    pub signature: Signature,
}

/// A signed unit of work submitted for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deploy {
    pub hash: Hash,
    pub header: DeployHeader,
    pub payment: ExecutableItem,
    pub session: ExecutableItem,
    pub approvals: Vec<Approval>,
}

impl Deploy {
    /// Build an unsigned deploy, filling in the body hash and deploy hash.
    pub fn new(mut header: DeployHeader, payment: ExecutableItem, session: ExecutableItem) -> Self {
        header.body_hash = Self::compute_body_hash(&payment, &session);
        Self {
            hash: header.hash(),
            header,
            payment,
            session,
            approvals: Vec::new(),
        }
    }

    pub fn compute_body_hash(payment: &ExecutableItem, session: &ExecutableItem) -> Hash {
        let mut hasher = blake3::Hasher::new();
        payment.hash_into(&mut hasher);
        session.hash_into(&mut hasher);
        *hasher.finalize().as_bytes()
    }

    pub fn with_approval(mut self, approval: Approval) -> Self {
        self.approvals.push(approval);
        self
    }

    pub fn has_valid_body_hash(&self) -> bool {
        self.header.body_hash == Self::compute_body_hash(&self.payment, &self.session)
    }

    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.header.hash()
    }
}

/// A block as seen by the merge and validation core.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: Hash,
    /// Parent hashes, highest fork-choice priority first.
    pub parents: Vec<Hash>,
    /// Global-state effects of this block's deploys.
    #[serde_as(as = "Vec<(_, _)>")]
    pub effects: BTreeMap<Key, Transform>,
    pub pre_state_hash: Hash,
    pub post_state_hash: Hash,
    pub deploys: Vec<Deploy>,
    /// Block time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub protocol_version: u32,
    pub proposer: PublicKey,
    /// Proposer's signature over [`Block::hash`].
    pub signature: Signature,
}

impl Block {
    /// Hash over every field except `hash` and `signature`.
    pub fn header_hash(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.parents.len() as u64).to_le_bytes());
        for parent in &self.parents {
            hasher.update(parent);
        }
        hasher.update(&(self.effects.len() as u64).to_le_bytes());
        let mut scratch = Vec::new();
        for (key, transform) in &self.effects {
            scratch.clear();
            scratch.extend_from_slice(&key.to_bytes());
            transform.write_bytes(&mut scratch);
            hasher.update(&scratch);
        }
        hasher.update(&self.pre_state_hash);
        hasher.update(&self.post_state_hash);
        hasher.update(&(self.deploys.len() as u64).to_le_bytes());
        for deploy in &self.deploys {
            hasher.update(&deploy.hash);
        }
        hasher.update(&self.timestamp.to_le_bytes());
        hasher.update(&self.protocol_version.to_le_bytes());
        hasher.update(&self.proposer.to_bytes());
        *hasher.finalize().as_bytes()
    }

    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.header_hash()
    }

    pub fn is_genesis(&self) -> bool {
        self.parents.is_empty()
    }
}
