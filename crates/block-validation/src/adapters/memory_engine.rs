//! In-memory execution engine.
//!
//! Global state is a map from key to the accumulated transform for that key.
//! A state is addressed by the BLAKE3 hash of its canonical encoding, so
//! committing an empty transform map returns the pre-state hash unchanged.
//!
//! Deploys are not interpreted. Each deploy returns the result scripted for
//! its hash with [`InMemoryExecutionEngine::set_result`], or an empty
//! successful execution.

use crate::domain::{
    Bond, CommitResult, DeployResult, EngineError, GenesisConfig, GenesisResult,
};
use crate::ports::ExecutionEngine;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::{account_hash, account_hash_key};
use shared_types::{Deploy, Hash, Key, Transform};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

/// Wasm module magic number.
const WASM_MAGIC: &[u8] = b"\0asm";

#[derive(Debug, Clone, Default)]
struct GlobalState {
    values: BTreeMap<Key, Transform>,
    bonds: Vec<Bond>,
}

impl GlobalState {
    fn state_hash(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.values.len() as u64).to_le_bytes());
        let mut scratch = Vec::new();
        for (key, value) in &self.values {
            scratch.clear();
            scratch.extend_from_slice(&key.to_bytes());
            value.write_bytes(&mut scratch);
            hasher.update(&scratch);
        }
        hasher.update(&(self.bonds.len() as u64).to_le_bytes());
        for bond in &self.bonds {
            let mut stake = [0u8; 64];
            bond.stake.to_little_endian(&mut stake);
            hasher.update(&bond.validator);
            hasher.update(&stake);
        }
        *hasher.finalize().as_bytes()
    }

    fn apply(&mut self, transforms: &BTreeMap<Key, Transform>) -> Result<(), EngineError> {
        for (key, transform) in transforms {
            let current = self.values.remove(key).unwrap_or_default();
            let next = current.compose(transform.clone()).map_err(|e| {
                EngineError::Rejected(format!("cannot apply transform to {key}: {e}"))
            })?;
            if next != Transform::Identity {
                self.values.insert(key.clone(), next);
            }
        }
        Ok(())
    }
}

/// Execution engine backed by in-process state.
#[derive(Default)]
pub struct InMemoryExecutionEngine {
    states: RwLock<HashMap<Hash, GlobalState>>,
    results: RwLock<HashMap<Hash, DeployResult>>,
    unavailable: AtomicBool,
    exec_calls: AtomicUsize,
}

impl InMemoryExecutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the result `exec` returns for the deploy with this hash.
    pub fn set_result(&self, deploy_hash: Hash, result: DeployResult) {
        self.results.write().insert(deploy_hash, result);
    }

    /// While set, every call fails with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn has_state(&self, state_hash: &Hash) -> bool {
        self.states.read().contains_key(state_hash)
    }

    /// Number of `exec` calls served.
    pub fn exec_calls(&self) -> usize {
        self.exec_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), EngineError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(EngineError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn load(&self, state_hash: &Hash) -> Result<GlobalState, EngineError> {
        self.states.read().get(state_hash).cloned().ok_or_else(|| {
            EngineError::Rejected(format!("unknown state {}", hex::encode(state_hash)))
        })
    }

    fn store(&self, state: GlobalState) -> Hash {
        let hash = state.state_hash();
        self.states.write().entry(hash).or_insert(state);
        hash
    }
}

#[async_trait]
impl ExecutionEngine for InMemoryExecutionEngine {
    async fn run_genesis(&self, config: &GenesisConfig) -> Result<GenesisResult, EngineError> {
        self.check_available()?;
        let mut effects = BTreeMap::new();
        let mut bonds = Vec::new();
        for account in &config.accounts {
            effects.insert(
                account_hash_key(&account.public_key),
                Transform::AddUInt512(account.balance),
            );
            if !account.bonded_amount.is_zero() {
                bonds.push(Bond {
                    validator: account_hash(&account.public_key),
                    stake: account.bonded_amount,
                });
            }
        }

        let mut state = GlobalState {
            values: BTreeMap::new(),
            bonds: bonds.clone(),
        };
        state.apply(&effects)?;
        let post_state_hash = self.store(state);
        debug!(
            chain = %config.chain_name,
            accounts = config.accounts.len(),
            post_state = %hex::encode(post_state_hash),
            "Genesis executed"
        );
        Ok(GenesisResult {
            post_state_hash,
            bonds,
            effects,
        })
    }

    async fn exec(
        &self,
        pre_state_hash: Hash,
        _block_time: u64,
        deploys: &[Deploy],
        _protocol_version: u32,
    ) -> Result<Vec<DeployResult>, EngineError> {
        self.check_available()?;
        self.load(&pre_state_hash)?;
        self.exec_calls.fetch_add(1, Ordering::SeqCst);
        let results = self.results.read();
        Ok(deploys
            .iter()
            .map(|deploy| {
                results
                    .get(&deploy.hash)
                    .cloned()
                    .unwrap_or_else(|| DeployResult::executed(BTreeMap::new(), 0))
            })
            .collect())
    }

    async fn commit(
        &self,
        pre_state_hash: Hash,
        transforms: &BTreeMap<Key, Transform>,
    ) -> Result<CommitResult, EngineError> {
        self.check_available()?;
        let mut state = self.load(&pre_state_hash)?;
        state.apply(transforms)?;
        let bonds = state.bonds.clone();
        let post_state_hash = self.store(state);
        Ok(CommitResult {
            post_state_hash,
            bonds,
        })
    }

    async fn query(
        &self,
        state_hash: Hash,
        base_key: &Key,
        path: &[String],
    ) -> Result<Vec<u8>, EngineError> {
        self.check_available()?;
        let state = self.load(&state_hash)?;
        let mut key = base_key;
        for name in path {
            key = match state.values.get(key) {
                Some(Transform::AddKeys(named)) => named.get(name).ok_or_else(|| {
                    EngineError::Rejected(format!("{key} has no named key {name:?}"))
                })?,
                _ => {
                    return Err(EngineError::Rejected(format!(
                        "{key} has no named keys to follow {name:?}"
                    )))
                }
            };
        }
        let value = state
            .values
            .get(key)
            .ok_or_else(|| EngineError::Rejected(format!("no value under {key}")))?;
        Ok(value_bytes(value))
    }

    async fn verify_wasm(&self, code: &[u8]) -> Result<Result<(), String>, EngineError> {
        self.check_available()?;
        if code.starts_with(WASM_MAGIC) {
            Ok(Ok(()))
        } else {
            Ok(Err("missing wasm magic number".into()))
        }
    }
}

/// Raw bytes of a stored value: the written bytes, or the encoded payload.
fn value_bytes(value: &Transform) -> Vec<u8> {
    match value {
        Transform::Write(bytes) => bytes.clone(),
        other => {
            let mut out = Vec::new();
            other.write_bytes(&mut out);
            out.split_off(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GenesisAccount;
    use primitive_types::U512;
    use shared_types::{AccessRights, AlgorithmTag, PublicKey, URef};

    fn account(byte: u8, balance: u64, bonded: u64) -> GenesisAccount {
        GenesisAccount {
            public_key: PublicKey::new(AlgorithmTag::Ed25519, vec![byte; 32]).unwrap(),
            balance: U512::from(balance),
            bonded_amount: U512::from(bonded),
        }
    }

    fn genesis(accounts: Vec<GenesisAccount>) -> GenesisConfig {
        GenesisConfig {
            chain_name: "dagchain".into(),
            timestamp: 0,
            protocol_version: 1,
            accounts,
        }
    }

    #[tokio::test]
    async fn test_genesis_bonds_only_staked_accounts() {
        let engine = InMemoryExecutionEngine::new();
        let result = engine
            .run_genesis(&genesis(vec![account(1, 100, 10), account(2, 50, 0)]))
            .await
            .unwrap();
        assert_eq!(result.bonds.len(), 1);
        assert_eq!(result.effects.len(), 2);
        assert!(engine.has_state(&result.post_state_hash));
    }

    #[tokio::test]
    async fn test_empty_commit_keeps_state_hash() {
        let engine = InMemoryExecutionEngine::new();
        let genesis = engine.run_genesis(&genesis(vec![account(1, 100, 10)])).await.unwrap();
        let commit = engine
            .commit(genesis.post_state_hash, &BTreeMap::new())
            .await
            .unwrap();
        assert_eq!(commit.post_state_hash, genesis.post_state_hash);
        assert_eq!(commit.bonds, genesis.bonds);
    }

    #[tokio::test]
    async fn test_commit_is_deterministic_across_engines() {
        let transforms = BTreeMap::from([(Key::Hash([7; 32]), Transform::Write(vec![1, 2]))]);
        let mut hashes = Vec::new();
        for _ in 0..2 {
            let engine = InMemoryExecutionEngine::new();
            let genesis = engine.run_genesis(&genesis(vec![account(1, 1, 1)])).await.unwrap();
            hashes.push(
                engine
                    .commit(genesis.post_state_hash, &transforms)
                    .await
                    .unwrap()
                    .post_state_hash,
            );
        }
        assert_eq!(hashes[0], hashes[1]);
    }

    #[tokio::test]
    async fn test_add_onto_balance() {
        let engine = InMemoryExecutionEngine::new();
        let holder = account(1, 100, 0);
        let key = account_hash_key(&holder.public_key);
        let genesis = engine.run_genesis(&genesis(vec![holder])).await.unwrap();

        let credit = BTreeMap::from([(key.clone(), Transform::AddUInt512(U512::from(5)))]);
        let commit = engine.commit(genesis.post_state_hash, &credit).await.unwrap();
        let bytes = engine.query(commit.post_state_hash, &key, &[]).await.unwrap();

        let mut expected = [0u8; 64];
        U512::from(105).to_little_endian(&mut expected);
        assert_eq!(bytes, expected.to_vec());
    }

    #[tokio::test]
    async fn test_add_onto_written_value_is_rejected() {
        let engine = InMemoryExecutionEngine::new();
        let genesis = engine.run_genesis(&genesis(vec![])).await.unwrap();
        let key = Key::Hash([3; 32]);
        let written = engine
            .commit(
                genesis.post_state_hash,
                &BTreeMap::from([(key.clone(), Transform::Write(vec![0]))]),
            )
            .await
            .unwrap();
        let result = engine
            .commit(
                written.post_state_hash,
                &BTreeMap::from([(key, Transform::AddUInt64(1))]),
            )
            .await;
        assert!(matches!(result, Err(EngineError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_query_follows_named_keys() {
        let engine = InMemoryExecutionEngine::new();
        let genesis = engine.run_genesis(&genesis(vec![])).await.unwrap();
        let contract = Key::Hash([1; 32]);
        let counter = Key::URef(URef::new([2; 32], AccessRights::READ_ADD_WRITE));
        let transforms = BTreeMap::from([
            (
                contract.clone(),
                Transform::AddKeys(BTreeMap::from([("counter".to_string(), counter.clone())])),
            ),
            (counter, Transform::Write(b"42".to_vec())),
        ]);
        let state = engine
            .commit(genesis.post_state_hash, &transforms)
            .await
            .unwrap()
            .post_state_hash;

        let value = engine
            .query(state, &contract, &["counter".to_string()])
            .await
            .unwrap();
        assert_eq!(value, b"42".to_vec());

        let missing = engine.query(state, &contract, &["nope".to_string()]).await;
        assert!(matches!(missing, Err(EngineError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_unknown_state_and_outage() {
        let engine = InMemoryExecutionEngine::new();
        assert!(matches!(
            engine.commit([9; 32], &BTreeMap::new()).await,
            Err(EngineError::Rejected(_))
        ));

        engine.set_unavailable(true);
        assert!(matches!(
            engine.run_genesis(&genesis(vec![])).await,
            Err(EngineError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_wasm_checks_magic() {
        let engine = InMemoryExecutionEngine::new();
        assert_eq!(engine.verify_wasm(b"\0asm\x01\0\0\0").await, Ok(Ok(())));
        assert!(engine.verify_wasm(b"").await.unwrap().is_err());
        assert!(engine.verify_wasm(b"not wasm").await.unwrap().is_err());

        engine.set_unavailable(true);
        assert!(matches!(
            engine.verify_wasm(b"\0asm").await,
            Err(EngineError::Transport(_))
        ));
    }
}
