//! A small chain: genesis, an in-memory DAG and engine, and a validator
//! service wired over them.

use block_validation::{
    DeployResult, ExecutionEngine, GenesisAccount, GenesisConfig, InMemoryBlockDag,
    InMemoryExecutionEngine, ValidationApi, ValidationConfig, ValidationDependencies,
    ValidationService,
};
use dag_merge::merge_parents;
use primitive_types::U512;
use shared_crypto::{by_tag, PrivateKey};
use shared_types::{
    AlgorithmTag, Approval, Block, Deploy, DeployHeader, ExecutableItem, Hash, Key, PublicKey,
    Signature, Transform,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type Service = ValidationService<InMemoryBlockDag, InMemoryBlockDag, InMemoryExecutionEngine>;

pub struct Chain {
    pub dag: Arc<InMemoryBlockDag>,
    pub engine: Arc<InMemoryExecutionEngine>,
    pub service: Arc<Service>,
    pub genesis_state: Hash,
    proposer_key: PrivateKey,
    proposer: PublicKey,
    clock: AtomicU64,
}

pub fn k(byte: u8) -> Key {
    Key::Hash([byte; 32])
}

pub fn write(byte: u8, value: u8) -> (Key, Transform) {
    (k(byte), Transform::Write(vec![value]))
}

pub fn add(byte: u8, delta: u64) -> (Key, Transform) {
    (k(byte), Transform::AddUInt64(delta))
}

impl Chain {
    pub async fn start(algorithm: AlgorithmTag) -> Self {
        let (proposer_key, proposer) = by_tag(algorithm).generate_key_pair().unwrap();
        let dag = Arc::new(InMemoryBlockDag::new());
        let engine = Arc::new(InMemoryExecutionEngine::new());
        let service = Arc::new(ValidationService::new(ValidationDependencies {
            block_store: dag.clone(),
            dag: dag.clone(),
            engine: engine.clone(),
            config: ValidationConfig::default(),
        }));
        let genesis = service
            .initialize_genesis(&GenesisConfig {
                chain_name: "dagchain".into(),
                timestamp: 0,
                protocol_version: 1,
                accounts: vec![GenesisAccount {
                    public_key: proposer.clone(),
                    balance: U512::from(1_000_000u64),
                    bonded_amount: U512::from(500u64),
                }],
            })
            .await
            .unwrap();

        Self {
            dag,
            engine,
            service,
            genesis_state: genesis.post_state_hash,
            proposer_key,
            proposer,
            clock: AtomicU64::new(1_000),
        }
    }

    /// Pre-state a child of `parents` must claim.
    pub async fn expected_pre_state(&self, parents: &[Hash]) -> Hash {
        let parent_blocks: Vec<Block> = parents
            .iter()
            .map(|hash| self.dag.get(hash).unwrap())
            .collect();
        let merge = merge_parents(&parent_blocks, self.dag.as_ref()).unwrap();
        let base = match merge.primary_parent() {
            Some(primary) => self.dag.get(primary).unwrap().pre_state_hash,
            None => self.genesis_state,
        };
        self.engine
            .commit(base, &merge.transforms)
            .await
            .unwrap()
            .post_state_hash
    }

    fn deploy(&self, timestamp: u64) -> Deploy {
        let header = DeployHeader {
            account: self.proposer.clone(),
            timestamp,
            ttl_ms: 60_000,
            gas_price: 1,
            gas_limit: 10_000,
            body_hash: [0; 32],
            chain_name: "dagchain".into(),
            dependencies: vec![],
        };
        let deploy = Deploy::new(header, ExecutableItem::Transfer, ExecutableItem::Transfer);
        let signature = by_tag(self.proposer.algorithm())
            .sign(&deploy.hash, &self.proposer_key)
            .unwrap();
        deploy.with_approval(Approval {
            signer: self.proposer.clone(),
            signature,
        })
    }

    pub fn seal(&self, mut block: Block) -> Block {
        block.hash = block.header_hash();
        block.signature = by_tag(self.proposer.algorithm())
            .sign(&block.hash, &self.proposer_key)
            .unwrap();
        block
    }

    /// A valid block on `parents`. With `effects`, one deploy produces them;
    /// without, the block carries no deploys.
    pub async fn block(&self, parents: &[Hash], effects: &[(Key, Transform)]) -> Block {
        let pre_state_hash = self.expected_pre_state(parents).await;
        let effects: BTreeMap<Key, Transform> = effects.iter().cloned().collect();
        let timestamp = self.clock.fetch_add(1, Ordering::SeqCst);

        let (deploys, post_state_hash) = if effects.is_empty() {
            (Vec::new(), pre_state_hash)
        } else {
            let deploy = self.deploy(timestamp);
            self.engine
                .set_result(deploy.hash, DeployResult::executed(effects.clone(), 21));
            let post = self
                .engine
                .commit(pre_state_hash, &effects)
                .await
                .unwrap()
                .post_state_hash;
            (vec![deploy], post)
        };

        self.seal(Block {
            hash: [0; 32],
            parents: parents.to_vec(),
            effects,
            pre_state_hash,
            post_state_hash,
            deploys,
            timestamp,
            protocol_version: 1,
            proposer: self.proposer.clone(),
            signature: Signature::new(self.proposer.algorithm(), vec![
                0;
                self.proposer.algorithm().signature_length()
            ])
            .unwrap(),
        })
    }

    /// Build, validate and store a block.
    pub async fn extend(&self, parents: &[Hash], effects: &[(Key, Transform)]) -> Block {
        let block = self.block(parents, effects).await;
        self.service.validate_block(&block).await.unwrap();
        self.dag.insert(block.clone());
        block
    }
}
