//! Validation Service - the block validation pipeline
//!
//! # Stages
//!
//! Each stage runs only after the previous one succeeded:
//!
//! 1. Header and deploy checks (no I/O)
//! 2. Resolve parents from block storage
//! 3. Merge parents over the DAG view
//! 4. Commit the merged transforms onto the base state (pre-state)
//! 5. Check the claimed pre-state and the proposer's bond
//! 6. Verify contract code, then execute the deploys
//! 7. Commit each deploy's effects in order (post-state)
//! 8. Check the declared effects against the executed ones
//! 9. Check the claimed post-state
//!
//! Engine calls are bounded by `engine_timeout_ms`. A timeout or transport
//! failure becomes [`ValidationError::EngineUnavailable`].

use crate::config::ValidationConfig;
use crate::domain::{
    Bond, CommitResult, DeployError, DeployResult, EngineError, GenesisConfig, GenesisResult,
    ValidatedBlock, ValidationError, ValidationResult,
};
use crate::ports::{BlockStore, ExecutionEngine, ValidationApi};
use crate::validation::BlockValidator;
use async_trait::async_trait;
use dag_merge::{merge_parents, DagView, MergeResult};
use futures::future::join_all;
use parking_lot::RwLock;
use shared_crypto::account_hash;
use shared_types::{Block, Hash, Key, Transform};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Block validation service.
pub struct ValidationService<B, D, E>
where
    B: BlockStore,
    D: DagView,
    E: ExecutionEngine,
{
    block_store: Arc<B>,
    dag: Arc<D>,
    engine: Arc<E>,
    config: ValidationConfig,
    /// Post-state of genesis; base state for parentless blocks.
    genesis_state: RwLock<Option<Hash>>,
}

/// Dependencies for ValidationService
pub struct ValidationDependencies<B, D, E> {
    pub block_store: Arc<B>,
    pub dag: Arc<D>,
    pub engine: Arc<E>,
    pub config: ValidationConfig,
}

impl<B, D, E> ValidationService<B, D, E>
where
    B: BlockStore,
    D: DagView,
    E: ExecutionEngine,
{
    pub fn new(deps: ValidationDependencies<B, D, E>) -> Self {
        Self {
            block_store: deps.block_store,
            dag: deps.dag,
            engine: deps.engine,
            config: deps.config,
            genesis_state: RwLock::new(None),
        }
    }

    /// Start from a genesis state computed earlier (e.g. before a restart).
    pub fn with_genesis_state(self, post_state_hash: Hash) -> Self {
        *self.genesis_state.write() = Some(post_state_hash);
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn genesis_state(&self) -> Option<Hash> {
        *self.genesis_state.read()
    }

    fn engine_timeout(&self) -> Duration {
        self.config.engine_timeout()
    }

    // === ENGINE CALLS ===

    /// Run an engine call under the configured deadline.
    async fn call_engine<T, F>(&self, operation: &'static str, call: F) -> ValidationResult<T>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        match tokio::time::timeout(self.engine_timeout(), call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(EngineError::Transport(reason))) => {
                warn!(operation, reason = %reason, "Execution engine unreachable");
                Err(ValidationError::EngineUnavailable(format!("{operation}: {reason}")))
            }
            Ok(Err(EngineError::Rejected(reason))) => {
                Err(ValidationError::Engine(format!("{operation}: {reason}")))
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.config.engine_timeout_ms,
                    "Execution engine call timed out"
                );
                Err(ValidationError::EngineUnavailable(format!(
                    "{operation}: timed out after {} ms",
                    self.config.engine_timeout_ms
                )))
            }
        }
    }

    async fn commit(
        &self,
        pre_state_hash: Hash,
        transforms: &BTreeMap<Key, Transform>,
    ) -> ValidationResult<CommitResult> {
        self.call_engine("commit", self.engine.commit(pre_state_hash, transforms))
            .await
    }

    // === PIPELINE STAGES ===

    async fn resolve_parents(&self, block: &Block) -> ValidationResult<Vec<Block>> {
        let mut parents = Vec::with_capacity(block.parents.len());
        for hash in &block.parents {
            match self.block_store.get_block(hash).await? {
                Some(parent) => parents.push(parent),
                None => return Err(ValidationError::UnknownParent(*hash)),
            }
        }
        Ok(parents)
    }

    /// Base state the merged transforms are committed onto.
    fn base_state(&self, parents: &[Block], merge: &MergeResult) -> ValidationResult<Hash> {
        match merge.primary_parent() {
            Some(primary) => parents
                .iter()
                .find(|parent| &parent.hash == primary)
                .map(|parent| parent.pre_state_hash)
                .ok_or(ValidationError::UnknownParent(*primary)),
            None => self.genesis_state().ok_or(ValidationError::GenesisNotInitialized),
        }
    }

    fn check_bonded(&self, block: &Block, bonds: &[Bond]) -> ValidationResult<()> {
        if !self.config.require_bonded_proposer {
            return Ok(());
        }
        let proposer = account_hash(&block.proposer);
        let bonded = bonds
            .iter()
            .any(|bond| bond.validator == proposer && !bond.stake.is_zero());
        if bonded {
            Ok(())
        } else {
            Err(ValidationError::UnbondedProposer(proposer))
        }
    }

    async fn verify_contract_code(&self, block: &Block) -> ValidationResult<()> {
        if !self.config.verify_wasm {
            return Ok(());
        }
        for (index, deploy) in block.deploys.iter().enumerate() {
            for code in [&deploy.payment, &deploy.session]
                .into_iter()
                .filter_map(|item| item.module_bytes())
            {
                let verdict = self
                    .call_engine("verify_wasm", self.engine.verify_wasm(code))
                    .await?;
                if let Err(reason) = verdict {
                    return Err(ValidationError::InvalidDeploy {
                        index,
                        reason: DeployError::InvalidWasm(reason),
                    });
                }
            }
        }
        Ok(())
    }

    async fn execute(
        &self,
        block: &Block,
        pre_state_hash: Hash,
        pre_state_bonds: Vec<Bond>,
    ) -> ValidationResult<ExecutionOutcome> {
        let mut outcome = ExecutionOutcome {
            post_state_hash: pre_state_hash,
            bonds: pre_state_bonds,
            effects: BTreeMap::new(),
            deploy_errors: Vec::new(),
            total_cost: 0,
        };
        if block.deploys.is_empty() {
            return Ok(outcome);
        }

        let results = self
            .call_engine(
                "exec",
                self.engine.exec(
                    pre_state_hash,
                    block.timestamp,
                    &block.deploys,
                    block.protocol_version,
                ),
            )
            .await?;
        if results.len() != block.deploys.len() {
            return Err(ValidationError::Engine(format!(
                "exec returned {} results for {} deploys",
                results.len(),
                block.deploys.len()
            )));
        }

        for (index, result) in results.into_iter().enumerate() {
            match result {
                DeployResult::PreconditionFailure { reason } => {
                    return Err(ValidationError::InvalidDeploy {
                        index,
                        reason: DeployError::PreconditionFailed(reason),
                    });
                }
                DeployResult::Executed {
                    effects,
                    cost,
                    error,
                } => {
                    outcome.total_cost = outcome.total_cost.saturating_add(cost);
                    if let Some(error) = error {
                        debug!(index, error = %error, "Deploy failed during execution");
                        outcome.deploy_errors.push((index, error));
                    }
                    if effects.is_empty() {
                        continue;
                    }
                    accumulate_effects(&mut outcome.effects, &effects, index)?;
                    let committed = self.commit(outcome.post_state_hash, &effects).await?;
                    outcome.post_state_hash = committed.post_state_hash;
                    outcome.bonds = committed.bonds;
                }
            }
        }
        Ok(outcome)
    }

    async fn run_pipeline(&self, block: &Block) -> ValidationResult<ValidatedBlock> {
        BlockValidator::validate_header(block, &self.config)?;
        BlockValidator::validate_deploys(block, &self.config)?;

        let parents = self.resolve_parents(block).await?;
        let merge = merge_parents(&parents, self.dag.as_ref())?;
        if !merge.rejected_parents.is_empty() {
            debug!(
                rejected = merge.rejected_parents.len(),
                "Some parents excluded from merge"
            );
        }

        let base = self.base_state(&parents, &merge)?;
        let pre_state = self.commit(base, &merge.transforms).await?;
        if pre_state.post_state_hash != block.pre_state_hash {
            return Err(ValidationError::InvalidPreState {
                expected: block.pre_state_hash,
                computed: pre_state.post_state_hash,
            });
        }
        debug!(pre_state = %hex::encode(pre_state.post_state_hash), "Pre-state matches");

        self.check_bonded(block, &pre_state.bonds)?;
        self.verify_contract_code(block).await?;

        let outcome = self
            .execute(block, pre_state.post_state_hash, pre_state.bonds)
            .await?;
        check_declared_effects(&block.effects, &outcome.effects)?;
        if outcome.post_state_hash != block.post_state_hash {
            return Err(ValidationError::InvalidPostState {
                expected: block.post_state_hash,
                computed: outcome.post_state_hash,
            });
        }

        Ok(ValidatedBlock {
            block_hash: block.hash,
            merge,
            pre_state_hash: pre_state.post_state_hash,
            post_state_hash: outcome.post_state_hash,
            bonds: outcome.bonds,
            deploy_errors: outcome.deploy_errors,
            total_cost: outcome.total_cost,
        })
    }
}

/// Post-state after folding every deploy's effects.
struct ExecutionOutcome {
    post_state_hash: Hash,
    bonds: Vec<Bond>,
    /// Every deploy's effects composed in execution order.
    effects: BTreeMap<Key, Transform>,
    deploy_errors: Vec<(usize, String)>,
    total_cost: u64,
}

fn accumulate_effects(
    produced: &mut BTreeMap<Key, Transform>,
    effects: &BTreeMap<Key, Transform>,
    index: usize,
) -> ValidationResult<()> {
    for (key, transform) in effects {
        let composed = match produced.remove(key) {
            Some(existing) => existing.compose(transform.clone()).map_err(|err| {
                ValidationError::InvalidEffects(format!(
                    "deploy {index} effect on {key} cannot be folded: {err}"
                ))
            })?,
            None => transform.clone(),
        };
        produced.insert(key.clone(), composed);
    }
    Ok(())
}

/// Children merge a block's declared `effects`; they must equal what its
/// deploys produced.
fn check_declared_effects(
    declared: &BTreeMap<Key, Transform>,
    produced: &BTreeMap<Key, Transform>,
) -> ValidationResult<()> {
    if declared == produced {
        return Ok(());
    }
    let mismatch = declared
        .keys()
        .chain(produced.keys())
        .find(|key| declared.get(*key) != produced.get(*key));
    let reason = match mismatch {
        Some(key) => format!(
            "{key}: declared {:?}, produced {:?}",
            declared.get(key),
            produced.get(key)
        ),
        None => "effect sets differ".to_string(),
    };
    Err(ValidationError::InvalidEffects(reason))
}

#[async_trait]
impl<B, D, E> ValidationApi for ValidationService<B, D, E>
where
    B: BlockStore,
    D: DagView,
    E: ExecutionEngine,
{
    async fn initialize_genesis(&self, config: &GenesisConfig) -> ValidationResult<GenesisResult> {
        let result = self
            .call_engine("run_genesis", self.engine.run_genesis(config))
            .await?;
        *self.genesis_state.write() = Some(result.post_state_hash);
        info!(
            post_state = %hex::encode(result.post_state_hash),
            bonds = result.bonds.len(),
            "Genesis state initialized"
        );
        Ok(result)
    }

    async fn validate_block(&self, block: &Block) -> ValidationResult<ValidatedBlock> {
        let span = info_span!(
            "validate_block",
            block_hash = %hex::encode(block.hash),
            parents = block.parents.len(),
            deploys = block.deploys.len(),
        );
        async {
            let result = self.run_pipeline(block).await;
            match &result {
                Ok(validated) => info!(
                    post_state = %hex::encode(validated.post_state_hash),
                    effective_parents = validated.merge.effective_parents.len(),
                    deploy_errors = validated.deploy_errors.len(),
                    "Block validated"
                ),
                Err(err) if err.is_block_invalid() => warn!(reason = %err, "Block rejected"),
                Err(err) => warn!(reason = %err, retryable = err.is_retryable(), "Block validation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn validate_blocks(&self, blocks: &[Block]) -> Vec<ValidationResult<ValidatedBlock>> {
        join_all(blocks.iter().map(|block| self.validate_block(block))).await
    }

    async fn query_state(
        &self,
        block_hash: Hash,
        key: &Key,
        path: &[String],
    ) -> ValidationResult<Vec<u8>> {
        let block = self
            .block_store
            .get_block(&block_hash)
            .await?
            .ok_or(ValidationError::UnknownParent(block_hash))?;
        self.call_engine(
            "query",
            self.engine.query(block.post_state_hash, key, path),
        )
        .await
    }
}
