//! # Concurrent Validation
//!
//! Independent blocks validated at the same time share only the DAG view
//! and the engine; results must match sequential validation.

use super::fixtures::{add, write, Chain};
use block_validation::ValidationApi;
use dag_merge::merge_parents;
use shared_types::AlgorithmTag;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawned_validations_agree_with_sequential() {
    let chain = Arc::new(Chain::start(AlgorithmTag::Ed25519).await);
    let root = chain.extend(&[], &[write(1, 1)]).await;

    let mut blocks = Vec::new();
    for i in 0..16u8 {
        blocks.push(chain.block(&[root.hash], &[add(2, i as u64), write(10 + i, i)]).await);
    }

    let mut handles = Vec::new();
    for block in blocks.clone() {
        let chain = chain.clone();
        handles.push(tokio::spawn(async move {
            chain.service.validate_block(&block).await
        }));
    }

    for (handle, block) in handles.into_iter().zip(&blocks) {
        let validated = handle.await.unwrap().unwrap();
        assert_eq!(validated.block_hash, block.hash);
        assert_eq!(validated.post_state_hash, block.post_state_hash);
    }
}

#[tokio::test]
async fn test_validate_blocks_batch() {
    let chain = Chain::start(AlgorithmTag::Secp256k1).await;
    let root = chain.extend(&[], &[]).await;

    let mut blocks = Vec::new();
    for i in 0..8u8 {
        blocks.push(chain.block(&[root.hash], &[write(i, i)]).await);
    }
    let mut broken = blocks[3].clone();
    broken.pre_state_hash = [0xFF; 32];
    blocks[3] = chain.seal(broken);

    let results = chain.service.validate_blocks(&blocks).await;
    assert_eq!(results.len(), blocks.len());
    for (i, result) in results.iter().enumerate() {
        if i == 3 {
            assert!(result.as_ref().is_err_and(|e| e.is_block_invalid()));
        } else {
            assert_eq!(result.as_ref().unwrap().block_hash, blocks[i].hash);
        }
    }
}

#[tokio::test]
async fn test_merge_is_deterministic_across_threads() {
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let mut parents = Vec::new();
    for i in 0..6u8 {
        let block = chain.extend(&[], &[add(1, 1), write(20 + i, i)]).await;
        parents.push(block);
    }
    let conflicting = chain.extend(&[], &[write(20, 99)]).await;
    parents.push(conflicting);

    let dag = chain.dag.clone();
    let parents = Arc::new(parents);
    let encodings: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let dag = dag.clone();
                let parents = parents.clone();
                scope.spawn(move || {
                    let merge = merge_parents(&parents, dag.as_ref()).unwrap();
                    bincode::serialize(&merge).unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert!(encodings.windows(2).all(|pair| pair[0] == pair[1]));
}
