//! # End-to-End Scenarios
//!
//! Blocks flow through the merge engine and the validation pipeline backed
//! by the in-memory DAG and execution engine.

use super::fixtures::{add, k, write, Chain};
use block_validation::{ValidationApi, ValidationError};
use dag_merge::{merge_parents, ConflictType};
use shared_types::{AlgorithmTag, Transform};
use std::collections::BTreeMap;

// =============================================================================
// SCENARIO A: single parent, no deploys
// =============================================================================

#[tokio::test]
async fn test_single_parent_without_deploys_keeps_state() {
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let parent = chain.extend(&[], &[write(1, 0xA1)]).await;

    let merge = merge_parents(&[parent.clone()], chain.dag.as_ref()).unwrap();
    assert_eq!(
        merge.transforms,
        BTreeMap::from([(k(1), Transform::Write(vec![0xA1]))])
    );

    let child = chain.block(&[parent.hash], &[]).await;
    let validated = chain.service.validate_block(&child).await.unwrap();
    assert_eq!(validated.post_state_hash, validated.pre_state_hash);
    assert_eq!(validated.merge.effective_parents, vec![parent.hash]);
    assert_eq!(validated.total_cost, 0);
}

// =============================================================================
// SCENARIO B: write and add from two parents merge cleanly
// =============================================================================

#[tokio::test]
async fn test_write_and_add_parents_both_accepted() {
    let chain = Chain::start(AlgorithmTag::Secp256k1).await;
    let first = chain.extend(&[], &[write(1, 1)]).await;
    let second = chain.extend(&[], &[add(2, 1)]).await;

    let child = chain.block(&[first.hash, second.hash], &[]).await;
    let validated = chain.service.validate_block(&child).await.unwrap();

    assert_eq!(
        validated.merge.effective_parents,
        vec![first.hash, second.hash]
    );
    assert!(validated.merge.rejected_parents.is_empty());
    assert_eq!(
        validated.merge.transforms,
        BTreeMap::from([
            (k(1), Transform::Write(vec![1])),
            (k(2), Transform::AddUInt64(1)),
        ])
    );
}

#[tokio::test]
async fn test_adds_to_same_key_are_summed() {
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let first = chain.extend(&[], &[add(3, 5)]).await;
    let second = chain.extend(&[], &[add(3, 7)]).await;

    let child = chain.block(&[first.hash, second.hash], &[]).await;
    let validated = chain.service.validate_block(&child).await.unwrap();

    assert_eq!(validated.merge.effective_parents.len(), 2);
    assert_eq!(
        validated.merge.transforms.get(&k(3)),
        Some(&Transform::AddUInt64(12))
    );
}

#[tokio::test]
async fn test_conflicting_writes_reject_second_parent() {
    let chain = Chain::start(AlgorithmTag::Bls12381).await;
    let first = chain.extend(&[], &[write(1, 1), add(2, 1)]).await;
    let second = chain.extend(&[], &[write(1, 2), write(4, 4)]).await;

    let child = chain.block(&[first.hash, second.hash], &[]).await;
    let validated = chain.service.validate_block(&child).await.unwrap();

    assert_eq!(validated.merge.rejected_parents, vec![second.hash]);
    assert!(!validated.merge.transforms.contains_key(&k(4)));
    assert_eq!(
        validated.merge.transforms.get(&k(1)),
        Some(&Transform::Write(vec![1]))
    );
    assert!(validated
        .merge
        .conflicts
        .iter()
        .any(|c| c.parent == second.hash && c.conflict_type == ConflictType::WriteWrite));
}

#[tokio::test]
async fn test_deep_diamond() {
    //        g1 ── a ── c
    //          └── b ──┘ └── d (parents c, b)
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let g1 = chain.extend(&[], &[write(1, 1)]).await;
    let a = chain.extend(&[g1.hash], &[add(2, 1)]).await;
    let b = chain.extend(&[g1.hash], &[add(2, 2)]).await;
    let c = chain.extend(&[a.hash, b.hash], &[write(3, 3)]).await;

    let d = chain.block(&[c.hash, b.hash], &[add(2, 10)]).await;
    let validated = chain.service.validate_block(&d).await.unwrap();

    assert_eq!(validated.merge.effective_parents, vec![c.hash]);
    assert_eq!(validated.merge.redundant_parents, vec![b.hash]);
}

// =============================================================================
// DIVERGING HISTORIES
// =============================================================================

#[tokio::test]
async fn test_secondary_parent_history_reaches_child_state() {
    //  g1 ── a(k5) ── x(k6)
    //   └─── b(k7)
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let g1 = chain.extend(&[], &[write(1, 1)]).await;
    let a = chain.extend(&[g1.hash], &[write(5, 5)]).await;
    let x = chain.extend(&[a.hash], &[write(6, 6)]).await;
    let b = chain.extend(&[g1.hash], &[write(7, 7)]).await;

    let child = chain.extend(&[b.hash, x.hash], &[]).await;
    for (key, value) in [(1, 1u8), (5, 5), (6, 6), (7, 7)] {
        let stored = chain
            .service
            .query_state(child.hash, &k(key), &[])
            .await
            .unwrap();
        assert_eq!(stored, vec![value], "key {key}");
    }
}

#[tokio::test]
async fn test_diverging_adds_are_counted_once() {
    //  g1 ── a(+1) ── x(+2)
    //   │      └───── y(+8)
    //   └─── b(+4)
    let chain = Chain::start(AlgorithmTag::Secp256k1).await;
    let g1 = chain.extend(&[], &[]).await;
    let a = chain.extend(&[g1.hash], &[add(2, 1)]).await;
    let x = chain.extend(&[a.hash], &[add(2, 2)]).await;
    let y = chain.extend(&[a.hash], &[add(2, 8)]).await;
    let b = chain.extend(&[g1.hash], &[add(2, 4)]).await;

    let child = chain.extend(&[b.hash, x.hash, y.hash], &[]).await;
    let total = chain
        .service
        .query_state(child.hash, &k(2), &[])
        .await
        .unwrap();
    assert_eq!(total, 15u64.to_le_bytes().to_vec());
}

#[tokio::test]
async fn test_conflict_in_secondary_history_excludes_it() {
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let g1 = chain.extend(&[], &[]).await;
    let a = chain.extend(&[g1.hash], &[write(5, 1)]).await;
    let x = chain.extend(&[a.hash], &[write(6, 6)]).await;
    let b = chain.extend(&[g1.hash], &[write(5, 2)]).await;

    let child = chain.block(&[b.hash, x.hash], &[]).await;
    let validated = chain.service.validate_block(&child).await.unwrap();
    assert_eq!(validated.merge.rejected_parents, vec![x.hash]);
    chain.dag.insert(child.clone());

    let kept = chain.service.query_state(child.hash, &k(5), &[]).await;
    assert_eq!(kept.unwrap(), vec![2]);
    let dropped = chain.service.query_state(child.hash, &k(6), &[]).await;
    assert!(matches!(dropped, Err(ValidationError::Engine(_))));
}

// =============================================================================
// DECLARED EFFECTS
// =============================================================================

#[tokio::test]
async fn test_forged_effects_without_deploys_rejected() {
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let parent = chain.extend(&[], &[write(1, 1)]).await;

    let mut forged = chain.block(&[parent.hash], &[]).await;
    forged.effects.insert(k(9), Transform::Write(vec![0xEE]));
    let forged = chain.seal(forged);
    assert!(forged.deploys.is_empty());
    assert_eq!(forged.pre_state_hash, forged.post_state_hash);

    let err = chain.service.validate_block(&forged).await.unwrap_err();
    assert!(matches!(err, ValidationError::InvalidEffects(_)));
    assert!(err.is_block_invalid());
}

#[tokio::test]
async fn test_declared_effects_must_match_execution() {
    let chain = Chain::start(AlgorithmTag::Bls12381).await;
    let parent = chain.extend(&[], &[write(1, 1)]).await;

    let mut block = chain.block(&[parent.hash], &[add(2, 3)]).await;
    block.effects.insert(k(2), Transform::AddUInt64(300));
    let block = chain.seal(block);

    let err = chain.service.validate_block(&block).await.unwrap_err();
    assert!(matches!(err, ValidationError::InvalidEffects(_)));
    assert!(!chain.dag.contains(&block.hash));
}

// =============================================================================
// SCENARIO C: post-state mismatch
// =============================================================================

#[tokio::test]
async fn test_claimed_post_state_mismatch_is_rejected() {
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let parent = chain.extend(&[], &[write(1, 1)]).await;

    let mut block = chain.block(&[parent.hash], &[write(2, 2)]).await;
    let honest = block.post_state_hash;
    block.post_state_hash = [0x42; 32];
    let block = chain.seal(block);

    match chain.service.validate_block(&block).await {
        Err(ValidationError::InvalidPostState { expected, computed }) => {
            assert_eq!(expected, [0x42; 32]);
            assert_eq!(computed, honest);
        }
        other => panic!("expected InvalidPostState, got {other:?}"),
    }
    assert!(!chain.dag.contains(&block.hash));
}

#[tokio::test]
async fn test_tampered_block_fails_before_execution() {
    let chain = Chain::start(AlgorithmTag::Secp256k1).await;
    let mut block = chain.block(&[], &[write(1, 1)]).await;
    block.effects.insert(k(9), Transform::Write(vec![9]));

    let err = chain.service.validate_block(&block).await.unwrap_err();
    assert!(matches!(err, ValidationError::InvalidBlockHash));
    assert_eq!(chain.engine.exec_calls(), 0);
}

#[tokio::test]
async fn test_query_after_merge() {
    let chain = Chain::start(AlgorithmTag::Ed25519).await;
    let first = chain.extend(&[], &[add(2, 4)]).await;
    let second = chain.extend(&[], &[add(2, 6)]).await;
    let child = chain.extend(&[first.hash, second.hash], &[]).await;

    let value = chain
        .service
        .query_state(child.hash, &k(2), &[])
        .await
        .unwrap();
    assert_eq!(value, 10u64.to_le_bytes().to_vec());
}
