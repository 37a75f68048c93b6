//! The multi-parent merge.

use super::{ConflictType, MergeConflict, MergeError, MergeOutcome, MergeResult};
use crate::ports::DagView;
use shared_types::{Block, Hash, Key, Transform};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Fold the effects of `candidates` into one transform map.
///
/// `candidates` must already be in fork-choice order, highest priority
/// first. The first candidate is the primary parent and is always accepted;
/// its own effects seed the map, since its pre-state already holds its
/// history. Each later candidate is, in order:
///
/// 1. skipped as redundant if it is an ancestor of an effective parent,
/// 2. expanded to its uncommon history: itself plus every ancestor that is
///    neither an ancestor of the primary nor already folded, with their
///    effects composed oldest first,
/// 3. rejected if any transform of that history does not commute with the
///    accumulated transform on the same key,
/// 4. otherwise folded in and marked effective.
///
/// A candidate is accepted or rejected as a whole, never partially.
pub fn merge_parents<D>(candidates: &[Block], dag: &D) -> MergeOutcome<MergeResult>
where
    D: DagView + ?Sized,
{
    let Some((primary, rest)) = candidates.split_first() else {
        debug!("No parents to merge, returning genesis result");
        return Ok(MergeResult::default());
    };

    let mut result = MergeResult {
        transforms: primary.effects.clone(),
        effective_parents: vec![primary.hash],
        ..MergeResult::default()
    };
    let mut folded: HashSet<Hash> = HashSet::from([primary.hash]);
    debug!(
        parent = %hex::encode(primary.hash),
        keys = primary.effects.len(),
        "Seeded merge from primary parent"
    );

    for candidate in rest {
        if seen(&result, &candidate.hash) || is_subsumed(&result, candidate, dag)? {
            debug!(parent = %hex::encode(candidate.hash), "Skipping redundant parent");
            result.redundant_parents.push(candidate.hash);
            continue;
        }

        let history = uncommon_history(candidate, primary, &folded, dag)?;
        let effects = match history_effects(candidate, &history) {
            Ok(effects) => effects,
            Err(conflict) => {
                debug!(
                    parent = %hex::encode(candidate.hash),
                    "Rejecting parent whose history cannot be folded"
                );
                result.rejected_parents.push(candidate.hash);
                result.conflicts.push(conflict);
                continue;
            }
        };

        let conflicts = find_conflicts(&result.transforms, candidate.hash, &effects);
        if !conflicts.is_empty() {
            debug!(
                parent = %hex::encode(candidate.hash),
                conflicting_keys = conflicts.len(),
                "Rejecting conflicting parent"
            );
            result.rejected_parents.push(candidate.hash);
            result.conflicts.extend(conflicts);
            continue;
        }

        fold(&mut result.transforms, candidate.hash, &effects)?;
        debug!(
            parent = %hex::encode(candidate.hash),
            history = history.len(),
            "Accepted parent"
        );
        folded.extend(history.iter().map(|block| block.hash));
        result.effective_parents.push(candidate.hash);
    }

    info!(
        effective = result.effective_parents.len(),
        rejected = result.rejected_parents.len(),
        redundant = result.redundant_parents.len(),
        keys = result.transforms.len(),
        "Merged parents"
    );
    Ok(result)
}

fn seen(result: &MergeResult, hash: &Hash) -> bool {
    result.effective_parents.contains(hash)
        || result.rejected_parents.contains(hash)
        || result.redundant_parents.contains(hash)
}

fn is_subsumed<D>(result: &MergeResult, candidate: &Block, dag: &D) -> MergeOutcome<bool>
where
    D: DagView + ?Sized,
{
    for accepted in &result.effective_parents {
        if dag.is_ancestor(&candidate.hash, accepted)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Blocks reachable from `candidate` whose effects are not yet part of the
/// merge, parents before children.
fn uncommon_history<D>(
    candidate: &Block,
    primary: &Block,
    folded: &HashSet<Hash>,
    dag: &D,
) -> MergeOutcome<Vec<Block>>
where
    D: DagView + ?Sized,
{
    let mut found: HashMap<Hash, Block> = HashMap::new();
    let mut covered: HashSet<Hash> = HashSet::new();
    let mut stack: Vec<Hash> = candidate.parents.clone();
    found.insert(candidate.hash, candidate.clone());

    while let Some(hash) = stack.pop() {
        if found.contains_key(&hash) || covered.contains(&hash) {
            continue;
        }
        if folded.contains(&hash) || dag.is_ancestor(&hash, &primary.hash)? {
            covered.insert(hash);
            continue;
        }
        let block = dag.block(&hash)?;
        stack.extend(block.parents.iter().copied());
        found.insert(hash, block);
    }

    let mut ordered = Vec::with_capacity(found.len());
    let mut emitted = HashSet::with_capacity(found.len());
    emit_parents_first(candidate.hash, &found, &mut emitted, &mut ordered);
    Ok(ordered)
}

fn emit_parents_first(
    hash: Hash,
    found: &HashMap<Hash, Block>,
    emitted: &mut HashSet<Hash>,
    ordered: &mut Vec<Block>,
) {
    let Some(block) = found.get(&hash) else {
        return;
    };
    if !emitted.insert(hash) {
        return;
    }
    for parent in &block.parents {
        emit_parents_first(*parent, found, emitted, ordered);
    }
    ordered.push(block.clone());
}

/// Compose the effects of `history` in order. A key whose effects cannot be
/// composed makes the whole candidate unmergeable.
fn history_effects(
    candidate: &Block,
    history: &[Block],
) -> Result<BTreeMap<Key, Transform>, MergeConflict> {
    let mut effects: BTreeMap<Key, Transform> = BTreeMap::new();
    for block in history {
        for (key, incoming) in &block.effects {
            let composed = match effects.remove(key) {
                Some(existing) => existing
                    .clone()
                    .compose(incoming.clone())
                    .map_err(|_| MergeConflict {
                        parent: candidate.hash,
                        key: key.clone(),
                        conflict_type: ConflictType::classify(&existing, incoming),
                    })?,
                None => incoming.clone(),
            };
            effects.insert(key.clone(), composed);
        }
    }
    Ok(effects)
}

fn find_conflicts(
    accumulated: &BTreeMap<Key, Transform>,
    parent: Hash,
    effects: &BTreeMap<Key, Transform>,
) -> Vec<MergeConflict> {
    effects
        .iter()
        .filter_map(|(key, incoming)| {
            let existing = accumulated.get(key)?;
            (!existing.commutes_with(incoming)).then(|| MergeConflict {
                parent,
                key: key.clone(),
                conflict_type: ConflictType::classify(existing, incoming),
            })
        })
        .collect()
}

/// Apply a conflict-free candidate. Composed values are computed first so a
/// composition failure leaves `accumulated` untouched.
fn fold(
    accumulated: &mut BTreeMap<Key, Transform>,
    parent: Hash,
    effects: &BTreeMap<Key, Transform>,
) -> MergeOutcome<()> {
    let mut updates = Vec::with_capacity(effects.len());
    for (key, incoming) in effects {
        let composed = match accumulated.get(key) {
            Some(existing) => existing
                .clone()
                .compose(incoming.clone())
                .map_err(|source| MergeError::Composition { parent, source })?,
            None => incoming.clone(),
        };
        updates.push((key.clone(), composed));
    }
    accumulated.extend(updates);
    Ok(())
}
