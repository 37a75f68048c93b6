//! Merge output.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_types::{Hash, Key, Transform};
use std::collections::BTreeMap;

/// How a candidate's transform collided with the accumulated one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictType {
    /// Two writes of different bytes.
    WriteWrite,
    /// A write against an add, in either order.
    WriteAdd,
    /// A read (`Identity`) against a write or add.
    ReadWrite,
    /// Adds of different kinds, or `AddKeys` binding one name twice.
    AddMismatch,
}

impl ConflictType {
    /// Classify a non-commuting pair.
    pub fn classify(existing: &Transform, incoming: &Transform) -> Self {
        match (existing, incoming) {
            (Transform::Write(_), Transform::Write(_)) => ConflictType::WriteWrite,
            (Transform::Identity, _) | (_, Transform::Identity) => ConflictType::ReadWrite,
            (Transform::Write(_), _) | (_, Transform::Write(_)) => ConflictType::WriteAdd,
            _ => ConflictType::AddMismatch,
        }
    }
}

/// One key on which a rejected parent collided.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub parent: Hash,
    pub key: Key,
    pub conflict_type: ConflictType,
}

/// Output of one merge call.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    /// Accumulated transforms, one per key.
    #[serde_as(as = "Vec<(_, _)>")]
    pub transforms: BTreeMap<Key, Transform>,
    /// Parents folded into `transforms`, primary first.
    pub effective_parents: Vec<Hash>,
    /// Parents excluded because their effects conflicted.
    pub rejected_parents: Vec<Hash>,
    /// Parents skipped because an effective parent already descends from them.
    pub redundant_parents: Vec<Hash>,
    /// Every colliding key of every rejected parent.
    pub conflicts: Vec<MergeConflict>,
}

impl MergeResult {
    /// The parent whose effects seeded the map.
    pub fn primary_parent(&self) -> Option<&Hash> {
        self.effective_parents.first()
    }

    /// True for the genesis case: no parents at all.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.effective_parents.is_empty()
            && self.rejected_parents.is_empty()
            && self.redundant_parents.is_empty()
    }

    pub fn is_rejected(&self, parent: &Hash) -> bool {
        self.rejected_parents.contains(parent)
    }
}
