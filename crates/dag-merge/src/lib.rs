//! # dag-merge
//!
//! Combines the global-state effects of several parent blocks into the
//! single transform map a child block executes against.
//!
//! ## Algorithm
//!
//! ```text
//! candidates (fork-choice order) ──→ Init ──→ Scan ──→ Resolve ──→ Done
//!                                     │        │          │
//!                          primary seeds map   │    fold compatible,
//!                                              │    reject conflicting
//!                                  skip ancestors of accepted parents
//!                                  (asked of the DagView port)
//! ```
//!
//! A secondary parent contributes its whole uncommon history: every block
//! reachable from it that is not an ancestor of the primary parent and has
//! not been folded through an earlier parent.
//!
//! Conflicts are not errors: a conflicting parent is excluded from the merge
//! and listed in [`MergeResult::rejected_parents`]. The only failure is the
//! DAG collaborator failing to answer an ancestry or block query.
//!
//! ## Determinism
//!
//! Given the same candidate order and the same ancestor relation, the result
//! is identical on every node. The transform map is a `BTreeMap`, so its
//! iteration and serialization order is fixed.

pub mod domain;
pub mod ports;

pub use domain::{
    merge_parents, ConflictType, DagError, MergeConflict, MergeError, MergeOutcome, MergeResult,
};
pub use ports::DagView;
