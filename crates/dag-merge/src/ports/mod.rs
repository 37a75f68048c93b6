//! Ports for the merge engine.

pub mod outbound;

pub use outbound::DagView;
