//! Adapters layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports, used by tests and by
//! single-process deployments.

mod memory_dag;
mod memory_engine;

pub use memory_dag::*;
pub use memory_engine::*;
