//! # block-validation
//!
//! Decides whether a proposed DAG block is valid.
//!
//! ## Pipeline
//!
//! ```text
//! Block ──→ header/deploy checks ──→ parents ──→ merge ──→ commit (pre-state)
//!                                                              │
//!                   compare post-state ←── commit effects ←── exec
//! ```
//!
//! The merge is computed by [`dag_merge`]; state transitions are delegated
//! to an [`ExecutionEngine`]. Every engine call runs under a deadline, and
//! each [`ValidationError`] reports whether the block is invalid or the
//! attempt may be retried.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use block_validation::{ValidationApi, ValidationDependencies, ValidationService};
//!
//! let service = ValidationService::new(ValidationDependencies {
//!     block_store: dag.clone(),
//!     dag,
//!     engine,
//!     config: ValidationConfig::load("dagchain.toml")?,
//! });
//! service.initialize_genesis(&genesis).await?;
//!
//! let validated = service.validate_block(&block).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod telemetry;
pub mod validation;

// Re-export main types
pub use adapters::{InMemoryBlockDag, InMemoryExecutionEngine};
pub use config::{ConfigError, LoggingConfig, ValidationConfig};
pub use domain::{
    Bond, CommitResult, DeployError, DeployResult, EngineError, GenesisAccount, GenesisConfig,
    GenesisResult, StorageError, ValidatedBlock, ValidationError, ValidationResult,
};
pub use ports::{BlockStore, ExecutionEngine, ValidationApi};
pub use service::{ValidationDependencies, ValidationService};
pub use telemetry::{init_logging, TelemetryError};
pub use validation::{BlockValidator, DeployValidator};
