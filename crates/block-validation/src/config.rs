//! Validation configuration.
//!
//! Loaded from TOML; every field is optional and falls back to its default.
//!
//! ```toml
//! chain_name = "dagchain-mainnet"
//! protocol_version = 1
//! max_deploy_gas = 100000000
//! engine_timeout_ms = 30000
//!
//! [logging]
//! level = "debug"
//! json = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// One day in milliseconds.
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Validation pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Deploys must name this chain.
    pub chain_name: String,
    /// Blocks must carry this protocol version.
    pub protocol_version: u32,
    pub max_deploys_per_block: usize,
    /// Upper bound for one deploy's gas limit.
    pub max_deploy_gas: u64,
    /// Upper bound for the sum of gas limits in a block.
    pub max_block_gas: u64,
    pub max_deploy_ttl_ms: u64,
    /// Deadline for each execution engine call.
    pub engine_timeout_ms: u64,
    /// Require the proposer to hold stake in the pre-state.
    pub require_bonded_proposer: bool,
    /// Ask the engine to check `ModuleBytes` code before execution.
    pub verify_wasm: bool,
    pub logging: LoggingConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            chain_name: "dagchain".to_string(),
            protocol_version: 1,
            max_deploys_per_block: 1_000,
            max_deploy_gas: 100_000_000,
            max_block_gas: 10_000_000_000,
            max_deploy_ttl_ms: DAY_MS,
            engine_timeout_ms: 30_000,
            require_bonded_proposer: true,
            verify_wasm: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl ValidationConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_name.is_empty() {
            return Err(ConfigError::Invalid("chain_name must not be empty".into()));
        }
        if self.max_deploys_per_block == 0 {
            return Err(ConfigError::Invalid("max_deploys_per_block must be > 0".into()));
        }
        if self.max_deploy_gas == 0 || self.max_block_gas == 0 {
            return Err(ConfigError::Invalid("gas limits must be > 0".into()));
        }
        if self.max_deploy_gas > self.max_block_gas {
            return Err(ConfigError::Invalid(format!(
                "max_deploy_gas ({}) exceeds max_block_gas ({})",
                self.max_deploy_gas, self.max_block_gas
            )));
        }
        if self.max_deploy_ttl_ms == 0 {
            return Err(ConfigError::Invalid("max_deploy_ttl_ms must be > 0".into()));
        }
        if self.engine_timeout_ms == 0 {
            return Err(ConfigError::Invalid("engine_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_timeout_ms)
    }
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
